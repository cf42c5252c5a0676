//! Engine configuration parsed from environment variables.
//!
//! Every field has a default from [`crate::consts`]; the environment only
//! overrides. Unparsable values fall back to the default, while values that
//! parse but make no sense (inverted zoom limits, an empty grid) are rejected
//! by [`EngineConfig::validate`].

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use crate::consts::{CELL_SIZE, INITIAL_COLUMN_COUNT, INITIAL_ROW_COUNT, MAX_SCALE, MIN_SCALE, ZOOM_SENSITIVITY};

pub const ENV_MIN_SCALE: &str = "PIXELBOARD_MIN_SCALE";
pub const ENV_MAX_SCALE: &str = "PIXELBOARD_MAX_SCALE";
pub const ENV_ZOOM_SENSITIVITY: &str = "PIXELBOARD_ZOOM_SENSITIVITY";
pub const ENV_CELL_SIZE: &str = "PIXELBOARD_CELL_SIZE";
pub const ENV_INITIAL_ROWS: &str = "PIXELBOARD_INITIAL_ROWS";
pub const ENV_INITIAL_COLUMNS: &str = "PIXELBOARD_INITIAL_COLUMNS";

/// Error returned by [`EngineConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid zoom limits: min {min} must be positive and not above max {max}")]
    InvalidZoomLimits { min: f64, max: f64 },
    #[error("zoom sensitivity must be positive, got {0}")]
    InvalidSensitivity(f64),
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f64),
    #[error("initial grid must have at least one row and one column, got {rows}x{columns}")]
    EmptyGrid { rows: i32, columns: i32 },
}

/// Inclusive range of scales a zoom may commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min_scale: MIN_SCALE, max_scale: MAX_SCALE }
    }
}

impl ZoomLimits {
    /// Whether `scale` may be committed to the camera.
    #[must_use]
    pub fn contains(self, scale: f64) -> bool {
        scale.is_finite() && scale >= self.min_scale && scale <= self.max_scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    pub limits: ZoomLimits,
    pub zoom_sensitivity: f64,
    pub cell_size: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { limits: ZoomLimits::default(), zoom_sensitivity: ZOOM_SENSITIVITY, cell_size: CELL_SIZE }
    }
}

/// Shape of the grid seeded into an empty document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub initial_rows: i32,
    pub initial_columns: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { initial_rows: INITIAL_ROW_COUNT, initial_columns: INITIAL_COLUMN_COUNT }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineConfig {
    pub view: ViewConfig,
    pub grid: GridConfig,
}

impl EngineConfig {
    /// Build typed engine config from environment variables.
    ///
    /// Optional:
    /// - `PIXELBOARD_MIN_SCALE`: default 0.9
    /// - `PIXELBOARD_MAX_SCALE`: default 1.2
    /// - `PIXELBOARD_ZOOM_SENSITIVITY`: default 300
    /// - `PIXELBOARD_CELL_SIZE`: default 20
    /// - `PIXELBOARD_INITIAL_ROWS`: default 32
    /// - `PIXELBOARD_INITIAL_COLUMNS`: default 32
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the resulting values fail [`Self::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            view: ViewConfig {
                limits: ZoomLimits {
                    min_scale: env_parse(ENV_MIN_SCALE, MIN_SCALE),
                    max_scale: env_parse(ENV_MAX_SCALE, MAX_SCALE),
                },
                zoom_sensitivity: env_parse(ENV_ZOOM_SENSITIVITY, ZOOM_SENSITIVITY),
                cell_size: env_parse(ENV_CELL_SIZE, CELL_SIZE),
            },
            grid: GridConfig {
                initial_rows: env_parse(ENV_INITIAL_ROWS, INITIAL_ROW_COUNT),
                initial_columns: env_parse(ENV_INITIAL_COLUMNS, INITIAL_COLUMN_COUNT),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the config describes a usable camera and a non-empty grid.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ZoomLimits { min_scale, max_scale } = self.view.limits;
        if !min_scale.is_finite() || !max_scale.is_finite() || min_scale <= 0.0 || min_scale > max_scale {
            return Err(ConfigError::InvalidZoomLimits { min: min_scale, max: max_scale });
        }
        if !self.view.zoom_sensitivity.is_finite() || self.view.zoom_sensitivity <= 0.0 {
            return Err(ConfigError::InvalidSensitivity(self.view.zoom_sensitivity));
        }
        if !self.view.cell_size.is_finite() || self.view.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.view.cell_size));
        }
        if self.grid.initial_rows < 1 || self.grid.initial_columns < 1 {
            return Err(ConfigError::EmptyGrid { rows: self.grid.initial_rows, columns: self.grid.initial_columns });
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
