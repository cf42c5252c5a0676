//! Shared numeric constants for the pixelboard crate.

// ── Camera ──────────────────────────────────────────────────────

/// Smallest scale a zoom gesture may commit.
pub const MIN_SCALE: f64 = 0.9;

/// Largest scale a zoom gesture may commit.
pub const MAX_SCALE: f64 = 1.2;

/// Divisor applied to wheel and pinch deltas when deriving a zoom factor.
pub const ZOOM_SENSITIVITY: f64 = 300.0;

/// Pinch distance deltas count double relative to wheel deltas.
pub const PINCH_ZOOM_MULTIPLIER: f64 = 2.0;

// ── Grid ────────────────────────────────────────────────────────

/// Edge length of one cell in world units.
pub const CELL_SIZE: f64 = 20.0;

/// Rows seeded into an empty shared document.
pub const INITIAL_ROW_COUNT: i32 = 32;

/// Columns seeded into an empty shared document.
pub const INITIAL_COLUMN_COUNT: i32 = 32;

// ── Rendering ───────────────────────────────────────────────────

/// Grid line width in screen pixels, independent of zoom.
pub const GRID_LINE_WIDTH_PX: f64 = 1.0;

/// Canvas background behind the grid.
pub const BACKGROUND_FILL: &str = "#FFFFFF";

/// Grid line color.
pub const GRID_STROKE: &str = "#1F1A17";
