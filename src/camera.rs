//! Camera state and the world ↔ screen coordinate mapping.
//!
//! World space is the grid's own coordinate system: one cell is
//! `cell_size` units wide and the grid is centered on the world origin.
//! Screen space is CSS pixels relative to the canvas's top-left corner.
//! The two point types are distinct so they cannot be mixed without going
//! through [`Camera::world_to_screen`] or [`Camera::screen_to_world`].
//!
//! The mapping applies, in order: scale, offset, device-pixel correction
//! (the backing store is `dpr` times the CSS size) and the translation to the
//! canvas center. The inverse undoes the same steps in reverse, so the two
//! are exact mutual inverses up to float rounding.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, Sub};

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point (or displacement) in screen space, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two screen points.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

impl Add for ScreenPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for ScreenPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

/// Canvas size and device pixel ratio.
///
/// `width` / `height` are the backing-store size in device pixels, the way
/// the canvas element reports them; CSS size is that divided by `dpr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 0.0, height: 0.0, dpr: 1.0 }
    }
}

impl Viewport {
    /// Viewport for a canvas laid out at `width_css` × `height_css`.
    ///
    /// A non-positive or non-finite `dpr` is treated as 1.
    #[must_use]
    pub fn from_css(width_css: f64, height_css: f64, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Self { width: width_css * dpr, height: height_css * dpr, dpr }
    }

    /// Width in CSS pixels.
    #[must_use]
    pub fn css_width(&self) -> f64 {
        self.width / self.dpr
    }

    /// Height in CSS pixels.
    #[must_use]
    pub fn css_height(&self) -> f64 {
        self.height / self.dpr
    }

    /// Canvas center in screen space.
    #[must_use]
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint { x: self.css_width() / 2.0, y: self.css_height() / 2.0 }
    }
}

/// Camera state for pan/zoom over the grid.
///
/// `offset` is in CSS pixels, measured from the canvas center.
/// `scale` is a zoom factor (1.0 = no zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scale: f64,
    pub offset: ScreenPoint,
}

impl Default for Camera {
    fn default() -> Self {
        Self { scale: 1.0, offset: ScreenPoint::default() }
    }
}

impl Camera {
    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: WorldPoint, viewport: &Viewport) -> ScreenPoint {
        let center = viewport.center();
        ScreenPoint {
            x: world.x * self.scale + self.offset.x + center.x,
            y: world.y * self.scale + self.offset.y + center.y,
        }
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint, viewport: &Viewport) -> WorldPoint {
        let center = viewport.center();
        WorldPoint {
            x: (screen.x - center.x - self.offset.x) / self.scale,
            y: (screen.y - center.y - self.offset.y) / self.scale,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Offset that keeps the world point under `pivot` fixed when the scale
    /// changes to `new_scale`.
    #[must_use]
    pub fn pivot_offset(&self, pivot: ScreenPoint, new_scale: f64, viewport: &Viewport) -> ScreenPoint {
        let world = self.screen_to_world(pivot, viewport);
        let rescaled = Self { scale: new_scale, offset: self.offset };
        let drifted = rescaled.world_to_screen(world, viewport);
        self.offset + (pivot - drifted)
    }
}
