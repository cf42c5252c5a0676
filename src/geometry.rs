//! Grid geometry in world space and world-point hit-testing against cells.
//!
//! The grid is centered on the world origin: an odd count puts the middle
//! cell's center on the origin, an even count puts a grid line there. Both
//! cases reduce to a top-left corner at minus half the grid's extent.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::WorldPoint;
use crate::grid::{CellId, GridMirror};

/// World-space top-left corner of a `rows` × `columns` grid of `cell_size` cells.
#[must_use]
pub fn grid_origin(rows: i32, columns: i32, cell_size: f64) -> WorldPoint {
    WorldPoint { x: -(f64::from(columns) * cell_size) / 2.0, y: -(f64::from(rows) * cell_size) / 2.0 }
}

/// An axis-aligned rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WorldRect {
    #[must_use]
    pub fn contains(&self, p: WorldPoint) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Placement of a grid's cells in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub row_start: i32,
    pub column_start: i32,
    pub rows: i32,
    pub columns: i32,
    pub cell_size: f64,
}

impl GridLayout {
    /// Layout for the current spans of `grid`.
    #[must_use]
    pub fn of(grid: &GridMirror, cell_size: f64) -> Self {
        Self {
            row_start: grid.row_start(),
            column_start: grid.column_start(),
            rows: grid.row_last() - grid.row_start() + 1,
            columns: grid.column_last() - grid.column_start() + 1,
            cell_size,
        }
    }

    #[must_use]
    pub fn origin(&self) -> WorldPoint {
        grid_origin(self.rows, self.columns, self.cell_size)
    }

    /// World-space bounds of the whole grid.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        let origin = self.origin();
        WorldRect {
            x: origin.x,
            y: origin.y,
            width: f64::from(self.columns) * self.cell_size,
            height: f64::from(self.rows) * self.cell_size,
        }
    }

    /// World-space rectangle of one cell. Cells outside the layout still get a
    /// rectangle, extrapolated from the grid origin.
    #[must_use]
    pub fn cell_rect(&self, id: CellId) -> WorldRect {
        let origin = self.origin();
        WorldRect {
            x: origin.x + f64::from(id.column - self.column_start) * self.cell_size,
            y: origin.y + f64::from(id.row - self.row_start) * self.cell_size,
            width: self.cell_size,
            height: self.cell_size,
        }
    }

    /// The cell under `world`, if it falls inside the grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_at(&self, world: WorldPoint) -> Option<CellId> {
        if !self.bounds().contains(world) {
            return None;
        }
        let origin = self.origin();
        // Bounded by the grid extent checked above, so the floors fit in i32.
        let column = ((world.x - origin.x) / self.cell_size).floor() as i32;
        let row = ((world.y - origin.y) / self.cell_size).floor() as i32;
        Some(CellId::new(self.row_start + row.min(self.rows - 1), self.column_start + column.min(self.columns - 1)))
    }
}
