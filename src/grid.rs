//! Grid mirror: the local, ordered copy of the shared cell grid.
//!
//! Rows live in a `VecDeque` and each row's cells in another, so every
//! structural edit happens at one of the four edges in O(1) amortized time
//! (O(rows) for a column edit, which touches each row once). Row and column
//! indices are contiguous and every row spans the same columns; indices may
//! go negative as the grid grows up or to the left.
//!
//! The mirror is a pure data structure. It knows nothing about the document
//! or color groups; [`crate::sync::Reconciler`] drives it.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use std::collections::VecDeque;
use std::fmt;
use std::ops::RangeInclusive;

/// Identity of a cell: its row and column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub row: i32,
    pub column: i32,
}

impl CellId {
    #[must_use]
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// One cell of the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row: i32,
    pub column: i32,
    /// Fill color as a CSS color string; `None` is an unpainted cell.
    pub color: Option<String>,
    /// Name of the color group this cell belongs to, if any.
    pub group: Option<String>,
}

impl Cell {
    #[must_use]
    pub fn empty(id: CellId) -> Self {
        Self { row: id.row, column: id.column, color: None, group: None }
    }

    #[must_use]
    pub fn id(&self) -> CellId {
        CellId::new(self.row, self.column)
    }

    fn from_seed(id: CellId, seed: Option<&CellSeed>) -> Self {
        let Some(seed) = seed else {
            return Self::empty(id);
        };
        Self { row: id.row, column: id.column, color: seed.color.clone(), group: seed.group.clone() }
    }
}

/// Initial contents for a cell created by a row or column insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellSeed {
    pub color: Option<String>,
    pub group: Option<String>,
}

/// A row of cells in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: i32,
    cells: VecDeque<Cell>,
}

impl Row {
    /// Cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Which horizontal edge a row edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEdge {
    Top,
    Bottom,
}

impl fmt::Display for RowEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

/// Which vertical edge a column edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEdge {
    Left,
    Right,
}

impl fmt::Display for ColumnEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Structural edit rejected by the mirror.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("row {index} is not at the {edge} edge (expected {expected})")]
    RowNotAtEdge { index: i32, edge: RowEdge, expected: i32 },
    #[error("column {index} is not at the {edge} edge (expected {expected})")]
    ColumnNotAtEdge { index: i32, edge: ColumnEdge, expected: i32 },
    #[error("cannot delete row {index}: the grid must keep at least one row")]
    LastRow { index: i32 },
    #[error("cannot delete column {index}: the grid must keep at least one column")]
    LastColumn { index: i32 },
    #[error("grid span {rows:?} x {columns:?} is empty")]
    EmptySpan { rows: RangeInclusive<i32>, columns: RangeInclusive<i32> },
}

/// Ordered, contiguous 2D grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMirror {
    rows: VecDeque<Row>,
    column_start: i32,
    column_last: i32,
}

impl GridMirror {
    /// Create a grid of empty cells covering `rows` × `columns`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySpan`] if either range is empty.
    pub fn with_span(rows: RangeInclusive<i32>, columns: RangeInclusive<i32>) -> Result<Self, GridError> {
        Self::from_fn(rows, columns, |_| None)
    }

    /// Create a grid whose cells are seeded by `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySpan`] if either range is empty.
    pub fn from_fn<F>(rows: RangeInclusive<i32>, columns: RangeInclusive<i32>, mut seed: F) -> Result<Self, GridError>
    where
        F: FnMut(CellId) -> Option<CellSeed>,
    {
        if rows.is_empty() || columns.is_empty() {
            return Err(GridError::EmptySpan { rows, columns });
        }
        let grid_rows = rows
            .clone()
            .map(|row| Row {
                index: row,
                cells: columns
                    .clone()
                    .map(|column| {
                        let id = CellId::new(row, column);
                        Cell::from_seed(id, seed(id).as_ref())
                    })
                    .collect(),
            })
            .collect();
        Ok(Self { rows: grid_rows, column_start: *columns.start(), column_last: *columns.end() })
    }

    // --- Spans ---

    #[must_use]
    pub fn row_start(&self) -> i32 {
        self.rows.front().map_or(0, |r| r.index)
    }

    #[must_use]
    pub fn row_last(&self) -> i32 {
        self.rows.back().map_or(0, |r| r.index)
    }

    #[must_use]
    pub fn column_start(&self) -> i32 {
        self.column_start
    }

    #[must_use]
    pub fn column_last(&self) -> i32 {
        self.column_last
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.front().map_or(0, Row::len)
    }

    /// Whether `id` lies inside the current spans.
    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        (self.row_start()..=self.row_last()).contains(&id.row)
            && (self.column_start..=self.column_last).contains(&id.column)
    }

    // --- Reads ---

    /// Rows in index order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flat_map(Row::cells)
    }

    #[must_use]
    pub fn row(&self, index: i32) -> Option<&Row> {
        let offset = offset_of(self.row_start(), index)?;
        self.rows.get(offset)
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        let offset = offset_of(self.column_start, id.column)?;
        self.row(id.row)?.cells.get(offset)
    }

    fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        let row_offset = offset_of(self.row_start(), id.row)?;
        let column_offset = offset_of(self.column_start, id.column)?;
        self.rows.get_mut(row_offset)?.cells.get_mut(column_offset)
    }

    // --- Cell writes ---

    /// Overwrite a cell's color and group, returning its previous contents.
    ///
    /// Writes outside the current spans are dropped and return `None`; a
    /// remote color change may arrive after the remote delete of its row.
    pub fn set_cell(&mut self, id: CellId, color: Option<String>, group: Option<String>) -> Option<Cell> {
        let cell = self.cell_mut(id)?;
        let previous = cell.clone();
        cell.color = color;
        cell.group = group;
        Some(previous)
    }

    // --- Structural edits ---

    /// Insert a row one beyond `edge`. `initial` fills the new cells in
    /// column order; missing entries are empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RowNotAtEdge`] if `index` is not exactly one
    /// beyond the current edge row.
    pub fn insert_row(&mut self, index: i32, edge: RowEdge, initial: &[CellSeed]) -> Result<&Row, GridError> {
        let expected = match edge {
            RowEdge::Top => self.row_start() - 1,
            RowEdge::Bottom => self.row_last() + 1,
        };
        if index != expected {
            return Err(GridError::RowNotAtEdge { index, edge, expected });
        }
        let cells = (self.column_start..=self.column_last)
            .zip(seeds(initial))
            .map(|(column, seed)| Cell::from_seed(CellId::new(index, column), seed))
            .collect();
        let row = Row { index, cells };
        match edge {
            RowEdge::Top => {
                self.rows.push_front(row);
                Ok(&self.rows[0])
            }
            RowEdge::Bottom => {
                self.rows.push_back(row);
                Ok(&self.rows[self.rows.len() - 1])
            }
        }
    }

    /// Delete the row at `edge`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::RowNotAtEdge`] if `index` is not the current edge
    /// row, or [`GridError::LastRow`] if it is the only row left.
    pub fn delete_row(&mut self, index: i32, edge: RowEdge) -> Result<Row, GridError> {
        let expected = match edge {
            RowEdge::Top => self.row_start(),
            RowEdge::Bottom => self.row_last(),
        };
        if index != expected {
            return Err(GridError::RowNotAtEdge { index, edge, expected });
        }
        if self.rows.len() <= 1 {
            return Err(GridError::LastRow { index });
        }
        let removed = match edge {
            RowEdge::Top => self.rows.pop_front(),
            RowEdge::Bottom => self.rows.pop_back(),
        };
        removed.ok_or(GridError::LastRow { index })
    }

    /// Insert a column one beyond `edge` into every row. `initial` fills the
    /// new cells in row order; missing entries are empty.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ColumnNotAtEdge`] if `index` is not exactly one
    /// beyond the current edge column.
    pub fn insert_column(&mut self, index: i32, edge: ColumnEdge, initial: &[CellSeed]) -> Result<Vec<Cell>, GridError> {
        let expected = match edge {
            ColumnEdge::Left => self.column_start - 1,
            ColumnEdge::Right => self.column_last + 1,
        };
        if index != expected {
            return Err(GridError::ColumnNotAtEdge { index, edge, expected });
        }
        let mut inserted = Vec::with_capacity(self.rows.len());
        for (row, seed) in self.rows.iter_mut().zip(seeds(initial)) {
            let cell = Cell::from_seed(CellId::new(row.index, index), seed);
            inserted.push(cell.clone());
            match edge {
                ColumnEdge::Left => row.cells.push_front(cell),
                ColumnEdge::Right => row.cells.push_back(cell),
            }
        }
        match edge {
            ColumnEdge::Left => self.column_start = index,
            ColumnEdge::Right => self.column_last = index,
        }
        Ok(inserted)
    }

    /// Delete the column at `edge` from every row, returning its cells in row order.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ColumnNotAtEdge`] if `index` is not the current
    /// edge column, or [`GridError::LastColumn`] if it is the only column left.
    pub fn delete_column(&mut self, index: i32, edge: ColumnEdge) -> Result<Vec<Cell>, GridError> {
        let expected = match edge {
            ColumnEdge::Left => self.column_start,
            ColumnEdge::Right => self.column_last,
        };
        if index != expected {
            return Err(GridError::ColumnNotAtEdge { index, edge, expected });
        }
        if self.column_start == self.column_last {
            return Err(GridError::LastColumn { index });
        }
        let mut removed = Vec::with_capacity(self.rows.len());
        for row in &mut self.rows {
            let cell = match edge {
                ColumnEdge::Left => row.cells.pop_front(),
                ColumnEdge::Right => row.cells.pop_back(),
            };
            removed.extend(cell);
        }
        match edge {
            ColumnEdge::Left => self.column_start += 1,
            ColumnEdge::Right => self.column_last -= 1,
        }
        Ok(removed)
    }
}

/// Seeds padded with `None` forever, so zipping never truncates the lane.
fn seeds(initial: &[CellSeed]) -> impl Iterator<Item = Option<&CellSeed>> {
    initial.iter().map(Some).chain(std::iter::repeat(None))
}

/// Position of `index` in a lane that starts at `start`.
fn offset_of(start: i32, index: i32) -> Option<usize> {
    let Ok(offset) = usize::try_from(i64::from(index) - i64::from(start)) else {
        return None;
    };
    Some(offset)
}
