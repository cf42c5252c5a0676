//! Edge bounds and the single-step growth protocol.
//!
//! Each of the four grid edges carries a [`BoundPair`]: `current` is the
//! value most recently seen in the shared document, `previous` is the value
//! the local mirror has been brought to. The difference between them may
//! only ever be bridged one step at a time. A step of ±1 maps to exactly one
//! structural edit on the mirror (see [`BoundPair::plan`]); `previous`
//! advances by that step only once the edit has been applied, so a failed
//! edit can be retried on the next notification. Anything larger is a
//! [`BoundViolation`] and produces no edit at all.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use std::fmt;

use crate::grid::{ColumnEdge, RowEdge};

/// One of the four growable grid edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge {
    RowStart,
    RowLast,
    ColumnStart,
    ColumnLast,
}

impl Edge {
    pub const ALL: [Self; 4] = [Self::RowStart, Self::RowLast, Self::ColumnStart, Self::ColumnLast];

    /// Field name of this edge in the shared document.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::RowStart => "rowStart",
            Self::RowLast => "rowLast",
            Self::ColumnStart => "columnStart",
            Self::ColumnLast => "columnLast",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|edge| edge.key() == key)
    }

    /// Direction in which growing this edge moves its bound value.
    #[must_use]
    pub fn outward(self) -> i32 {
        match self {
            Self::RowStart | Self::ColumnStart => -1,
            Self::RowLast | Self::ColumnLast => 1,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::RowStart => 0,
            Self::RowLast => 1,
            Self::ColumnStart => 2,
            Self::ColumnLast => 3,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The structural edit a single bound step requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneEdit {
    InsertRow { index: i32, edge: RowEdge },
    DeleteRow { index: i32, edge: RowEdge },
    InsertColumn { index: i32, edge: ColumnEdge },
    DeleteColumn { index: i32, edge: ColumnEdge },
}

/// A planned single step on one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundStep {
    pub edge: Edge,
    /// `+1` or `-1`.
    pub step: i32,
    pub edit: LaneEdit,
}

/// A bound moved by more than one step since the mirror last caught up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("bound {edge} moved from {previous} to {current}; only single steps can be applied")]
pub struct BoundViolation {
    pub edge: Edge,
    pub current: i32,
    pub previous: i32,
}

/// Current and previous value of one edge bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundPair {
    pub current: i32,
    pub previous: i32,
}

impl BoundPair {
    /// A pair with nothing left to apply.
    #[must_use]
    pub fn settled(value: i32) -> Self {
        Self { current: value, previous: value }
    }

    #[must_use]
    pub fn delta(&self) -> i64 {
        i64::from(self.current) - i64::from(self.previous)
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.current == self.previous
    }

    /// Plan the edit that brings the mirror one step closer to `current`.
    ///
    /// Returns `Ok(None)` when already settled.
    ///
    /// # Errors
    ///
    /// Returns [`BoundViolation`] when `|current − previous| > 1`.
    pub fn plan(&self, edge: Edge) -> Result<Option<BoundStep>, BoundViolation> {
        let step = match self.delta() {
            0 => return Ok(None),
            1 => 1,
            -1 => -1,
            _ => return Err(BoundViolation { edge, current: self.current, previous: self.previous }),
        };
        let old = self.previous;
        let edit = match (edge, step > 0) {
            (Edge::RowStart, true) => LaneEdit::DeleteRow { index: old, edge: RowEdge::Top },
            (Edge::RowStart, false) => LaneEdit::InsertRow { index: old - 1, edge: RowEdge::Top },
            (Edge::RowLast, true) => LaneEdit::InsertRow { index: old + 1, edge: RowEdge::Bottom },
            (Edge::RowLast, false) => LaneEdit::DeleteRow { index: old, edge: RowEdge::Bottom },
            (Edge::ColumnStart, true) => LaneEdit::DeleteColumn { index: old, edge: ColumnEdge::Left },
            (Edge::ColumnStart, false) => LaneEdit::InsertColumn { index: old - 1, edge: ColumnEdge::Left },
            (Edge::ColumnLast, true) => LaneEdit::InsertColumn { index: old + 1, edge: ColumnEdge::Right },
            (Edge::ColumnLast, false) => LaneEdit::DeleteColumn { index: old, edge: ColumnEdge::Right },
        };
        Ok(Some(BoundStep { edge, step, edit }))
    }

    /// Record that a planned step has been applied to the mirror.
    pub fn advance(&mut self, step: i32) {
        self.previous += step;
    }
}

/// The four bound pairs of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundSet {
    pairs: [BoundPair; 4],
}

impl BoundSet {
    /// Settled bounds for the given spans.
    #[must_use]
    pub fn settled(row_start: i32, row_last: i32, column_start: i32, column_last: i32) -> Self {
        Self {
            pairs: [
                BoundPair::settled(row_start),
                BoundPair::settled(row_last),
                BoundPair::settled(column_start),
                BoundPair::settled(column_last),
            ],
        }
    }

    #[must_use]
    pub fn get(&self, edge: Edge) -> BoundPair {
        self.pairs[edge.index()]
    }

    pub fn get_mut(&mut self, edge: Edge) -> &mut BoundPair {
        &mut self.pairs[edge.index()]
    }

    /// Record a newly observed `current` value and plan the next step.
    ///
    /// # Errors
    ///
    /// Returns [`BoundViolation`] when the observed value is more than one
    /// step away from `previous`.
    pub fn observe(&mut self, edge: Edge, current: i32) -> Result<Option<BoundStep>, BoundViolation> {
        let pair = self.get_mut(edge);
        pair.current = current;
        pair.plan(edge)
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pairs.iter().all(BoundPair::is_settled)
    }
}
