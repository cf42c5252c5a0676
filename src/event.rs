//! Typed sync events, adapted from raw document change paths.
//!
//! Only this module looks at path strings. Everything downstream consumes
//! [`SyncEvent`]s.

#[cfg(test)]
#[path = "event_test.rs"]
mod event_test;

use serde_json::Value;
use tracing::trace;

use crate::bounds::Edge;
use crate::doc::{DocChange, Origin, ROOT_PATH};
use crate::grid::CellId;

const CELL_GRID_KEY: &str = "cellGrid";
const BOUNDS_KEY: &str = "bounds";
const PREVIOUS_SUFFIX: &str = "_prev";

/// Which half of a bound pair changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundField {
    Current,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    CellColorChanged { cell: CellId, color: Option<String>, origin: Origin },
    /// `name` is `None` for an empty or removed group name.
    CellNameChanged { cell: CellId, name: Option<String>, origin: Origin },
    BoundChanged { edge: Edge, field: BoundField, value: i32, origin: Origin },
}

impl SyncEvent {
    /// Classify one changed leaf. Paths this core does not track yield `None`.
    #[must_use]
    pub fn classify(change: &DocChange) -> Option<Self> {
        let event = parse(change);
        if event.is_none() {
            trace!(path = %change.path, "ignoring untracked change");
        }
        event
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        match self {
            Self::CellColorChanged { origin, .. }
            | Self::CellNameChanged { origin, .. }
            | Self::BoundChanged { origin, .. } => *origin,
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::BoundChanged { .. })
    }
}

fn parse(change: &DocChange) -> Option<SyncEvent> {
    let segments: Vec<&str> = change.path.split('.').collect();
    let origin = change.origin;
    match segments.as_slice() {
        [root, grid, row, column, field] if *root == ROOT_PATH && *grid == CELL_GRID_KEY => {
            let (Ok(row), Ok(column)) = (row.parse::<i32>(), column.parse::<i32>()) else {
                return None;
            };
            let cell = CellId::new(row, column);
            match *field {
                "color" => Some(SyncEvent::CellColorChanged { cell, color: string_value(&change.value), origin }),
                "name" => Some(SyncEvent::CellNameChanged {
                    cell,
                    name: string_value(&change.value).filter(|name| !name.is_empty()),
                    origin,
                }),
                _ => None,
            }
        }
        [root, bounds, key] if *root == ROOT_PATH && *bounds == BOUNDS_KEY => {
            let (key, field) = match key.strip_suffix(PREVIOUS_SUFFIX) {
                Some(edge) => (edge, BoundField::Previous),
                None => (*key, BoundField::Current),
            };
            let edge = Edge::from_key(key)?;
            let Ok(value) = i32::try_from(change.value.as_i64()?) else {
                return None;
            };
            Some(SyncEvent::BoundChanged { edge, field, value, origin })
        }
        _ => None,
    }
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}
