//! Shared document model and the narrow collaborator interface around it.
//!
//! The replicated document itself lives outside this crate. The core only
//! needs three things from it, captured by [`SharedDocument`]: a stream of
//! change batches, a synchronous mutation entry point, and read access to
//! the current root. [`GridRoot`] is the wire shape of that root: a sparse
//! `cellGrid` of row → column → [`CellData`], and the four edge bounds with
//! their acknowledged `_prev` values.
//!
//! [`MemoryDocument`] is an in-process implementation. It reports changes
//! the way a replicated store does, as one flat dot-separated path per
//! changed leaf (`root.cellGrid.5.7.color`, `root.bounds.rowStart_prev`),
//! and is used by tests and headless hosts.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bounds::Edge;
use crate::config::GridConfig;
use crate::grid::CellId;

/// Path prefix of every change reported by a document.
pub const ROOT_PATH: &str = "root";

/// Where a change was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// This peer.
    Local,
    /// Another peer, delivered by replication.
    Remote,
}

/// One cell as stored in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellData {
    pub color: Option<String>,
    /// Color-group name; empty or absent means ungrouped.
    pub name: Option<String>,
}

/// Edge bounds as stored in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsData {
    #[serde(rename = "rowStart")]
    pub row_start: i32,
    #[serde(rename = "rowStart_prev")]
    pub row_start_prev: i32,
    #[serde(rename = "rowLast")]
    pub row_last: i32,
    #[serde(rename = "rowLast_prev")]
    pub row_last_prev: i32,
    #[serde(rename = "columnStart")]
    pub column_start: i32,
    #[serde(rename = "columnStart_prev")]
    pub column_start_prev: i32,
    #[serde(rename = "columnLast")]
    pub column_last: i32,
    #[serde(rename = "columnLast_prev")]
    pub column_last_prev: i32,
}

impl BoundsData {
    /// Bounds covering `rows` × `columns` starting at (0, 0), fully acknowledged.
    #[must_use]
    pub fn settled(rows: i32, columns: i32) -> Self {
        Self {
            row_start: 0,
            row_start_prev: 0,
            row_last: rows - 1,
            row_last_prev: rows - 1,
            column_start: 0,
            column_start_prev: 0,
            column_last: columns - 1,
            column_last_prev: columns - 1,
        }
    }

    #[must_use]
    pub fn current(&self, edge: Edge) -> i32 {
        match edge {
            Edge::RowStart => self.row_start,
            Edge::RowLast => self.row_last,
            Edge::ColumnStart => self.column_start,
            Edge::ColumnLast => self.column_last,
        }
    }

    #[must_use]
    pub fn previous(&self, edge: Edge) -> i32 {
        match edge {
            Edge::RowStart => self.row_start_prev,
            Edge::RowLast => self.row_last_prev,
            Edge::ColumnStart => self.column_start_prev,
            Edge::ColumnLast => self.column_last_prev,
        }
    }

    pub fn set_current(&mut self, edge: Edge, value: i32) {
        match edge {
            Edge::RowStart => self.row_start = value,
            Edge::RowLast => self.row_last = value,
            Edge::ColumnStart => self.column_start = value,
            Edge::ColumnLast => self.column_last = value,
        }
    }

    pub fn set_previous(&mut self, edge: Edge, value: i32) {
        match edge {
            Edge::RowStart => self.row_start_prev = value,
            Edge::RowLast => self.row_last_prev = value,
            Edge::ColumnStart => self.column_start_prev = value,
            Edge::ColumnLast => self.column_last_prev = value,
        }
    }
}

/// The shared root: sparse cell data plus edge bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridRoot {
    #[serde(rename = "cellGrid")]
    pub cell_grid: BTreeMap<i32, BTreeMap<i32, CellData>>,
    pub bounds: BoundsData,
}

impl GridRoot {
    /// A root holding an empty `initial_rows` × `initial_columns` grid.
    #[must_use]
    pub fn seeded(config: &GridConfig) -> Self {
        let cell_grid = (0..config.initial_rows)
            .map(|row| (row, (0..config.initial_columns).map(|column| (column, CellData::default())).collect()))
            .collect();
        Self { cell_grid, bounds: BoundsData::settled(config.initial_rows, config.initial_columns) }
    }

    /// Whether the root holds no cell data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell_grid.values().all(BTreeMap::is_empty)
    }

    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&CellData> {
        self.cell_grid.get(&id.row)?.get(&id.column)
    }

    /// The cell at `id`, created empty if absent.
    pub fn cell_mut(&mut self, id: CellId) -> &mut CellData {
        self.cell_grid.entry(id.row).or_default().entry(id.column).or_default()
    }

    /// Drop every cell in `row`.
    pub fn remove_row(&mut self, row: i32) {
        self.cell_grid.remove(&row);
    }

    /// Drop every cell in `column`.
    pub fn remove_column(&mut self, column: i32) {
        for cells in self.cell_grid.values_mut() {
            cells.remove(&column);
        }
        self.cell_grid.retain(|_, cells| !cells.is_empty());
    }
}

/// One changed leaf of the shared root.
#[derive(Debug, Clone, PartialEq)]
pub struct DocChange {
    /// Dot-separated path from the root, e.g. `root.cellGrid.5.7.color`.
    pub path: String,
    pub origin: Origin,
    /// New value; `Value::Null` for a removed leaf.
    pub value: Value,
}

/// The changes of one committed update, in path order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    pub changes: Vec<DocChange>,
}

impl ChangeBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Failure to read or mutate the shared document.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("document is not attached")]
    Detached,
    #[error("failed to encode document root: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The replicated-document collaborator.
///
/// Batches are delivered in commit order, exactly once, to every receiver
/// handed out by [`SharedDocument::subscribe`].
pub trait SharedDocument {
    /// Register for change batches.
    fn subscribe(&mut self) -> Receiver<ChangeBatch>;

    /// Mutate the root as a local edit and broadcast the resulting changes.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Detached`] before the document is ready.
    fn update(&mut self, mutator: &mut dyn FnMut(&mut GridRoot)) -> Result<(), DocError>;

    /// The current root, or `None` until the document is ready.
    fn root(&self) -> Option<&GridRoot>;
}

/// In-process document that diffs its root on every commit.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    root: Option<GridRoot>,
    subscribers: Vec<Sender<ChangeBatch>>,
}

impl MemoryDocument {
    /// A document that is not ready yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A ready document with an empty root.
    #[must_use]
    pub fn attached() -> Self {
        Self { root: Some(GridRoot::default()), subscribers: Vec::new() }
    }

    /// Signal readiness. An already attached document keeps its root.
    pub fn attach(&mut self) {
        self.root.get_or_insert_with(GridRoot::default);
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.root.is_some()
    }

    /// Apply a mutation received from another peer.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::Detached`] before the document is ready.
    pub fn apply_remote(&mut self, mutator: &mut dyn FnMut(&mut GridRoot)) -> Result<(), DocError> {
        self.commit(Origin::Remote, mutator)
    }

    fn commit(&mut self, origin: Origin, mutator: &mut dyn FnMut(&mut GridRoot)) -> Result<(), DocError> {
        let Some(root) = self.root.as_mut() else {
            return Err(DocError::Detached);
        };
        let before = flatten(root)?;
        mutator(root);
        let after = flatten(root)?;
        let batch = diff(&before, after, origin);
        if batch.is_empty() {
            return Ok(());
        }
        // Receivers that have been dropped are unsubscribed.
        self.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
        Ok(())
    }
}

impl SharedDocument for MemoryDocument {
    fn subscribe(&mut self) -> Receiver<ChangeBatch> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn update(&mut self, mutator: &mut dyn FnMut(&mut GridRoot)) -> Result<(), DocError> {
        self.commit(Origin::Local, mutator)
    }

    fn root(&self) -> Option<&GridRoot> {
        self.root.as_ref()
    }
}

/// Every leaf of `root` keyed by its dot path.
fn flatten(root: &GridRoot) -> Result<BTreeMap<String, Value>, DocError> {
    let mut leaves = BTreeMap::new();
    collect_leaves(ROOT_PATH, serde_json::to_value(root)?, &mut leaves);
    Ok(leaves)
}

fn collect_leaves(path: &str, value: Value, leaves: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(&format!("{path}.{key}"), child, leaves);
            }
        }
        leaf => {
            leaves.insert(path.to_owned(), leaf);
        }
    }
}

fn diff(before: &BTreeMap<String, Value>, after: BTreeMap<String, Value>, origin: Origin) -> ChangeBatch {
    let removed = before
        .keys()
        .filter(|path| !after.contains_key(*path))
        .map(|path| DocChange { path: path.clone(), origin, value: Value::Null })
        .collect::<Vec<_>>();
    let mut changes = after
        .into_iter()
        .filter(|(path, value)| before.get(path) != Some(value))
        .map(|(path, value)| DocChange { path, origin, value })
        .collect::<Vec<_>>();
    changes.extend(removed);
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    ChangeBatch { changes }
}
