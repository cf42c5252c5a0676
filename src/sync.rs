//! Synchronization reconciler: document notifications in, mirror edits out.
//!
//! The [`Reconciler`] exclusively owns the [`GridMirror`], the four
//! [`BoundPair`](crate::bounds::BoundPair)s and the [`ColorGroups`] index.
//! It is fed whole [`ChangeBatch`]es. Within a batch, bound changes apply
//! before cell changes, so cell data for a lane created by the same batch
//! lands on the new lane instead of being dropped as out of range. A single
//! [`Action::RenderNeeded`] closes any batch that changed something.
//!
//! Structural edits apply regardless of origin. Origin only decides whether
//! a color change is reported as [`Action::HistoryPolluted`].
//!
//! A batch that moves an edge by more than one lane is normally dropped. The
//! exception is a settled rewrite: the same batch also acknowledges the new
//! value in `<edge>_prev`, so the document already agrees with itself (a
//! reset, or steps another peer applied while this one was away). The mirror
//! is then rebuilt from the root.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use tracing::{debug, info, trace, warn};

use crate::bounds::{BoundSet, BoundStep, Edge, LaneEdit};
use crate::doc::{ChangeBatch, GridRoot, Origin};
use crate::engine::Action;
use crate::event::{BoundField, SyncEvent};
use crate::grid::{Cell, CellId, CellSeed, GridError, GridMirror};
use crate::groups::{ColorGroups, GroupCriteria, GroupMember};

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    grid: Option<GridMirror>,
    bounds: BoundSet,
    groups: ColorGroups,
    /// Applied steps whose new `previous` has not been written back yet.
    acks: Vec<(Edge, i32)>,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    /// Whether a mirror has been built from a document root.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.grid.is_some()
    }

    #[must_use]
    pub fn grid(&self) -> Option<&GridMirror> {
        self.grid.as_ref()
    }

    #[must_use]
    pub fn groups(&self) -> &ColorGroups {
        &self.groups
    }

    #[must_use]
    pub fn bounds(&self) -> &BoundSet {
        &self.bounds
    }

    /// Drain the queue of `(edge, previous)` values to acknowledge.
    pub fn take_acks(&mut self) -> Vec<(Edge, i32)> {
        std::mem::take(&mut self.acks)
    }

    // --- Hydration ---

    /// Rebuild mirror, bounds and groups from `root`.
    ///
    /// Bounds come back settled: whatever the document says now is what the
    /// mirror covers.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySpan`] if the root's bounds describe an
    /// empty grid. The previous state is kept in that case.
    pub fn hydrate(&mut self, root: &GridRoot) -> Result<Vec<Action>, GridError> {
        let b = root.bounds;
        let grid = GridMirror::from_fn(b.row_start..=b.row_last, b.column_start..=b.column_last, |id| {
            Some(seed_from(root, id))
        })?;
        self.bounds = BoundSet::settled(b.row_start, b.row_last, b.column_start, b.column_last);
        self.groups.clear();
        for cell in grid.cells() {
            if let Some(name) = &cell.group {
                self.groups.append_to_group(name, [GroupMember::new(cell.id(), cell.color.clone())]);
            }
        }
        self.acks.clear();
        info!(
            rows = grid.row_count(),
            columns = grid.column_count(),
            groups = self.groups.len(),
            "grid hydrated"
        );
        self.grid = Some(grid);
        Ok(vec![Action::GridReset, Action::GroupsChanged, Action::RenderNeeded])
    }

    // --- Batches ---

    /// Apply one change batch. `root` is the document state after the batch
    /// and seeds the cells of newly inserted lanes.
    pub fn apply_batch(&mut self, batch: &ChangeBatch, root: Option<&GridRoot>) -> Vec<Action> {
        if self.grid.is_none() {
            trace!(changes = batch.changes.len(), "batch before hydrate; ignored");
            return Vec::new();
        }
        let events: Vec<SyncEvent> = batch.changes.iter().filter_map(SyncEvent::classify).collect();
        if let Some(root) = root.filter(|_| self.is_settled_rewrite(&events)) {
            info!(changes = batch.changes.len(), "settled bound rewrite; rehydrating");
            match self.hydrate(root) {
                Ok(actions) => return actions,
                Err(error) => warn!(%error, "rehydrate failed; applying batch stepwise"),
            }
        }
        let mut actions = Vec::new();

        for event in events.iter().filter(|e| e.is_bound()) {
            if let SyncEvent::BoundChanged { edge, field, value, .. } = *event {
                self.apply_bound(edge, field, value, root, &mut actions);
            }
        }

        let mut polluted = Vec::new();
        for event in events.into_iter().filter(|e| !e.is_bound()) {
            match event {
                SyncEvent::CellColorChanged { cell, color, origin } => {
                    if self.apply_color(cell, color, origin, &mut actions) && origin == Origin::Remote {
                        polluted.push(cell);
                    }
                }
                SyncEvent::CellNameChanged { cell, name, origin } => self.apply_name(cell, name, origin, &mut actions),
                SyncEvent::BoundChanged { .. } => {}
            }
        }
        if !polluted.is_empty() {
            actions.push(Action::HistoryPolluted { cells: polluted });
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Write a cell's color and group name, keeping the group index in step.
    ///
    /// An empty `name` leaves the cell ungrouped. Returns `false` and changes
    /// nothing when `cell` is outside the mirror.
    pub fn set_cell(&mut self, cell: CellId, color: Option<String>, name: Option<String>) -> bool {
        let Some(grid) = self.grid.as_mut() else {
            return false;
        };
        let name = name.filter(|name| !name.is_empty());
        if grid.set_cell(cell, color.clone(), name.clone()).is_none() {
            trace!(%cell, "cell write outside mirror dropped");
            return false;
        }
        self.groups.remove_from_group(GroupCriteria::Cell(cell));
        if let Some(name) = name {
            self.groups.append_to_group(&name, [GroupMember::new(cell, color.clone())]);
            self.groups.change_group_color(&name, color.as_deref());
        }
        true
    }

    // --- Internals ---

    /// Whether some edge jumps by more than one lane and the batch also
    /// acknowledges that same value.
    fn is_settled_rewrite(&self, events: &[SyncEvent]) -> bool {
        let acknowledged = |edge: Edge, value: i32| {
            events.iter().any(|event| {
                matches!(*event, SyncEvent::BoundChanged { edge: e, field: BoundField::Previous, value: v, .. }
                    if e == edge && v == value)
            })
        };
        events.iter().any(|event| match *event {
            SyncEvent::BoundChanged { edge, field: BoundField::Current, value, .. } => {
                let previous = self.bounds.get(edge).previous;
                (i64::from(value) - i64::from(previous)).abs() > 1 && acknowledged(edge, value)
            }
            _ => false,
        })
    }

    fn apply_bound(
        &mut self,
        edge: Edge,
        field: BoundField,
        value: i32,
        root: Option<&GridRoot>,
        actions: &mut Vec<Action>,
    ) {
        if field == BoundField::Previous {
            trace!(%edge, value, "acknowledged bound ignored");
            return;
        }
        match self.bounds.observe(edge, value) {
            Ok(None) => {}
            Ok(Some(step)) => self.apply_step(step, root, actions),
            Err(violation) => warn!(
                edge = %violation.edge,
                current = violation.current,
                previous = violation.previous,
                "bound moved by more than one step; edit dropped"
            ),
        }
    }

    fn apply_step(&mut self, step: BoundStep, root: Option<&GridRoot>, actions: &mut Vec<Action>) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        let seed = |id: CellId| root.map(|root| seed_from(root, id)).unwrap_or_default();
        let outcome = match step.edit {
            LaneEdit::InsertRow { index, edge } => {
                let seeds: Vec<CellSeed> =
                    (grid.column_start()..=grid.column_last()).map(|column| seed(CellId::new(index, column))).collect();
                grid.insert_row(index, edge, &seeds).map(|row| {
                    let cells: Vec<Cell> = row.cells().cloned().collect();
                    join_groups(&mut self.groups, &cells);
                    Action::RowInserted { index, edge, cells }
                })
            }
            LaneEdit::DeleteRow { index, edge } => grid.delete_row(index, edge).map(|_| {
                self.groups.remove_from_group(GroupCriteria::Row(index));
                Action::RowDeleted { index, edge }
            }),
            LaneEdit::InsertColumn { index, edge } => {
                let seeds: Vec<CellSeed> =
                    (grid.row_start()..=grid.row_last()).map(|row| seed(CellId::new(row, index))).collect();
                grid.insert_column(index, edge, &seeds).map(|cells| {
                    join_groups(&mut self.groups, &cells);
                    Action::ColumnInserted { index, edge, cells }
                })
            }
            LaneEdit::DeleteColumn { index, edge } => grid.delete_column(index, edge).map(|_| {
                self.groups.remove_from_group(GroupCriteria::Column(index));
                Action::ColumnDeleted { index, edge }
            }),
        };
        match outcome {
            Ok(action) => {
                let pair = self.bounds.get_mut(step.edge);
                pair.advance(step.step);
                self.acks.push((step.edge, pair.previous));
                debug!(edge = %step.edge, previous = pair.previous, edit = ?step.edit, "lane edit applied");
                actions.push(action);
                actions.push(Action::GroupsChanged);
            }
            Err(error) => warn!(edge = %step.edge, %error, "lane edit rejected; bound left unsynced"),
        }
    }

    /// Returns whether the cell exists in the mirror.
    fn apply_color(&mut self, cell: CellId, color: Option<String>, origin: Origin, actions: &mut Vec<Action>) -> bool {
        let Some(group) = self.grid.as_ref().and_then(|grid| grid.cell(cell)).map(|c| c.group.clone()) else {
            trace!(%cell, "color change outside mirror dropped");
            return false;
        };
        let Some(grid) = self.grid.as_mut() else {
            return false;
        };
        grid.set_cell(cell, color.clone(), group.clone());
        actions.push(Action::CellUpdated { cell, origin });
        if let Some(name) = group {
            if self.groups.change_group_color(&name, color.as_deref()) {
                actions.push(Action::GroupsChanged);
            }
        }
        true
    }

    fn apply_name(&mut self, cell: CellId, name: Option<String>, origin: Origin, actions: &mut Vec<Action>) {
        let Some(color) = self.grid.as_ref().and_then(|grid| grid.cell(cell)).map(|c| c.color.clone()) else {
            trace!(%cell, "name change outside mirror dropped");
            return;
        };
        if self.set_cell(cell, color, name) {
            actions.push(Action::CellUpdated { cell, origin });
            actions.push(Action::GroupsChanged);
        }
    }
}

/// Cell contents for `id` as stored in `root`.
fn seed_from(root: &GridRoot, id: CellId) -> CellSeed {
    root.cell(id).map_or_else(CellSeed::default, |data| CellSeed {
        color: data.color.clone(),
        group: data.name.clone().filter(|name| !name.is_empty()),
    })
}

/// Add the grouped cells of a new lane to their groups.
fn join_groups(groups: &mut ColorGroups, cells: &[Cell]) {
    for cell in cells {
        if let Some(name) = &cell.group {
            groups.append_to_group(name, [GroupMember::new(cell.id(), cell.color.clone())]);
        }
    }
}
