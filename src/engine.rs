//! Engine: the host-facing entry point.
//!
//! [`EngineCore`] ties the shared document, the view engine and the
//! reconciler together and is fully testable natively. [`Engine`] adds the
//! canvas element and rendering.

use std::sync::mpsc::Receiver;

use tracing::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::bounds::Edge;
use crate::camera::{Camera, ScreenPoint, WorldPoint};
use crate::config::EngineConfig;
use crate::doc::{ChangeBatch, DocError, GridRoot, Origin, SharedDocument};
use crate::geometry::GridLayout;
use crate::grid::{Cell, CellId, ColumnEdge, GridError, GridMirror, RowEdge};
use crate::groups::ColorGroups;
use crate::input::{GestureMode, Modifiers, PointerId, WheelDelta};
use crate::render;
use crate::sync::Reconciler;
use crate::view::ViewEngine;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A row was added to the mirror; `cells` are its contents in column order.
    RowInserted { index: i32, edge: RowEdge, cells: Vec<Cell> },
    RowDeleted { index: i32, edge: RowEdge },
    /// A column was added to the mirror; `cells` are its contents in row order.
    ColumnInserted { index: i32, edge: ColumnEdge, cells: Vec<Cell> },
    ColumnDeleted { index: i32, edge: ColumnEdge },
    CellUpdated { cell: CellId, origin: Origin },
    GroupsChanged,
    /// Cells changed by another peer; local undo entries touching them are stale.
    HistoryPolluted { cells: Vec<CellId> },
    /// The mirror was rebuilt from the document.
    GridReset,
    SetCursor(String),
    RenderNeeded,
}

/// Direction of a local lane resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneChange {
    Grow,
    Shrink,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("document is not attached")]
    NotAttached,
    #[error("cell {0} is outside the grid")]
    OutOfBounds(CellId),
    #[error(transparent)]
    Doc(#[from] DocError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Engine state that does not depend on the canvas element.
pub struct EngineCore<D: SharedDocument> {
    pub doc: D,
    pub view: ViewEngine,
    pub sync: Reconciler,
    pub config: EngineConfig,
    changes: Option<Receiver<ChangeBatch>>,
}

impl<D: SharedDocument> EngineCore<D> {
    #[must_use]
    pub fn new(doc: D, config: EngineConfig) -> Self {
        Self { doc, view: ViewEngine::new(config.view), sync: Reconciler::new(), config, changes: None }
    }

    // --- Document lifecycle ---

    /// Subscribe to the document, seed it if it holds no cells, and build
    /// the mirror.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotAttached`] while the document is not ready;
    /// the host retries once it signals readiness.
    pub fn attach(&mut self) -> Result<Vec<Action>, EngineError> {
        let empty = self.doc.root().ok_or(EngineError::NotAttached)?.is_empty();
        if self.changes.is_none() {
            self.changes = Some(self.doc.subscribe());
        }
        if empty {
            let seeded = GridRoot::seeded(&self.config.grid);
            self.doc.update(&mut |root| *root = seeded.clone())?;
            info!(
                rows = self.config.grid.initial_rows,
                columns = self.config.grid.initial_columns,
                "seeded empty document"
            );
        }
        self.rebuild()
    }

    /// Rebuild the mirror and groups from the document as it is now.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotAttached`] before [`Self::attach`].
    pub fn resync(&mut self) -> Result<Vec<Action>, EngineError> {
        if self.changes.is_none() {
            return Err(EngineError::NotAttached);
        }
        self.rebuild()
    }

    /// Apply every pending change batch and write back acknowledged bounds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotAttached`] before [`Self::attach`].
    pub fn sync(&mut self) -> Result<Vec<Action>, EngineError> {
        let Some(changes) = &self.changes else {
            return Err(EngineError::NotAttached);
        };
        let mut actions = Vec::new();
        while let Ok(batch) = changes.try_recv() {
            let applied = self.sync.apply_batch(&batch, self.doc.root());
            actions.extend(applied);
            publish_acks(&mut self.doc, self.sync.take_acks());
        }
        Ok(actions)
    }

    /// Rewrite the document to a freshly seeded grid and restore pan/zoom.
    ///
    /// The seeded bounds are written settled, so peers see the rewrite
    /// acknowledged in the same batch and rehydrate instead of stepping.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotAttached`] before [`Self::attach`].
    pub fn reset(&mut self) -> Result<Vec<Action>, EngineError> {
        if self.changes.is_none() {
            return Err(EngineError::NotAttached);
        }
        let seeded = GridRoot::seeded(&self.config.grid);
        self.doc.update(&mut |root| *root = seeded.clone())?;
        info!("grid reset");
        let mut actions = self.view.reset_camera();
        actions.extend(self.rebuild()?);
        Ok(actions)
    }

    // --- Local edits ---

    /// Paint one cell. `None` clears it.
    ///
    /// Painting a grouped cell paints every member of its group, in the
    /// document, so the rendered cells and the group color stay equal on
    /// every peer.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutOfBounds`] for a cell outside the mirror.
    pub fn paint_cell(&mut self, cell: CellId, color: Option<&str>) -> Result<Vec<Action>, EngineError> {
        self.check_cell(cell)?;
        let color = color.map(str::to_owned);
        let targets = self.paint_targets(cell);
        self.doc.update(&mut |root| {
            for target in &targets {
                root.cell_mut(*target).color.clone_from(&color);
            }
        })?;
        self.sync()
    }

    /// Put one cell in the color group `name`. `None` or an empty name
    /// removes it from its group.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutOfBounds`] for a cell outside the mirror.
    pub fn name_cell(&mut self, cell: CellId, name: Option<&str>) -> Result<Vec<Action>, EngineError> {
        self.check_cell(cell)?;
        let name = name.filter(|name| !name.is_empty()).map(str::to_owned);
        self.doc.update(&mut |root| root.cell_mut(cell).name.clone_from(&name))?;
        self.sync()
    }

    /// Grow or shrink the grid by one lane at `edge`.
    ///
    /// Only the document is written here; the mirror follows through the
    /// normal notification path.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LastRow`] / [`GridError::LastColumn`] when
    /// shrinking would leave the grid empty.
    pub fn resize(&mut self, edge: Edge, change: LaneChange) -> Result<Vec<Action>, EngineError> {
        let grid = self.sync.grid().ok_or(EngineError::NotAttached)?;
        let root = self.doc.root().ok_or(EngineError::NotAttached)?;
        let bounds = root.bounds;
        let current = bounds.current(edge);
        let is_row = matches!(edge, Edge::RowStart | Edge::RowLast);
        if change == LaneChange::Shrink {
            if is_row && grid.row_count() <= 1 {
                return Err(GridError::LastRow { index: current }.into());
            }
            if !is_row && grid.column_count() <= 1 {
                return Err(GridError::LastColumn { index: current }.into());
            }
        }
        let next = match change {
            LaneChange::Grow => current + edge.outward(),
            LaneChange::Shrink => current - edge.outward(),
        };
        self.doc.update(&mut |root| {
            root.bounds.set_current(edge, next);
            match (change, is_row) {
                (LaneChange::Grow, true) => {
                    for column in bounds.column_start..=bounds.column_last {
                        root.cell_mut(CellId::new(next, column));
                    }
                }
                (LaneChange::Grow, false) => {
                    for row in bounds.row_start..=bounds.row_last {
                        root.cell_mut(CellId::new(row, next));
                    }
                }
                (LaneChange::Shrink, true) => root.remove_row(current),
                (LaneChange::Shrink, false) => root.remove_column(current),
            }
        })?;
        self.sync()
    }

    // --- Viewport ---

    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.view.set_viewport(width_css, height_css, dpr)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, id: PointerId, screen: ScreenPoint) -> Vec<Action> {
        self.view.on_pointer_down(id, screen)
    }

    pub fn on_pointer_move(&mut self, id: PointerId, screen: ScreenPoint) -> Vec<Action> {
        self.view.on_pointer_move(id, screen)
    }

    pub fn on_pointer_up(&mut self, id: PointerId) -> Vec<Action> {
        self.view.on_pointer_up(id)
    }

    pub fn on_pointer_out(&mut self) -> Vec<Action> {
        self.view.on_pointer_out()
    }

    pub fn on_wheel(&mut self, screen: ScreenPoint, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.view.on_wheel(screen, delta, modifiers)
    }

    // --- Queries ---

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sync.is_attached()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.view.camera()
    }

    #[must_use]
    pub fn mode(&self) -> GestureMode {
        self.view.mode()
    }

    #[must_use]
    pub fn grid(&self) -> Option<&GridMirror> {
        self.sync.grid()
    }

    #[must_use]
    pub fn groups(&self) -> &ColorGroups {
        self.sync.groups()
    }

    #[must_use]
    pub fn layout(&self) -> Option<GridLayout> {
        self.grid().map(|grid| GridLayout::of(grid, self.config.view.cell_size))
    }

    /// The cell under a screen point, if any.
    #[must_use]
    pub fn cell_at(&self, screen: ScreenPoint) -> Option<CellId> {
        let world: WorldPoint = self.view.screen_to_world(screen);
        self.layout()?.cell_at(world)
    }

    // --- Internals ---

    fn rebuild(&mut self) -> Result<Vec<Action>, EngineError> {
        // The root is read whole below; queued batches describe changes it
        // already contains.
        if let Some(changes) = &self.changes {
            while changes.try_recv().is_ok() {}
        }
        let root = self.doc.root().ok_or(EngineError::NotAttached)?;
        Ok(self.sync.hydrate(root)?)
    }

    /// `cell` plus the other members of its group.
    fn paint_targets(&self, cell: CellId) -> Vec<CellId> {
        self.grid()
            .and_then(|grid| grid.cell(cell))
            .and_then(|c| c.group.as_deref())
            .and_then(|name| self.groups().group(name))
            .map_or_else(|| vec![cell], |group| group.cells().collect())
    }

    fn check_cell(&self, cell: CellId) -> Result<(), EngineError> {
        let grid = self.grid().ok_or(EngineError::NotAttached)?;
        if grid.contains(cell) {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds(cell))
        }
    }
}

/// Write each acknowledged `previous` back to `<edge>_prev`.
fn publish_acks<D: SharedDocument>(doc: &mut D, acks: Vec<(Edge, i32)>) {
    if acks.is_empty() {
        return;
    }
    let result = doc.update(&mut |root| {
        for (edge, previous) in &acks {
            root.bounds.set_previous(*edge, *previous);
        }
    });
    if let Err(error) = result {
        warn!(%error, "failed to publish acknowledged bounds");
    }
}

/// The full engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine<D: SharedDocument> {
    canvas: HtmlCanvasElement,
    pub core: EngineCore<D>,
}

impl<D: SharedDocument> Engine<D> {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, doc: D, config: EngineConfig) -> Self {
        Self { canvas, core: EngineCore::new(doc, config) }
    }

    // --- Delegated document lifecycle ---

    /// # Errors
    ///
    /// See [`EngineCore::attach`].
    pub fn attach(&mut self) -> Result<Vec<Action>, EngineError> {
        self.core.attach()
    }

    /// # Errors
    ///
    /// See [`EngineCore::sync`].
    pub fn sync(&mut self) -> Result<Vec<Action>, EngineError> {
        self.core.sync()
    }

    // --- Viewport ---

    /// Update viewport dimensions and resize the canvas backing store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        let viewport = self.core.view.viewport;
        self.canvas.set_width(viewport.width.round().max(0.0) as u32);
        self.canvas.set_height(viewport.height.round().max(0.0) as u32);
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, id: PointerId, screen: ScreenPoint) -> Vec<Action> {
        self.core.on_pointer_down(id, screen)
    }

    pub fn on_pointer_move(&mut self, id: PointerId, screen: ScreenPoint) -> Vec<Action> {
        self.core.on_pointer_move(id, screen)
    }

    pub fn on_pointer_up(&mut self, id: PointerId) -> Vec<Action> {
        self.core.on_pointer_up(id)
    }

    pub fn on_pointer_out(&mut self) -> Vec<Action> {
        self.core.on_pointer_out()
    }

    pub fn on_wheel(&mut self, screen: ScreenPoint, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen, delta, modifiers)
    }

    // --- Render ---

    /// Draw the current state to the canvas. Draws nothing until attached.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let Some(grid) = self.core.grid() else {
            return Ok(());
        };
        let Some(ctx) = self.canvas.get_context("2d")? else {
            return Err(JsValue::from_str("canvas has no 2d context"));
        };
        let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;
        render::draw(&ctx, grid, &self.core.view.camera, &self.core.view.viewport, self.core.config.view.cell_size)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn grid(&self) -> Option<&GridMirror> {
        self.core.grid()
    }
}
