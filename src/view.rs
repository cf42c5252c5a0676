//! View engine: turns pointer, wheel and pinch gestures into camera changes.
//!
//! The view engine is independent of the grid. It owns the camera, the
//! viewport and the set of pointers currently held down. Every handler runs
//! to completion and returns the [`Action`]s the host should perform; any
//! committed camera change ends with [`Action::RenderNeeded`].
//!
//! Zoom is pivot-preserving: the world point under the pivot stays under it.
//! A zoom whose target scale falls outside the configured limits is dropped
//! without touching the camera.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use tracing::debug;

use crate::camera::{Camera, ScreenPoint, Viewport, WorldPoint};
use crate::config::ViewConfig;
use crate::consts::PINCH_ZOOM_MULTIPLIER;
use crate::engine::Action;
use crate::input::{GestureMode, InputState, Modifiers, PointerId, Pointers, WheelDelta, pinch_distance};

const CURSOR_GRABBING: &str = "grabbing";
const CURSOR_DEFAULT: &str = "default";

#[derive(Debug, Clone, Default)]
pub struct ViewEngine {
    pub camera: Camera,
    pub viewport: Viewport,
    pub config: ViewConfig,
    pub input: InputState,
    pointers: Pointers,
}

impl ViewEngine {
    #[must_use]
    pub fn new(config: ViewConfig) -> Self {
        Self { config, ..Self::default() }
    }

    // --- Queries ---

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn mode(&self) -> GestureMode {
        self.input.mode()
    }

    #[must_use]
    pub fn world_to_screen(&self, world: WorldPoint) -> ScreenPoint {
        self.camera.world_to_screen(world, &self.viewport)
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint) -> WorldPoint {
        self.camera.screen_to_world(screen, &self.viewport)
    }

    // --- Viewport ---

    /// Update viewport dimensions and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.viewport = Viewport::from_css(width_css, height_css, dpr);
        vec![Action::RenderNeeded]
    }

    // --- Camera primitives ---

    /// Pan by `delta`, the previous-minus-current pointer displacement in
    /// screen pixels: `offset ← offset − delta`.
    pub fn pan(&mut self, delta: ScreenPoint) -> Vec<Action> {
        self.camera.offset = self.camera.offset - delta;
        vec![Action::RenderNeeded]
    }

    /// Zoom to `new_scale`, keeping the world point under `pivot` fixed.
    ///
    /// Returns no actions and leaves the camera untouched when `new_scale`
    /// is outside the configured limits.
    pub fn zoom(&mut self, pivot: ScreenPoint, new_scale: f64) -> Vec<Action> {
        if !self.config.limits.contains(new_scale) {
            debug!(new_scale, scale = self.camera.scale, "zoom rejected: outside scale limits");
            return Vec::new();
        }
        let offset = self.camera.pivot_offset(pivot, new_scale, &self.viewport);
        self.camera = Camera { scale: new_scale, offset };
        vec![Action::RenderNeeded]
    }

    /// Restore the default camera.
    pub fn reset_camera(&mut self) -> Vec<Action> {
        self.camera = Camera::default();
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, id: PointerId, screen: ScreenPoint) -> Vec<Action> {
        self.pointers.press(id, screen);
        self.reevaluate()
    }

    pub fn on_pointer_move(&mut self, id: PointerId, screen: ScreenPoint) -> Vec<Action> {
        if !self.pointers.moved(id, screen) {
            return Vec::new();
        }
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Panning { last_screen } => {
                self.input = InputState::Panning { last_screen: screen };
                self.pan(last_screen - screen)
            }
            InputState::Pinching { prev_diff } => self.pinch_step(prev_diff),
        }
    }

    pub fn on_pointer_up(&mut self, id: PointerId) -> Vec<Action> {
        if self.pointers.release(id).is_none() {
            return Vec::new();
        }
        self.reevaluate()
    }

    /// The pointer left the canvas: every gesture ends.
    pub fn on_pointer_out(&mut self) -> Vec<Action> {
        self.pointers.clear();
        self.reevaluate()
    }

    /// Ctrl-modified wheel zooms around the pointer; a plain wheel pans by
    /// the wheel deltas.
    pub fn on_wheel(&mut self, screen: ScreenPoint, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.ctrl {
            let factor = 1.0 - delta.dy / self.config.zoom_sensitivity;
            let new_scale = self.camera.scale * factor;
            return self.zoom(screen, new_scale);
        }
        self.pan(ScreenPoint::new(delta.dx, delta.dy))
    }

    // --- Internals ---

    fn pinch_step(&mut self, prev_diff: f64) -> Vec<Action> {
        let Some((a, b)) = self.pointers.pinch_pair() else {
            return Vec::new();
        };
        let current_diff = pinch_distance(a, b);
        let delta = prev_diff - current_diff;
        let factor = 1.0 - (delta * PINCH_ZOOM_MULTIPLIER) / self.config.zoom_sensitivity;
        let new_scale = self.camera.scale * factor;
        let actions = self.zoom(a.midpoint(b), new_scale);
        // A rejected step keeps the old baseline so the next move measures
        // from the last committed distance.
        if !actions.is_empty() {
            self.input = InputState::Pinching { prev_diff: current_diff };
        }
        actions
    }

    /// Re-derive the gesture from the pointers held right now.
    fn reevaluate(&mut self) -> Vec<Action> {
        let before = self.input.mode();
        self.input = self.pointers.derive_state();
        let after = self.input.mode();
        if before == after {
            return Vec::new();
        }
        match after {
            GestureMode::Idle => vec![Action::SetCursor(CURSOR_DEFAULT.to_owned())],
            GestureMode::Pan | GestureMode::Pinch if before == GestureMode::Idle => {
                vec![Action::SetCursor(CURSOR_GRABBING.to_owned())]
            }
            GestureMode::Pan | GestureMode::Pinch => Vec::new(),
        }
    }
}
