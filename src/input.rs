//! Input model: modifier keys, wheel deltas, pointers and the gesture state machine.
//!
//! `InputState` is the gesture being tracked while pointers are down. It is
//! re-derived from the set of active pointers every time that set changes:
//! no pointers is `Idle`, one is `Panning`, two or more is `Pinching`.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeMap;

use crate::camera::ScreenPoint;

/// Identifier the host assigns to each active pointer (mouse, pen or touch).
pub type PointerId = i32;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held. Trackpad pinch arrives as a ctrl-modified wheel.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Coarse gesture mode, derived from [`InputState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    Pan,
    Pinch,
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No pointer is down.
    #[default]
    Idle,
    /// Exactly one pointer is down and drags the camera.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: ScreenPoint,
    },
    /// Two or more pointers are down; the first two drive a pinch zoom.
    Pinching {
        /// Distance proxy between the two pinch pointers at the last committed step.
        prev_diff: f64,
    },
}

impl InputState {
    #[must_use]
    pub fn mode(&self) -> GestureMode {
        match self {
            Self::Idle => GestureMode::Idle,
            Self::Panning { .. } => GestureMode::Pan,
            Self::Pinching { .. } => GestureMode::Pinch,
        }
    }
}

/// Pointers currently held down, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct Pointers {
    active: BTreeMap<PointerId, ScreenPoint>,
}

impl Pointers {
    pub fn press(&mut self, id: PointerId, at: ScreenPoint) {
        self.active.insert(id, at);
    }

    /// Update a held pointer's position. Returns `false` for pointers that
    /// are not down (hover moves).
    pub fn moved(&mut self, id: PointerId, at: ScreenPoint) -> bool {
        match self.active.get_mut(&id) {
            Some(pos) => {
                *pos = at;
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, id: PointerId) -> Option<ScreenPoint> {
        self.active.remove(&id)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// The lowest-id pointer.
    #[must_use]
    pub fn primary(&self) -> Option<ScreenPoint> {
        self.active.values().next().copied()
    }

    /// The two lowest-id pointers, if at least two are down.
    #[must_use]
    pub fn pinch_pair(&self) -> Option<(ScreenPoint, ScreenPoint)> {
        let mut it = self.active.values().copied();
        Some((it.next()?, it.next()?))
    }

    /// Gesture implied by the pointers held right now.
    #[must_use]
    pub fn derive_state(&self) -> InputState {
        if let Some((a, b)) = self.pinch_pair() {
            return InputState::Pinching { prev_diff: pinch_distance(a, b) };
        }
        match self.primary() {
            Some(last_screen) => InputState::Panning { last_screen },
            None => InputState::Idle,
        }
    }
}

/// Distance proxy for a pinch: the sum of absolute per-axis differences.
#[must_use]
pub fn pinch_distance(a: ScreenPoint, b: ScreenPoint) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
