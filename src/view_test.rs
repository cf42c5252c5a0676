#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn pt(x: f64, y: f64) -> ScreenPoint {
    ScreenPoint::new(x, y)
}

fn view() -> ViewEngine {
    let mut v = ViewEngine::new(ViewConfig::default());
    v.set_viewport(800.0, 600.0, 1.0);
    v
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Default::default() }
}

fn has_render_needed(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::RenderNeeded))
}

fn cursor(actions: &[Action]) -> Option<&str> {
    actions.iter().find_map(|a| match a {
        Action::SetCursor(c) => Some(c.as_str()),
        _ => None,
    })
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_view_is_idle_with_identity_camera() {
    let v = view();
    assert_eq!(v.mode(), GestureMode::Idle);
    assert_eq!(v.camera(), Camera::default());
}

#[test]
fn set_viewport_requests_render() {
    let mut v = ViewEngine::default();
    let actions = v.set_viewport(400.0, 300.0, 2.0);
    assert!(has_render_needed(&actions));
    assert_eq!(v.viewport.center(), pt(200.0, 150.0));
}

// =============================================================
// pan
// =============================================================

#[test]
fn pan_subtracts_delta_from_offset() {
    let mut v = view();
    let actions = v.pan(pt(5.0, -3.0));
    assert!(has_render_needed(&actions));
    assert_eq!(v.camera.offset, pt(-5.0, 3.0));
}

#[test]
fn pan_accumulates() {
    let mut v = view();
    v.pan(pt(1.0, 1.0));
    v.pan(pt(2.0, 3.0));
    assert_eq!(v.camera.offset, pt(-3.0, -4.0));
}

// =============================================================
// zoom
// =============================================================

#[test]
fn zoom_within_limits_commits() {
    let mut v = view();
    let actions = v.zoom(pt(400.0, 300.0), 1.1);
    assert!(has_render_needed(&actions));
    assert_eq!(v.camera.scale, 1.1);
}

#[test]
fn zoom_preserves_world_point_under_pivot() {
    let mut v = view();
    v.camera.offset = pt(25.0, -60.0);
    let pivot = pt(620.0, 95.0);
    let before = v.screen_to_world(pivot);
    v.zoom(pivot, 1.2);
    let after = v.screen_to_world(pivot);
    assert!(approx_eq(before.x, after.x));
    assert!(approx_eq(before.y, after.y));
}

#[test]
fn zoom_above_max_is_rejected() {
    let mut v = view();
    let actions = v.zoom(pt(10.0, 10.0), 1.25);
    assert!(actions.is_empty());
    assert_eq!(v.camera, Camera::default());
}

#[test]
fn zoom_below_min_is_rejected() {
    let mut v = view();
    assert!(v.zoom(pt(10.0, 10.0), 0.5).is_empty());
    assert_eq!(v.camera.scale, 1.0);
}

#[test]
fn zoom_at_limits_is_accepted() {
    let mut v = view();
    assert!(!v.zoom(pt(0.0, 0.0), 1.2).is_empty());
    assert!(!v.zoom(pt(0.0, 0.0), 0.9).is_empty());
    assert_eq!(v.camera.scale, 0.9);
}

#[test]
fn reset_camera_restores_default() {
    let mut v = view();
    v.pan(pt(10.0, 10.0));
    v.zoom(pt(0.0, 0.0), 1.1);
    v.reset_camera();
    assert_eq!(v.camera, Camera::default());
}

// =============================================================
// Wheel
// =============================================================

#[test]
fn wheel_without_modifier_pans_by_deltas() {
    let mut v = view();
    let actions = v.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 10.0, dy: 20.0 }, Modifiers::default());
    assert!(has_render_needed(&actions));
    assert_eq!(v.camera.offset, pt(-10.0, -20.0));
    assert_eq!(v.camera.scale, 1.0);
}

#[test]
fn wheel_ctrl_zooms_in_with_factor() {
    let mut v = view();
    // factor = 1 - (-30 / 300) = 1.1
    v.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 0.0, dy: -30.0 }, ctrl());
    assert!(approx_eq(v.camera.scale, 1.1));
}

#[test]
fn wheel_ctrl_zooms_out_with_factor() {
    let mut v = view();
    // factor = 1 - (15 / 300) = 0.95
    v.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 0.0, dy: 15.0 }, ctrl());
    assert!(approx_eq(v.camera.scale, 0.95));
}

#[test]
fn wheel_ctrl_large_delta_rejected_at_max() {
    // factor = 1 - (-300 / 300) = 2 → 2.0 > 1.2
    let mut v = view();
    let actions = v.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 0.0, dy: -300.0 }, ctrl());
    assert!(actions.is_empty());
    assert_eq!(v.camera.scale, 1.0);
}

#[test]
fn wheel_ctrl_zoom_keeps_world_point_under_pointer() {
    let mut v = view();
    let screen = pt(700.0, 120.0);
    let before = v.screen_to_world(screen);
    v.on_wheel(screen, WheelDelta { dx: 0.0, dy: -30.0 }, ctrl());
    let after = v.screen_to_world(screen);
    assert!(approx_eq(before.x, after.x));
    assert!(approx_eq(before.y, after.y));
}

#[test]
fn wheel_ctrl_ignores_dx() {
    let mut v = view();
    v.on_wheel(pt(400.0, 300.0), WheelDelta { dx: 50.0, dy: 0.0 }, ctrl());
    assert_eq!(v.camera, Camera::default());
}

// =============================================================
// Pointer pan
// =============================================================

#[test]
fn single_pointer_down_enters_pan() {
    let mut v = view();
    let actions = v.on_pointer_down(1, pt(100.0, 100.0));
    assert_eq!(v.mode(), GestureMode::Pan);
    assert_eq!(cursor(&actions), Some("grabbing"));
}

#[test]
fn drag_moves_content_with_pointer() {
    let mut v = view();
    v.on_pointer_down(1, pt(100.0, 100.0));
    let actions = v.on_pointer_move(1, pt(130.0, 90.0));
    assert!(has_render_needed(&actions));
    assert_eq!(v.camera.offset, pt(30.0, -10.0));
}

#[test]
fn drag_keeps_grabbed_world_point_under_pointer() {
    let mut v = view();
    v.camera.scale = 1.2;
    let start = pt(300.0, 250.0);
    let grabbed = v.screen_to_world(start);
    v.on_pointer_down(1, start);
    v.on_pointer_move(1, pt(320.0, 240.0));
    v.on_pointer_move(1, pt(410.0, 300.0));
    let under = v.screen_to_world(pt(410.0, 300.0));
    assert!(approx_eq(grabbed.x, under.x));
    assert!(approx_eq(grabbed.y, under.y));
}

#[test]
fn hover_move_without_down_does_nothing() {
    let mut v = view();
    assert!(v.on_pointer_move(1, pt(50.0, 50.0)).is_empty());
    assert_eq!(v.camera, Camera::default());
}

#[test]
fn pointer_up_returns_to_idle() {
    let mut v = view();
    v.on_pointer_down(1, pt(0.0, 0.0));
    let actions = v.on_pointer_up(1);
    assert_eq!(v.mode(), GestureMode::Idle);
    assert_eq!(cursor(&actions), Some("default"));
}

#[test]
fn pointer_up_for_unknown_pointer_is_ignored() {
    let mut v = view();
    v.on_pointer_down(1, pt(0.0, 0.0));
    assert!(v.on_pointer_up(42).is_empty());
    assert_eq!(v.mode(), GestureMode::Pan);
}

#[test]
fn pointer_out_ends_every_gesture() {
    let mut v = view();
    v.on_pointer_down(1, pt(0.0, 0.0));
    v.on_pointer_down(2, pt(50.0, 0.0));
    v.on_pointer_out();
    assert_eq!(v.mode(), GestureMode::Idle);
    assert!(v.on_pointer_move(1, pt(10.0, 10.0)).is_empty());
}

// =============================================================
// Pinch
// =============================================================

fn pinching_view(a: ScreenPoint, b: ScreenPoint) -> ViewEngine {
    let mut v = view();
    v.on_pointer_down(1, a);
    v.on_pointer_down(2, b);
    v
}

#[test]
fn second_pointer_switches_to_pinch() {
    let v = pinching_view(pt(0.0, 0.0), pt(100.0, 0.0));
    assert_eq!(v.mode(), GestureMode::Pinch);
    assert_eq!(v.input, InputState::Pinching { prev_diff: 100.0 });
}

#[test]
fn pinch_spread_zooms_in() {
    let mut v = pinching_view(pt(0.0, 0.0), pt(100.0, 0.0));
    // delta = 100 - 110 = -10, factor = 1 + 20/300
    let actions = v.on_pointer_move(2, pt(110.0, 0.0));
    assert!(has_render_needed(&actions));
    assert!(approx_eq(v.camera.scale, 1.0 + 20.0 / 300.0));
    assert_eq!(v.input, InputState::Pinching { prev_diff: 110.0 });
}

#[test]
fn pinch_squeeze_below_min_is_rejected() {
    // prev 100, current 80: factor = 1 - 40/300 ≈ 0.867 < 0.9
    let mut v = pinching_view(pt(0.0, 0.0), pt(100.0, 0.0));
    let actions = v.on_pointer_move(2, pt(80.0, 0.0));
    assert!(actions.is_empty());
    assert_eq!(v.camera.scale, 1.0);
    assert_eq!(v.input, InputState::Pinching { prev_diff: 100.0 });
}

#[test]
fn pinch_small_squeeze_zooms_out() {
    let mut v = pinching_view(pt(0.0, 0.0), pt(100.0, 0.0));
    // delta = 6, factor = 1 - 12/300 = 0.96
    v.on_pointer_move(2, pt(94.0, 0.0));
    assert!(approx_eq(v.camera.scale, 0.96));
}

#[test]
fn pinch_pivots_on_midpoint() {
    let mut v = pinching_view(pt(200.0, 200.0), pt(300.0, 200.0));
    let mid_before = v.screen_to_world(pt(255.0, 200.0));
    // Pointer 2 moves to 310: new midpoint is (255, 200).
    v.on_pointer_move(2, pt(310.0, 200.0));
    let mid_after = v.screen_to_world(pt(255.0, 200.0));
    assert!(approx_eq(mid_before.x, mid_after.x));
    assert!(approx_eq(mid_before.y, mid_after.y));
}

#[test]
fn pinch_does_not_pan() {
    let mut v = pinching_view(pt(0.0, 0.0), pt(100.0, 0.0));
    v.on_pointer_move(1, pt(0.0, 0.0));
    assert_eq!(v.camera.offset, pt(0.0, 0.0));
}

#[test]
fn lifting_one_pinch_finger_resumes_pan_without_jump() {
    let mut v = pinching_view(pt(0.0, 0.0), pt(100.0, 0.0));
    v.on_pointer_up(1);
    assert_eq!(v.input, InputState::Panning { last_screen: pt(100.0, 0.0) });
    v.on_pointer_move(2, pt(105.0, 0.0));
    assert_eq!(v.camera.offset, pt(5.0, 0.0));
}

#[test]
fn pan_to_pinch_transition_does_not_reset_cursor() {
    let mut v = view();
    v.on_pointer_down(1, pt(0.0, 0.0));
    let actions = v.on_pointer_down(2, pt(10.0, 0.0));
    assert!(cursor(&actions).is_none());
    assert_eq!(v.mode(), GestureMode::Pinch);
}
