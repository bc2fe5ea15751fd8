// Host-side tests for gesture classification.

use gallery_core::{CameraController, InputRouter};
use glam::Vec2;

#[test]
fn small_movement_is_a_click() {
    let mut router = InputRouter::new();
    let mut camera = CameraController::new();
    router.pointer_down(Vec2::new(100.0, 100.0));
    router.pointer_move(Vec2::new(102.0, 101.0), &mut camera);
    let tap = router.pointer_up(Vec2::new(102.0, 101.0));
    assert_eq!(tap, Some(Vec2::new(102.0, 101.0)));
}

#[test]
fn movement_past_threshold_suppresses_selection() {
    let mut router = InputRouter::new();
    let mut camera = CameraController::new();
    let start_angle = camera.orbit_angle;
    router.pointer_down(Vec2::new(100.0, 100.0));
    router.pointer_move(Vec2::new(104.0, 100.0), &mut camera);
    router.pointer_move(Vec2::new(108.0, 100.0), &mut camera);
    assert!(router.pointer_up(Vec2::new(108.0, 100.0)).is_none());
    assert!(camera.orbit_angle > start_angle, "drag should orbit");
}

#[test]
fn cumulative_movement_counts_even_when_returning_to_start() {
    let mut router = InputRouter::new();
    let mut camera = CameraController::new();
    router.pointer_down(Vec2::new(100.0, 100.0));
    router.pointer_move(Vec2::new(110.0, 100.0), &mut camera);
    router.pointer_move(Vec2::new(100.0, 100.0), &mut camera);
    // Net zero displacement, but 20px travelled: a drag, not a click.
    assert!(router.pointer_up(Vec2::new(100.0, 100.0)).is_none());
}

#[test]
fn release_without_press_is_ignored() {
    let mut router = InputRouter::new();
    assert!(router.pointer_up(Vec2::new(10.0, 10.0)).is_none());
}

#[test]
fn single_finger_tap_selects() {
    let mut router = InputRouter::new();
    let tap_pos = Vec2::new(50.0, 60.0);
    router.touch_start(7, tap_pos);
    let tap = router.touch_end(7, tap_pos);
    assert_eq!(tap, Some(tap_pos));
}

#[test]
fn second_finger_cancels_tap_and_pinch_zooms() {
    let mut router = InputRouter::new();
    let mut camera = CameraController::new();
    let start_radius = camera.target_zoom_radius;
    router.touch_start(1, Vec2::new(100.0, 100.0));
    router.touch_start(2, Vec2::new(200.0, 100.0));
    // Fingers spread apart: zoom in (radius shrinks).
    router.touch_move(2, Vec2::new(260.0, 100.0), &mut camera);
    assert!(camera.target_zoom_radius < start_radius);
    // Fingers pinch together: zoom back out.
    let mid_radius = camera.target_zoom_radius;
    router.touch_move(2, Vec2::new(180.0, 100.0), &mut camera);
    assert!(camera.target_zoom_radius > mid_radius);
    assert!(router.touch_end(2, Vec2::new(180.0, 100.0)).is_none());
    assert!(router.touch_end(1, Vec2::new(100.0, 100.0)).is_none());
}

#[test]
fn one_finger_drag_orbits_like_the_pointer() {
    let mut router = InputRouter::new();
    let mut camera = CameraController::new();
    let start_pitch = camera.orbit_pitch;
    router.touch_start(3, Vec2::new(100.0, 100.0));
    router.touch_move(3, Vec2::new(100.0, 140.0), &mut camera);
    assert!(camera.orbit_pitch > start_pitch);
    assert!(router.touch_end(3, Vec2::new(100.0, 140.0)).is_none());
}

#[test]
fn cancel_clears_all_gesture_state() {
    let mut router = InputRouter::new();
    router.pointer_down(Vec2::new(10.0, 10.0));
    router.touch_start(1, Vec2::new(20.0, 20.0));
    router.cancel();
    assert!(router.pointer_up(Vec2::new(10.0, 10.0)).is_none());
    assert!(router.touch_end(1, Vec2::new(20.0, 20.0)).is_none());
}
