// Host-side tests for the orbit camera controller.

use gallery_core::{CameraController, ZoomKind};

#[test]
fn wheel_zoom_stays_within_pointer_bounds() {
    let mut camera = CameraController::new();
    for _ in 0..500 {
        camera.zoom_step(500.0, ZoomKind::Pointer);
    }
    assert_eq!(camera.target_zoom_radius, 300.0);
    for _ in 0..500 {
        camera.zoom_step(-500.0, ZoomKind::Pointer);
    }
    assert_eq!(camera.target_zoom_radius, 10.0);
    // A further zoom-in tick at the floor must not push below it.
    camera.zoom_step(-500.0, ZoomKind::Pointer);
    assert_eq!(camera.target_zoom_radius, 10.0);
}

#[test]
fn touch_zoom_uses_tighter_bounds() {
    let mut camera = CameraController::new();
    for _ in 0..500 {
        camera.zoom_step(500.0, ZoomKind::Touch);
    }
    assert_eq!(camera.target_zoom_radius, 250.0);
    for _ in 0..500 {
        camera.zoom_step(-500.0, ZoomKind::Touch);
    }
    assert_eq!(camera.target_zoom_radius, 15.0);
}

#[test]
fn zoom_rate_scales_with_distance() {
    let mut far = CameraController::new();
    far.target_zoom_radius = 200.0;
    let mut near = CameraController::new();
    near.target_zoom_radius = 20.0;
    far.zoom_step(-10.0, ZoomKind::Pointer);
    near.zoom_step(-10.0, ZoomKind::Pointer);
    let far_step = 200.0 - far.target_zoom_radius;
    let near_step = 20.0 - near.target_zoom_radius;
    assert!(
        far_step > near_step,
        "far {far_step} should out-pace near {near_step}"
    );
}

#[test]
fn pitch_clamps_to_limit() {
    let mut camera = CameraController::new();
    camera.drag(0.0, 10_000.0);
    assert_eq!(camera.orbit_pitch, 1.2);
    camera.drag(0.0, -100_000.0);
    assert_eq!(camera.orbit_pitch, -1.2);
}

#[test]
fn eye_converges_to_target_under_ticks() {
    let mut camera = CameraController::new();
    camera.tick(); // first tick snaps
    camera.drag(300.0, 100.0);
    camera.zoom_step(200.0, ZoomKind::Pointer);
    for _ in 0..400 {
        camera.tick();
    }
    let eye = camera.eye();
    // After many smoothing steps the eye sits on the spherical target.
    assert!((eye.length() - camera.target_zoom_radius).abs() < 0.01);
}

#[test]
fn first_tick_snaps_instead_of_lerping_from_origin() {
    let mut camera = CameraController::new();
    camera.tick();
    assert!((camera.eye().length() - camera.target_zoom_radius).abs() < 1e-3);
}
