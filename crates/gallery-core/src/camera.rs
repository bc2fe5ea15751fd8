//! Orbit camera: continuous angle/pitch/zoom state smoothed each tick.
//!
//! Pointer and touch drags drive the same orbit fields; only the zoom bounds
//! differ by input kind. The rendered eye position chases the target position
//! derived from spherical coordinates, which absorbs jitter from discrete
//! input events. The camera always looks at the scene origin.

use crate::constants::*;
use glam::{Mat4, Vec3};

/// Which device produced a zoom step. Selects the zoom radius bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomKind {
    Pointer,
    Touch,
}

impl ZoomKind {
    fn bounds(self) -> (f32, f32) {
        match self {
            ZoomKind::Pointer => (POINTER_ZOOM_MIN, POINTER_ZOOM_MAX),
            ZoomKind::Touch => (TOUCH_ZOOM_MIN, TOUCH_ZOOM_MAX),
        }
    }
}

pub struct CameraController {
    pub orbit_angle: f32,
    pub orbit_pitch: f32,
    pub target_zoom_radius: f32,
    eye: Vec3,
    aspect: f32,
    initialized: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            orbit_angle: 0.0,
            orbit_pitch: 0.0,
            target_zoom_radius: DEFAULT_ZOOM_RADIUS,
            eye: Vec3::ZERO,
            aspect: 1.0,
            initialized: false,
        }
    }

    /// Target eye position from spherical coordinates.
    fn target_eye(&self) -> Vec3 {
        let r = self.target_zoom_radius;
        let (sin_a, cos_a) = self.orbit_angle.sin_cos();
        let (sin_p, cos_p) = self.orbit_pitch.sin_cos();
        Vec3::new(r * cos_p * sin_a, r * sin_p, r * cos_p * cos_a)
    }

    /// Advance one display tick: exponentially interpolate the rendered eye
    /// toward the target position. The first tick snaps.
    pub fn tick(&mut self) {
        let target = self.target_eye();
        if !self.initialized {
            self.eye = target;
            self.initialized = true;
        } else {
            self.eye += (target - self.eye) * CAMERA_SMOOTHING;
        }
    }

    /// Apply a wheel/pinch zoom step. The rate scales with distance so zooming
    /// is fast far away and fine up close; the result stays inside the input
    /// kind's bounds.
    pub fn zoom_step(&mut self, raw_delta: f32, kind: ZoomKind) {
        let rate =
            (self.target_zoom_radius / ZOOM_RATE_REF_RADIUS).clamp(ZOOM_RATE_MIN, ZOOM_RATE_MAX);
        let (min, max) = kind.bounds();
        self.target_zoom_radius =
            (self.target_zoom_radius + raw_delta * ZOOM_BASE_FACTOR * rate).clamp(min, max);
    }

    /// Apply a drag delta in pixels to the orbit angles.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.orbit_angle += dx * ORBIT_SENSITIVITY;
        self.orbit_pitch =
            (self.orbit_pitch + dy * ORBIT_SENSITIVITY).clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
    }

    /// Rendered (smoothed) eye position.
    pub fn eye(&self) -> Vec3 {
        if self.initialized {
            self.eye
        } else {
            self.target_eye()
        }
    }

    /// Viewport resize updates the projection aspect only; never relayout.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(CAMERA_FOV_Y, self.aspect, CAMERA_ZNEAR, CAMERA_ZFAR)
    }
}
