//! Raw pointer/touch/wheel events classified into orbit drags, taps and zoom
//! steps. The router owns no camera state; it mutates the controller it is
//! handed and reports tap positions for the pick service.

use crate::camera::{CameraController, ZoomKind};
use crate::constants::DRAG_THRESHOLD_PX;
use glam::Vec2;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug)]
struct Track {
    last: Vec2,
    travelled: f32,
}

impl Track {
    fn new(pos: Vec2) -> Self {
        Self {
            last: pos,
            travelled: 0.0,
        }
    }

    /// Record a move; returns the delta since the previous position.
    fn advance(&mut self, pos: Vec2) -> Vec2 {
        let delta = pos - self.last;
        self.travelled += delta.length();
        self.last = pos;
        delta
    }

    fn is_drag(&self) -> bool {
        self.travelled > DRAG_THRESHOLD_PX
    }
}

#[derive(Clone, Copy, Debug)]
struct TouchPoint {
    id: u64,
    pos: Vec2,
}

/// Classifies pointer/touch/wheel input. One per gallery instance.
#[derive(Default)]
pub struct InputRouter {
    pointer: Option<Track>,
    touches: SmallVec<[TouchPoint; 2]>,
    touch_track: Option<Track>,
    pinch_dist: Option<f32>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer button down (primary or secondary both arm orbit-drag).
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.pointer = Some(Track::new(pos));
    }

    pub fn pointer_move(&mut self, pos: Vec2, camera: &mut CameraController) {
        if let Some(track) = &mut self.pointer {
            let delta = track.advance(pos);
            camera.drag(delta.x, delta.y);
        }
    }

    /// Pointer released: a tap position when cumulative movement stayed within
    /// the drag threshold, otherwise `None` (selection suppressed).
    pub fn pointer_up(&mut self, pos: Vec2) -> Option<Vec2> {
        let track = self.pointer.take()?;
        (!track.is_drag()).then_some(pos)
    }

    pub fn wheel(&mut self, raw_delta: f32, camera: &mut CameraController) {
        camera.zoom_step(raw_delta, ZoomKind::Pointer);
    }

    pub fn touch_start(&mut self, id: u64, pos: Vec2) {
        if self.touches.iter().any(|t| t.id == id) {
            return;
        }
        self.touches.push(TouchPoint { id, pos });
        match self.touches.len() {
            1 => self.touch_track = Some(Track::new(pos)),
            2 => {
                // Second finger cancels any pending tap and starts a pinch.
                self.touch_track = None;
                self.pinch_dist = Some(self.finger_distance());
            }
            _ => {}
        }
    }

    pub fn touch_move(&mut self, id: u64, pos: Vec2, camera: &mut CameraController) {
        if let Some(point) = self.touches.iter_mut().find(|t| t.id == id) {
            point.pos = pos;
        } else {
            return;
        }
        if self.touches.len() >= 2 {
            let dist = self.finger_distance();
            if let Some(prev) = self.pinch_dist.replace(dist) {
                // Same step formula as the wheel; spreading the fingers
                // (growing distance) zooms in.
                camera.zoom_step(prev - dist, ZoomKind::Touch);
            }
        } else if let Some(track) = &mut self.touch_track {
            let delta = track.advance(pos);
            camera.drag(delta.x, delta.y);
        }
    }

    /// Touch lifted: a tap position only for a one-finger touch that stayed
    /// within the drag threshold.
    pub fn touch_end(&mut self, id: u64, pos: Vec2) -> Option<Vec2> {
        let Some(i) = self.touches.iter().position(|t| t.id == id) else {
            return None;
        };
        self.touches.remove(i);
        if self.touches.len() < 2 {
            self.pinch_dist = None;
        }
        if self.touches.is_empty() {
            let track = self.touch_track.take()?;
            return (!track.is_drag()).then_some(pos);
        }
        None
    }

    /// Drop all in-flight gesture state (e.g. window focus loss).
    pub fn cancel(&mut self) {
        self.pointer = None;
        self.touches.clear();
        self.touch_track = None;
        self.pinch_dist = None;
    }

    fn finger_distance(&self) -> f32 {
        if self.touches.len() >= 2 {
            (self.touches[0].pos - self.touches[1].pos).length()
        } else {
            0.0
        }
    }
}
