//! The gallery instance object: scene, camera, input and scheduling tied
//! together behind one explicit handle. No ambient globals; multiple
//! galleries can coexist and tear down deterministically.

use glam::Vec2;
use instant::Instant;
use std::time::Duration;

use crate::camera::CameraController;
use crate::constants::{BOB_AMPLITUDE, BOB_INDEX_OFFSET, BOB_RATE};
use crate::cover::CoverSource;
use crate::input::InputRouter;
use crate::item::{CardVisualState, MediaItem, PlaybackSnapshot};
use crate::pick;
use crate::scene::SceneGraph;
use crate::scheduler::UpdateScheduler;
use crate::texture::CardTextureRenderer;

/// Per-card idle vertical bob. The per-index phase offset desynchronizes
/// motion across cards.
#[inline]
pub fn bob_offset(phase: f32, index: usize) -> f32 {
    BOB_AMPLITUDE * (phase + index as f32 * BOB_INDEX_OFFSET).sin()
}

pub struct Gallery {
    items: Vec<MediaItem>,
    scene: SceneGraph,
    pub camera: CameraController,
    router: InputRouter,
    scheduler: UpdateScheduler,
    renderer: CardTextureRenderer,
    cover_source: Box<dyn CoverSource>,
    playback: PlaybackSnapshot,
    viewport: Vec2,
    bob_phase: f32,
    on_select: Option<Box<dyn FnMut(u64)>>,
}

impl Gallery {
    pub fn new(cover_source: Box<dyn CoverSource>) -> Self {
        Self::with_renderer(CardTextureRenderer::new(), cover_source)
    }

    pub fn with_renderer(
        renderer: CardTextureRenderer,
        cover_source: Box<dyn CoverSource>,
    ) -> Self {
        Self {
            items: Vec::new(),
            scene: SceneGraph::new(),
            camera: CameraController::new(),
            router: InputRouter::new(),
            scheduler: UpdateScheduler::new(),
            renderer,
            cover_source,
            playback: PlaybackSnapshot::default(),
            viewport: Vec2::new(1.0, 1.0),
            bob_phase: 0.0,
            on_select: None,
        }
    }

    /// Selection callback; fires once per qualifying click/tap that resolves
    /// to a card.
    pub fn set_on_select(&mut self, callback: impl FnMut(u64) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    /// (Re)build the scene for a new ordered item set. The previous scene is
    /// disposed wholesale.
    pub fn set_items(&mut self, items: &[MediaItem]) {
        self.items = items.to_vec();
        let playback = self.playback.clone();
        self.scene.build(
            &self.items,
            |item| visual_for(item, &playback),
            &self.renderer,
        );
        self.scheduler.reset();
    }

    /// Push caller playback state. Texture regeneration is throttled by the
    /// scheduler, not by the cadence of these calls.
    pub fn set_playback(&mut self, snapshot: PlaybackSnapshot) {
        let plans = self.scheduler.plan(&snapshot);
        self.playback = snapshot;
        for plan in plans {
            let Some(entity) = self.scene.entity_for_item(plan.item_id) else {
                continue;
            };
            let item = &self.items[entity.item_index];
            let visual = CardVisualState {
                is_active: plan.is_active,
                is_playing: plan.is_playing,
                progress: if plan.is_active {
                    progress_fraction(item, &self.playback)
                } else {
                    0.0
                },
            };
            let texture = self.renderer.render_card(item, &visual);
            self.scene.set_texture(plan.item_id, texture);
        }
    }

    /// Advance one display tick: smooth the camera, advance the idle bob and
    /// drive pending cover loads. Never blocks.
    pub fn advance(&mut self, now: Instant, dt: Duration) {
        self.camera.tick();
        self.bob_phase += dt.as_secs_f32() * BOB_RATE;
        self.scene.tick_covers(self.cover_source.as_ref(), now);
    }

    /// Viewport resize updates camera aspect and pick viewport only.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
            self.camera.set_aspect(width / height);
        }
    }

    // ---------------- input entry points ----------------

    pub fn pointer_down(&mut self, pos: Vec2) {
        self.router.pointer_down(pos);
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        self.router.pointer_move(pos, &mut self.camera);
    }

    pub fn pointer_up(&mut self, pos: Vec2) {
        if let Some(tap) = self.router.pointer_up(pos) {
            self.resolve_tap(tap);
        }
    }

    pub fn wheel(&mut self, raw_delta: f32) {
        self.router.wheel(raw_delta, &mut self.camera);
    }

    pub fn touch_start(&mut self, id: u64, pos: Vec2) {
        self.router.touch_start(id, pos);
    }

    pub fn touch_move(&mut self, id: u64, pos: Vec2) {
        self.router.touch_move(id, pos, &mut self.camera);
    }

    pub fn touch_end(&mut self, id: u64, pos: Vec2) {
        if let Some(tap) = self.router.touch_end(id, pos) {
            self.resolve_tap(tap);
        }
    }

    pub fn cancel_input(&mut self) {
        self.router.cancel();
    }

    fn resolve_tap(&mut self, pos: Vec2) {
        let phase = self.bob_phase;
        let hit = pick::pick(pos, self.viewport, &self.camera, self.scene.entities(), |i| {
            bob_offset(phase, i)
        });
        if let Some(item_id) = hit {
            log::debug!("tap selected item {item_id}");
            if let Some(callback) = &mut self.on_select {
                callback(item_id);
            }
        }
    }

    // ---------------- frontend accessors ----------------

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn bob_phase(&self) -> f32 {
        self.bob_phase
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }
}

fn visual_for(item: &MediaItem, playback: &PlaybackSnapshot) -> CardVisualState {
    let is_active = playback.current_item_id == Some(item.id);
    CardVisualState {
        is_active,
        is_playing: is_active && playback.is_playing,
        progress: if is_active {
            progress_fraction(item, playback)
        } else {
            0.0
        },
    }
}

fn progress_fraction(item: &MediaItem, playback: &PlaybackSnapshot) -> f32 {
    if item.duration_sec > 0.0 {
        (playback.current_time_sec / item.duration_sec) as f32
    } else {
        0.0
    }
}
