//! Scene entities: one textured billboard per media item.
//!
//! Entities are created wholesale when the item set is (re)built and torn
//! down wholesale when it changes; there is no incremental diff. Positions
//! and orientations are assigned exactly once at creation.

use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use instant::Instant;
use smallvec::SmallVec;

use crate::constants::*;
use crate::cover::{CoverImage, CoverLoad, CoverSource};
use crate::item::{CardVisualState, MediaItem};
use crate::texture::{preview_region, CardTexture, CardTextureRenderer};

/// Cover art attached to a card as a secondary surface sized to exactly fill
/// the preview region.
pub struct CoverOverlay {
    /// Offset of the overlay center from the billboard center, in world
    /// units along the billboard's right/up axes.
    pub offset: Vec2,
    /// World-space width/height of the overlay quad.
    pub size: Vec2,
    pub image: CoverImage,
}

/// One card in the scene. Holds only the item id as a back-reference; the
/// item itself stays owned by the caller.
pub struct CardEntity {
    pub item_index: usize,
    pub item_id: u64,
    /// Assigned once at build; never reassigned.
    pub position: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub normal: Vec3,
    pub texture: CardTexture,
    /// Bumped whenever `texture` is replaced so frontends re-upload lazily.
    pub texture_version: u64,
    pub cover: Option<CoverOverlay>,
}

impl CardEntity {
    /// Model matrix for a unit quad (±0.5 in x/y) scaled to the billboard
    /// size, offset vertically by the current idle bob.
    pub fn model_matrix(&self, bob_offset: f32) -> glam::Mat4 {
        let translation = self.position + Vec3::Y * bob_offset;
        glam::Mat4::from_cols(
            (self.right * BILLBOARD_WIDTH).extend(0.0),
            (self.up * BILLBOARD_HEIGHT).extend(0.0),
            self.normal.extend(0.0),
            translation.extend(1.0),
        )
    }

    /// Model matrix for this card's cover overlay quad, nudged along the
    /// billboard normal so it draws in front of the card face.
    pub fn overlay_model_matrix(&self, bob_offset: f32) -> Option<glam::Mat4> {
        let overlay = self.cover.as_ref()?;
        let translation = self.position
            + Vec3::Y * bob_offset
            + self.right * overlay.offset.x
            + self.up * overlay.offset.y
            + self.normal * 0.01;
        Some(glam::Mat4::from_cols(
            (self.right * overlay.size.x).extend(0.0),
            (self.up * overlay.size.y).extend(0.0),
            self.normal.extend(0.0),
            translation.extend(1.0),
        ))
    }
}

/// All entities for the current item set plus the in-flight cover loads.
pub struct SceneGraph {
    entities: Vec<CardEntity>,
    index_by_id: FnvHashMap<u64, usize>,
    loads: Vec<CoverLoad>,
    generation: u64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index_by_id: FnvHashMap::default(),
            loads: Vec::new(),
            generation: 0,
        }
    }

    /// Replace the whole scene for a new item set. Disposes every existing
    /// entity and pending cover load (the generation bump guards against any
    /// late fetch completion touching the new scene).
    pub fn build(
        &mut self,
        items: &[MediaItem],
        visual_for: impl Fn(&MediaItem) -> CardVisualState,
        renderer: &CardTextureRenderer,
    ) {
        self.generation += 1;
        self.entities.clear();
        self.index_by_id.clear();
        self.loads.clear();

        for (index, item) in items.iter().enumerate() {
            let position = crate::layout::card_position(items.len(), index);
            let (right, up, normal) = billboard_axes(position);
            let texture = renderer.render_card(item, &visual_for(item));
            self.index_by_id.insert(item.id, index);
            self.entities.push(CardEntity {
                item_index: index,
                item_id: item.id,
                position,
                right,
                up,
                normal,
                texture,
                texture_version: 0,
                cover: None,
            });
            if let Some(reference) = &item.cover {
                self.loads
                    .push(CoverLoad::new(item.id, self.generation, reference.clone()));
            }
        }
        log::info!(
            "scene rebuilt: {} entities, {} cover loads (generation {})",
            self.entities.len(),
            self.loads.len(),
            self.generation
        );
    }

    /// Drive pending cover loads. Resolved images are attached to their
    /// entities only while the owning generation is still live; anything
    /// stale is a silent no-op.
    pub fn tick_covers(&mut self, source: &dyn CoverSource, now: Instant) {
        let generation = self.generation;
        let mut resolved: SmallVec<[(u64, CoverImage); 2]> = SmallVec::new();
        for load in &mut self.loads {
            if let Some(image) = load.tick(source, now) {
                if load.generation == generation {
                    resolved.push((load.item_id, image));
                }
            }
        }
        self.loads.retain(|l| !l.is_settled());
        for (item_id, image) in resolved {
            self.attach_cover(item_id, image);
        }
    }

    fn attach_cover(&mut self, item_id: u64, image: CoverImage) {
        let Some(entity) = self.entity_for_item_mut(item_id) else {
            return;
        };
        let (offset, size) = overlay_placement(image.width, image.height);
        entity.cover = Some(CoverOverlay {
            offset,
            size,
            image,
        });
    }

    /// Replace a card's texture (redraw), bumping its upload version.
    pub fn set_texture(&mut self, item_id: u64, texture: CardTexture) {
        if let Some(entity) = self.entity_for_item_mut(item_id) {
            entity.texture = texture;
            entity.texture_version += 1;
        }
    }

    pub fn entity_for_item(&self, item_id: u64) -> Option<&CardEntity> {
        self.index_by_id
            .get(&item_id)
            .map(|&i| &self.entities[i])
    }

    fn entity_for_item_mut(&mut self, item_id: u64) -> Option<&mut CardEntity> {
        self.index_by_id
            .get(&item_id)
            .map(|&i| &mut self.entities[i])
    }

    pub fn entities(&self) -> &[CardEntity] {
        &self.entities
    }

    /// Monotonic rebuild counter; frontends use it to invalidate GPU caches.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_cover_loads(&self) -> usize {
        self.loads.len()
    }
}

/// Billboard basis for a card at `position`, oriented to face the origin.
pub fn billboard_axes(position: Vec3) -> (Vec3, Vec3, Vec3) {
    let normal = (-position).normalize_or_zero();
    let normal = if normal == Vec3::ZERO { Vec3::Z } else { normal };
    let mut right = Vec3::Y.cross(normal);
    if right.length_squared() < 1e-6 {
        // Card sits on the vertical axis; any horizontal right vector works.
        right = Vec3::X;
    } else {
        right = right.normalize();
    }
    let up = normal.cross(right);
    (right, up, normal)
}

/// Where the cover overlay sits on the billboard, in world units.
///
/// Converts the preview region's pixel padding and height into billboard
/// space via the raster's pixels-per-unit scale factors, then contain-fits
/// the image aspect into 97% of the region so the rounded corners never clip
/// the art.
pub fn overlay_placement(image_width: u32, image_height: u32) -> (Vec2, Vec2) {
    let ppu_x = CARD_TEXTURE_WIDTH as f32 / BILLBOARD_WIDTH;
    let ppu_y = CARD_TEXTURE_HEIGHT as f32 / BILLBOARD_HEIGHT;
    let (rx, ry, rw, rh) = preview_region();

    let region_w = rw / ppu_x;
    let region_h = rh / ppu_y;
    let center_px_x = rx + rw / 2.0;
    let center_px_y = ry + rh / 2.0;
    let offset = Vec2::new(
        (center_px_x - CARD_TEXTURE_WIDTH as f32 / 2.0) / ppu_x,
        (CARD_TEXTURE_HEIGHT as f32 / 2.0 - center_px_y) / ppu_y,
    );

    let iw = image_width.max(1) as f32;
    let ih = image_height.max(1) as f32;
    let scale = (region_w * COVER_FIT_FRACTION / iw).min(region_h * COVER_FIT_FRACTION / ih);
    (offset, Vec2::new(iw * scale, ih * scale))
}
