//! Ray-based picking: screen point -> world ray -> nearest card entity.

use glam::{Vec2, Vec3, Vec4};

use crate::camera::CameraController;
use crate::constants::{BILLBOARD_HEIGHT, BILLBOARD_WIDTH};
use crate::scene::CardEntity;

/// Compute a world-space ray from a screen-space point.
///
/// Returns `(ray_origin, ray_direction)`; `None` for a degenerate viewport.
pub fn screen_to_world_ray(
    screen: Vec2,
    viewport: Vec2,
    camera: &CameraController,
) -> Option<(Vec3, Vec3)> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    let ndc_x = 2.0 * screen.x / viewport.x - 1.0;
    let ndc_y = 1.0 - 2.0 * screen.y / viewport.y;
    let inv = (camera.projection_matrix() * camera.view_matrix()).inverse();
    let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    if far.w.abs() < 1e-9 {
        return None;
    }
    let far = far.truncate() / far.w;
    let origin = camera.eye();
    Some((origin, (far - origin).normalize()))
}

/// Project a world point to screen coordinates; `None` when behind the eye.
pub fn project(world: Vec3, viewport: Vec2, camera: &CameraController) -> Option<Vec2> {
    let clip = camera.projection_matrix() * camera.view_matrix() * world.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) / 2.0 * viewport.x,
        (1.0 - ndc.y) / 2.0 * viewport.y,
    ))
}

/// Ray vs. oriented rectangle centered at `center` with the given basis and
/// half extents. Returns the ray parameter of the hit.
fn ray_rect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    center: Vec3,
    right: Vec3,
    up: Vec3,
    normal: Vec3,
    half_w: f32,
    half_h: f32,
) -> Option<f32> {
    let denom = ray_dir.dot(normal);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (center - ray_origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    let local = ray_origin + ray_dir * t - center;
    let u = local.dot(right);
    let v = local.dot(up);
    (u.abs() <= half_w && v.abs() <= half_h).then_some(t)
}

/// Resolve a screen point to the item id of the nearest intersected card.
///
/// Both the billboard and its cover overlay count as the entity's surface;
/// `bob_offset` supplies the current per-card vertical idle offset so
/// picking matches what is drawn. A miss is an empty result, not an error.
pub fn pick(
    screen: Vec2,
    viewport: Vec2,
    camera: &CameraController,
    entities: &[CardEntity],
    bob_offset: impl Fn(usize) -> f32,
) -> Option<u64> {
    let (origin, dir) = screen_to_world_ray(screen, viewport, camera)?;
    let mut best: Option<(u64, f32)> = None;
    for entity in entities {
        let center = entity.position + Vec3::Y * bob_offset(entity.item_index);
        let mut nearest = ray_rect(
            origin,
            dir,
            center,
            entity.right,
            entity.up,
            entity.normal,
            BILLBOARD_WIDTH / 2.0,
            BILLBOARD_HEIGHT / 2.0,
        );
        if let Some(overlay) = &entity.cover {
            let overlay_center =
                center + entity.right * overlay.offset.x + entity.up * overlay.offset.y;
            let hit = ray_rect(
                origin,
                dir,
                overlay_center,
                entity.right,
                entity.up,
                entity.normal,
                overlay.size.x / 2.0,
                overlay.size.y / 2.0,
            );
            nearest = match (nearest, hit) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
        if let Some(t) = nearest {
            match best {
                Some((_, bt)) if t >= bt => {}
                _ => best = Some((entity.item_id, t)),
            }
        }
    }
    best.map(|(id, _)| id)
}
