//! Deterministic card placement on layered Fibonacci-sphere shells.

use crate::constants::{SHELL_BASE_RADIUS, SHELL_COUNT, SHELL_STEP};
use glam::Vec3;

/// World-space position of card `index` out of `count`.
///
/// Golden-angle-derived azimuth with uniform polar spacing, distributed over
/// three concentric shells (`index % 3`) so the set never collapses into a
/// single flat sphere. Pure: repeated calls for the same `(count, index)` are
/// bit-identical, so viewport or camera changes never cause relayout.
pub fn card_position(count: usize, index: usize) -> Vec3 {
    debug_assert!(count > 0 && index < count);
    let n = count as f32;
    let i = index as f32;
    let phi = (-1.0 + 2.0 * i / n).acos();
    let theta = (n * std::f32::consts::PI).sqrt() * phi;
    let radius = shell_radius(index);
    Vec3::new(
        radius * theta.cos() * phi.sin(),
        radius * theta.sin() * phi.sin(),
        radius * phi.cos(),
    )
}

/// Shell radius for a card index: 35, 43 or 51 world units.
#[inline]
pub fn shell_radius(index: usize) -> f32 {
    SHELL_BASE_RADIUS + (index % SHELL_COUNT) as f32 * SHELL_STEP
}
