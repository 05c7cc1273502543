use std::collections::hash_map::DefaultHasher;
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};

use glam::{Vec3, vec3};

const GOLDEN_RATIO_FRACTION: f32 = 0.618_034;

/// Three values in `[-1, 1]` derived from `id`, stable across runs.
pub(crate) fn stable_triple(id: &str) -> (f32, f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0x1f_ffff) as f64 / 0x1f_ffff as f64) as f32;
    let y = (((hash >> 21) & 0x1f_ffff) as f64 / 0x1f_ffff as f64) as f32;
    let z = (((hash >> 42) & 0x1f_ffff) as f64 / 0x1f_ffff as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0, (z * 2.0) - 1.0)
}

/// Deterministic unit direction for `index`, spread over the sphere with a
/// golden-angle spiral. Used wherever two points coincide and a push
/// direction is still needed.
pub(crate) fn spiral_direction(index: usize, salt: usize) -> Vec3 {
    let turn = ((index as f32) * GOLDEN_RATIO_FRACTION + (salt as f32) * 0.414_214).fract();
    let angle = turn * TAU;
    let height = (((index.wrapping_mul(7) + salt) % 13) as f32 / 6.0) - 1.0;
    let ring = (1.0 - height * height).max(0.0).sqrt();
    vec3(angle.cos() * ring, height, angle.sin() * ring)
}
