//! Additional math helpers layered on top of `glam`.

use std::f32::consts::TAU;

use glam::Vec2;

/// Wraps an accumulating phase into `[0, 2π)`.
pub fn wrap_phase(phase: f32) -> f32 {
    phase.rem_euclid(TAU)
}

/// Distance from the center relative to the nominal radius.
pub fn radial_weight(point: Vec2, center: Vec2, radius: f32) -> f32 {
    if radius > 0.0 {
        point.distance(center) / radius
    } else {
        0.0
    }
}

/// Returns `true` when both components are finite and within `±limit`.
pub fn is_within_limit(v: Vec2, limit: f32) -> bool {
    v.is_finite() && v.x.abs() <= limit && v.y.abs() <= limit
}

/// Arithmetic mean of `points`, or zero for an empty slice.
pub fn centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}
