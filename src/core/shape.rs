use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BlobError, Result};
use crate::utils::math::centroid;

/// Control-point ring of the blob.
///
/// `positions`, `velocities` and `targets` are parallel sequences indexed by
/// control point; point `i` neighbors `i - 1` and `i + 1` modulo the length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeState {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    pub targets: Vec<Vec2>,
    pub center: Vec2,
    /// Nominal radius.
    pub radius: f32,
}

impl ShapeState {
    /// Builds a shape from explicit positions with zero velocities and
    /// targets equal to the positions.
    pub fn from_positions(positions: Vec<Vec2>, center: Vec2, radius: f32) -> Self {
        let count = positions.len();
        Self {
            targets: positions.clone(),
            velocities: vec![Vec2::ZERO; count],
            positions,
            center,
            radius,
        }
    }

    /// Points exactly on a circle, starting at angle zero.
    pub fn circle(center: Vec2, radius: f32, count: usize) -> Self {
        let positions = (0..count)
            .map(|i| center + Vec2::from_angle(ring_angle(i, count)) * radius)
            .collect();
        Self::from_positions(positions, center, radius)
    }

    /// Irregular but smooth ring used on creation and on explicit resets.
    pub fn organic<R: Rng>(center: Vec2, radius: f32, count: usize, rng: &mut R) -> Self {
        let mut factors: Vec<f32> = (0..count).map(|_| rng.gen_range(0.9..1.1)).collect();

        let lobes = rng.gen_range(2u32..5) as f32;
        let lobe_phase = rng.gen::<f32>() * TAU;
        for (i, factor) in factors.iter_mut().enumerate() {
            let angle = ring_angle(i, count);
            let lobe = 0.07 * (angle * lobes + lobe_phase).sin();
            let ripple = 0.04 * (angle * (lobes * 2.0 + 1.0) + lobe_phase * 1.5).sin();
            *factor = (*factor + lobe + ripple).clamp(0.85, 1.15);
        }

        for _ in 0..3 {
            let previous = factors.clone();
            for i in 0..count {
                let (prev, next) = ring_neighbors(i, count);
                factors[i] = previous[prev] * 0.2 + previous[i] * 0.6 + previous[next] * 0.2;
            }
        }

        let max_radius = radius * 0.98;
        let positions = factors
            .iter()
            .enumerate()
            .map(|(i, factor)| {
                let deformed = (radius * factor).min(max_radius);
                center + Vec2::from_angle(ring_angle(i, count)) * deformed
            })
            .collect();

        Self::from_positions(positions, center, radius)
    }

    /// Replaces every position with a point at a random distance in
    /// `[0.9, 1.1] * radius` from the center and zeroes all velocities.
    pub fn regenerate_ring<R: Rng>(&mut self, rng: &mut R) {
        let count = self.positions.len();
        for (i, (position, velocity)) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .enumerate()
        {
            let distance = self.radius * rng.gen_range(0.9..=1.1);
            *position = self.center + Vec2::from_angle(ring_angle(i, count)) * distance;
            *velocity = Vec2::ZERO;
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Fails unless all three sequences have exactly `expected` entries.
    pub fn check_consistency(&self, expected: usize) -> Result<()> {
        if self.positions.len() == expected
            && self.velocities.len() == expected
            && self.targets.len() == expected
        {
            return Ok(());
        }
        Err(BlobError::ConfigurationMismatch {
            expected,
            positions: self.positions.len(),
            velocities: self.velocities.len(),
            targets: self.targets.len(),
        })
    }

    /// Average distance of the control points from the center.
    pub fn mean_radius(&self) -> f32 {
        if self.positions.is_empty() {
            return 0.0;
        }
        let total: f32 = self
            .positions
            .iter()
            .map(|p| p.distance(self.center))
            .sum();
        total / self.positions.len() as f32
    }

    /// Arithmetic mean of all velocities.
    pub fn mean_velocity(&self) -> Vec2 {
        centroid(&self.velocities)
    }

    /// Moves center, positions and targets by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.center += delta;
        for position in &mut self.positions {
            *position += delta;
        }
        for target in &mut self.targets {
            *target += delta;
        }
    }

    pub fn zero_velocities(&mut self) {
        self.velocities.fill(Vec2::ZERO);
    }
}

/// Angle of control point `index` on an evenly spaced ring.
pub fn ring_angle(index: usize, count: usize) -> f32 {
    TAU * index as f32 / count as f32
}

/// Previous and next indices of `index` on a ring of `count` points.
pub fn ring_neighbors(index: usize, count: usize) -> (usize, usize) {
    ((index + count - 1) % count, (index + 1) % count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn organic_shape_stays_below_nominal_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = Vec2::new(400.0, 300.0);
        let shape = ShapeState::organic(center, 250.0, 32, &mut rng);

        assert_eq!(shape.len(), 32);
        assert!(shape.check_consistency(32).is_ok());
        for p in &shape.positions {
            let d = p.distance(center);
            assert!(d <= 250.0 * 0.98 + 1e-3, "distance {d}");
            assert!(d >= 250.0 * 0.8, "distance {d}");
        }
        assert_eq!(shape.positions, shape.targets);
        assert!(shape.velocities.iter().all(|v| *v == Vec2::ZERO));
    }

    #[test]
    fn organic_shape_is_reproducible_from_seed() {
        let center = Vec2::new(100.0, 100.0);
        let a = ShapeState::organic(center, 50.0, 16, &mut StdRng::seed_from_u64(3));
        let b = ShapeState::organic(center, 50.0, 16, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn mismatched_lengths_are_reported() {
        let mut shape = ShapeState::circle(Vec2::ZERO, 10.0, 8);
        shape.targets.pop();
        match shape.check_consistency(8) {
            Err(BlobError::ConfigurationMismatch { targets, .. }) => assert_eq!(targets, 7),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ring_neighbors_wrap() {
        assert_eq!(ring_neighbors(0, 5), (4, 1));
        assert_eq!(ring_neighbors(4, 5), (3, 0));
    }

    #[test]
    fn circle_mean_radius_matches() {
        let shape = ShapeState::circle(Vec2::new(5.0, 5.0), 20.0, 12);
        assert!((shape.mean_radius() - 20.0).abs() < 1e-3);
    }
}
