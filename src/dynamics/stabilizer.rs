use glam::Vec2;
use rand::Rng;

use crate::core::shape::{ring_angle, ShapeState};

/// Accepted band of mean radius over nominal radius.
const RADIUS_TOLERANCE: f32 = 0.1;

/// Keeps a motionless ring close to its nominal radius.
///
/// Each point owns an "ideal" radial offset drawn once at construction; the
/// offsets stay fixed for the lifetime of the instance so the resting shape
/// keeps a slightly irregular silhouette.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    pub rate: f32,
    ideal_offsets: Vec<f32>,
}

impl Stabilizer {
    pub fn new<R: Rng>(point_count: usize, rate: f32, rng: &mut R) -> Self {
        let ideal_offsets = (0..point_count).map(|_| rng.gen_range(0.95..=1.05)).collect();
        Self {
            rate,
            ideal_offsets,
        }
    }

    pub fn ideal_offsets(&self) -> &[f32] {
        &self.ideal_offsets
    }

    /// Resting position of point `index` for the given ring.
    pub fn ideal_point(&self, index: usize, count: usize, center: Vec2, radius: f32) -> Vec2 {
        let offset = self.ideal_offsets.get(index).copied().unwrap_or(1.0);
        center + Vec2::from_angle(ring_angle(index, count)) * radius * offset
    }

    /// Rescales the ring when its mean radius drifts more than 10% from the
    /// nominal radius, then eases every point toward its ideal position.
    ///
    /// Returns `true` when the rescale was needed.
    pub fn apply(&self, shape: &mut ShapeState) -> bool {
        let mean = shape.mean_radius();
        let mut rescaled = false;
        if mean > f32::EPSILON {
            let ratio = mean / shape.radius;
            if (ratio - 1.0).abs() > RADIUS_TOLERANCE {
                let scale = shape.radius / mean;
                let center = shape.center;
                for position in &mut shape.positions {
                    *position = center + (*position - center) * scale;
                }
                rescaled = true;
            }
        }

        let count = shape.len();
        for (i, position) in shape.positions.iter_mut().enumerate() {
            let ideal = self.ideal_point(i, count, shape.center, shape.radius);
            *position += (ideal - *position) * self.rate;
        }
        rescaled
    }
}
