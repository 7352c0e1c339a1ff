use glam::Vec2;
use log::warn;
use rand::rngs::StdRng;

use crate::core::shape::ShapeState;
use crate::utils::math::is_within_limit;

/// Largest accepted magnitude of any position or velocity component.
pub const COMPONENT_LIMIT: f32 = 100_000.0;

/// Result of a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Nothing was touched.
    Valid,
    /// The ring was regenerated.
    Repaired {
        invalid_points: usize,
        center_reset: bool,
    },
}

impl ValidationOutcome {
    pub fn is_repaired(&self) -> bool {
        matches!(self, Self::Repaired { .. })
    }
}

/// Detects non-finite or runaway point data and regenerates the ring.
#[derive(Debug, Clone)]
pub struct Validator {
    rng: StdRng,
}

impl Validator {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Number of points with an invalid position or velocity.
    pub fn count_invalid(shape: &ShapeState) -> usize {
        shape
            .positions
            .iter()
            .zip(&shape.velocities)
            .filter(|(p, v)| !is_within_limit(**p, COMPONENT_LIMIT) || !is_within_limit(**v, COMPONENT_LIMIT))
            .count()
    }

    pub fn is_valid(shape: &ShapeState) -> bool {
        is_within_limit(shape.center, COMPONENT_LIMIT) && Self::count_invalid(shape) == 0
    }

    /// Checks `shape` and repairs it when needed. A valid shape is left
    /// untouched. A non-finite center is first moved to `fallback_center`.
    pub fn validate(&mut self, shape: &mut ShapeState, fallback_center: Vec2) -> ValidationOutcome {
        let center_reset = !is_within_limit(shape.center, COMPONENT_LIMIT);
        let invalid_points = Self::count_invalid(shape);
        if !center_reset && invalid_points == 0 {
            return ValidationOutcome::Valid;
        }

        warn!(
            "invalid blob state: {invalid_points} of {} points, center ok: {}; regenerating ring",
            shape.len(),
            !center_reset
        );

        if center_reset {
            shape.center = fallback_center;
        }
        shape.regenerate_ring(&mut self.rng);
        for (target, position) in shape.targets.iter_mut().zip(&shape.positions) {
            if !is_within_limit(*target, COMPONENT_LIMIT) {
                *target = *position;
            }
        }

        ValidationOutcome::Repaired {
            invalid_points,
            center_reset,
        }
    }
}
