use glam::Vec2;

use crate::{
    config::PhysicsParameters,
    core::{
        shape::{ring_neighbors, ShapeState},
        types::Bounds,
    },
    dynamics::{
        stabilizer::Stabilizer,
        validator::{ValidationOutcome, Validator},
    },
    utils::profiling::{PassTimer, TickProfiler},
};

/// Velocity nudge applied along the pair axis when a neighbor pair is corrected.
const NEIGHBOR_VELOCITY_NUDGE: f32 = 0.3;

/// Fraction of the way each point moves toward its neighbors' average.
const SMOOTHING_FACTOR: f32 = 0.15;

/// Counters describing one solver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverStepMetrics {
    /// Point/axis pairs clamped at the widget border.
    pub border_contacts: usize,
    /// Neighbor pairs pushed back into the distance band.
    pub neighbor_corrections: usize,
    pub stabilized: bool,
    /// Whether the stabilizer had to rescale the ring.
    pub rescaled: bool,
    pub validation: ValidationOutcome,
}

impl Default for SolverStepMetrics {
    fn default() -> Self {
        Self {
            border_contacts: 0,
            neighbor_corrections: 0,
            stabilized: false,
            rescaled: false,
            validation: ValidationOutcome::Valid,
        }
    }
}

/// Clamps points and the center into `[padding, extent - padding]` on both axes.
/// A clamped point's velocity on that axis is reversed and scaled by `restitution`.
///
/// Returns the number of point/axis clamps.
pub fn apply_border_collision(
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
    center: &mut Vec2,
    bounds: Bounds,
    padding: f32,
    restitution: f32,
) -> usize {
    let min = Vec2::splat(padding);
    let max = bounds.size() - Vec2::splat(padding);
    let mut contacts = 0;

    for (position, velocity) in positions.iter_mut().zip(velocities.iter_mut()) {
        for axis in 0..2 {
            if position[axis] < min[axis] {
                position[axis] = min[axis];
            } else if position[axis] > max[axis] {
                position[axis] = max[axis];
            } else {
                continue;
            }
            velocity[axis] = -velocity[axis] * restitution;
            contacts += 1;
        }
    }

    for axis in 0..2 {
        if center[axis] < min[axis] {
            center[axis] = min[axis];
        } else if center[axis] > max[axis] {
            center[axis] = max[axis];
        }
    }

    contacts
}

/// Pushes every ring-adjacent pair back into `[min_distance, max_distance]`.
///
/// Each point of an offending pair moves half the excess along the pair axis
/// and both velocities are nudged together (too far) or apart (too close).
/// Coincident or non-finite pairs are skipped. Returns the number of corrected pairs.
pub fn apply_neighbor_distance(
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
    min_distance: f32,
    max_distance: f32,
) -> usize {
    let count = positions.len();
    let mut corrections = 0;

    for i in 0..count {
        let (_, next) = ring_neighbors(i, count);
        let delta = positions[next] - positions[i];
        let distance = delta.length();
        if !(distance > 0.0) || !distance.is_finite() {
            continue;
        }

        let goal = if distance > max_distance {
            max_distance
        } else if distance < min_distance {
            min_distance
        } else {
            continue;
        };

        let direction = delta / distance;
        let correction = direction * ((distance - goal) * 0.5);
        positions[i] += correction;
        positions[next] -= correction;

        // too far: pull together; too close: push apart
        let nudge = if distance > max_distance {
            direction * NEIGHBOR_VELOCITY_NUDGE
        } else {
            -direction * NEIGHBOR_VELOCITY_NUDGE
        };
        velocities[i] += nudge;
        velocities[next] -= nudge;
        corrections += 1;
    }

    corrections
}

/// One Laplacian relaxation pass over the ring. `scratch` holds the
/// pre-pass positions so every point reads the same snapshot.
pub fn smooth_ring(positions: &mut [Vec2], scratch: &mut Vec<Vec2>) {
    let count = positions.len();
    if count < 3 {
        return;
    }
    scratch.clear();
    scratch.extend_from_slice(positions);

    for (i, position) in positions.iter_mut().enumerate() {
        let (prev, next) = ring_neighbors(i, count);
        let average = (scratch[prev] + scratch[next]) * 0.5;
        *position += (average - *position) * SMOOTHING_FACTOR;
    }
}

/// Runs the constraint passes in their fixed order:
/// border, neighbor distance, smoothing, stabilizer (motionless only), validator.
#[derive(Debug, Clone)]
pub struct ConstraintSolver {
    pub params: PhysicsParameters,
    pub bounds: Bounds,
    pub padding: f32,
    stabilizer: Stabilizer,
    validator: Validator,
    scratch: Vec<Vec2>,
}

impl ConstraintSolver {
    pub fn new(
        params: PhysicsParameters,
        bounds: Bounds,
        padding: f32,
        stabilizer: Stabilizer,
        validator: Validator,
    ) -> Self {
        Self {
            params,
            bounds,
            padding,
            stabilizer,
            validator,
            scratch: Vec::new(),
        }
    }

    pub fn stabilizer(&self) -> &Stabilizer {
        &self.stabilizer
    }

    pub fn set_params(&mut self, params: PhysicsParameters) {
        self.stabilizer.rate = params.stabilization_rate;
        self.params = params;
    }

    /// Runs only the validator, e.g. after host-driven mutations outside a tick.
    pub fn validate(&mut self, shape: &mut ShapeState) -> ValidationOutcome {
        self.validator.validate(shape, self.bounds.center())
    }

    pub fn solve(
        &mut self,
        shape: &mut ShapeState,
        in_motion: bool,
        profiler: &mut TickProfiler,
    ) -> SolverStepMetrics {
        let mut metrics = SolverStepMetrics::default();

        {
            let _timer = PassTimer::new(&mut profiler.border_time);
            metrics.border_contacts = apply_border_collision(
                &mut shape.positions,
                &mut shape.velocities,
                &mut shape.center,
                self.bounds,
                self.padding,
                self.params.restitution,
            );
        }

        {
            let _timer = PassTimer::new(&mut profiler.neighbor_time);
            metrics.neighbor_corrections = apply_neighbor_distance(
                &mut shape.positions,
                &mut shape.velocities,
                self.params.min_neighbor_distance(shape.radius),
                self.params.max_neighbor_distance(shape.radius),
            );
        }

        {
            let _timer = PassTimer::new(&mut profiler.smoothing_time);
            smooth_ring(&mut shape.positions, &mut self.scratch);
        }

        if !in_motion {
            let _timer = PassTimer::new(&mut profiler.stabilizer_time);
            metrics.rescaled = self.stabilizer.apply(shape);
            metrics.stabilized = true;
        }

        {
            let _timer = PassTimer::new(&mut profiler.validator_time);
            metrics.validation = self.validator.validate(shape, self.bounds.center());
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_reflects_with_restitution() {
        let mut positions = vec![Vec2::new(-5.0, 50.0), Vec2::new(120.0, 50.0)];
        let mut velocities = vec![Vec2::new(-10.0, 1.0), Vec2::new(4.0, 0.0)];
        let mut center = Vec2::new(50.0, 200.0);
        let contacts = apply_border_collision(
            &mut positions,
            &mut velocities,
            &mut center,
            Bounds::new(100.0, 100.0),
            10.0,
            0.5,
        );

        assert_eq!(contacts, 2);
        assert_eq!(positions[0], Vec2::new(10.0, 50.0));
        assert_eq!(velocities[0], Vec2::new(5.0, 1.0));
        assert_eq!(positions[1], Vec2::new(90.0, 50.0));
        assert_eq!(velocities[1], Vec2::new(-2.0, 0.0));
        assert_eq!(center, Vec2::new(50.0, 90.0));
    }

    #[test]
    fn far_pair_is_pulled_together() {
        let mut positions = vec![Vec2::ZERO, Vec2::new(20.0, 0.0), Vec2::new(10.0, 5.0)];
        let mut velocities = vec![Vec2::ZERO; 3];
        apply_neighbor_distance(&mut positions[..2], &mut velocities[..2], 1.0, 10.0);

        // the two-point ring corrects the same pair from both sides
        assert!(positions[0].distance(positions[1]) <= 10.0 + 1e-4);
        assert!(velocities[0].x >= 0.0);
    }

    #[test]
    fn coincident_points_are_skipped() {
        let mut positions = vec![Vec2::ONE; 3];
        let mut velocities = vec![Vec2::ZERO; 3];
        assert_eq!(
            apply_neighbor_distance(&mut positions, &mut velocities, 1.0, 10.0),
            0
        );
        assert!(positions.iter().all(|p| *p == Vec2::ONE));
    }

    #[test]
    fn smoothing_moves_toward_neighbor_average() {
        let mut positions = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(10.0, -10.0),
        ];
        let mut scratch = Vec::new();
        smooth_ring(&mut positions, &mut scratch);
        // neighbors of point 1 average to (10, 0)
        assert!((positions[1] - Vec2::new(10.0, 8.5)).length() < 1e-5);
    }
}
