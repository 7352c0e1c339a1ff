use glam::Vec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsParameters;
use crate::core::{shape::ShapeState, soa::PointsSoA};
use crate::dynamics::parallel;

/// Rings with at least this many points use the batched strategy.
pub const BATCHED_MIN_POINTS: usize = 24;

/// Rings with more than this many points use the structure-of-arrays strategy.
pub const SOA_MAX_BATCHED_POINTS: usize = 64;

/// Points farther than this multiple of the radius are pulled back to the center.
const RECENTER_RADIUS_FACTOR: f32 = 1.1;
const RECENTER_GAIN: f32 = 0.03;

/// Weight of the freshly integrated velocity against last tick's output.
const FRESH_VELOCITY_WEIGHT: f32 = 0.8;

/// Execution strategy of one integration pass. All strategies evaluate the
/// same per-point formula and differ only in how the work is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegrationStrategy {
    Sequential,
    /// Contiguous chunks processed on the rayon pool.
    Batched,
    /// Points scattered into [`PointsSoA`] lanes and processed in blocks.
    StructureOfArrays,
}

/// Picks the execution strategy for a ring of `point_count` points.
pub fn select_strategy(point_count: usize) -> IntegrationStrategy {
    if point_count > SOA_MAX_BATCHED_POINTS {
        IntegrationStrategy::StructureOfArrays
    } else if point_count >= BATCHED_MIN_POINTS {
        IntegrationStrategy::Batched
    } else {
        IntegrationStrategy::Sequential
    }
}

/// Result of integrating a single control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStep {
    pub position: Vec2,
    pub velocity: Vec2,
    pub moving: bool,
}

/// Per-tick constants of the point formula, shared read-only by every worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointKernel {
    pub center: Vec2,
    pub viscosity: f32,
    pub damping: f32,
    pub threshold_sq: f32,
    pub max_speed: f32,
    pub recenter_distance_sq: f32,
}

impl PointKernel {
    pub fn new(params: &PhysicsParameters, center: Vec2, radius: f32) -> Self {
        let recenter_distance = radius * RECENTER_RADIUS_FACTOR;
        Self {
            center,
            viscosity: params.viscosity,
            damping: params.damping,
            threshold_sq: params.velocity_threshold * params.velocity_threshold,
            max_speed: radius * params.max_speed_factor,
            recenter_distance_sq: recenter_distance * recenter_distance,
        }
    }

    /// Advances one point by a tick.
    ///
    /// `previous` is the velocity this point left the previous tick with.
    #[inline]
    pub fn integrate(&self, position: Vec2, velocity: Vec2, target: Vec2, previous: Vec2) -> PointStep {
        let mut force = (target - position) * self.viscosity;

        let to_center = self.center - position;
        let distance_sq = to_center.length_squared();
        if distance_sq > self.recenter_distance_sq {
            force += to_center * (RECENTER_GAIN / distance_sq.sqrt());
        }

        let mut velocity = velocity + force;
        velocity = velocity * FRESH_VELOCITY_WEIGHT + previous * (1.0 - FRESH_VELOCITY_WEIGHT);
        velocity *= self.damping;

        let speed_sq = velocity.length_squared();
        // a NaN speed stays "moving" so it reaches the validator intact
        let moving = !(speed_sq < self.threshold_sq);
        if !moving {
            velocity = Vec2::ZERO;
        } else if speed_sq > self.max_speed * self.max_speed {
            velocity *= self.max_speed / speed_sq.sqrt();
        }

        PointStep {
            position: position + velocity,
            velocity,
            moving,
        }
    }
}

/// Integrates parallel slices in place. Returns whether any point is in motion.
pub fn integrate_slice(
    kernel: &PointKernel,
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
    targets: &[Vec2],
    history: &[Vec2],
) -> bool {
    let mut moving = false;
    for (((position, velocity), target), previous) in positions
        .iter_mut()
        .zip(velocities.iter_mut())
        .zip(targets)
        .zip(history)
    {
        let step = kernel.integrate(*position, *velocity, *target, *previous);
        *position = step.position;
        *velocity = step.velocity;
        moving |= step.moving;
    }
    moving
}

/// Force integrator for the control-point ring.
///
/// Owns one tick of velocity history for temporal smoothing and the SoA
/// scratch buffers, so separate instances never share state.
#[derive(Debug, Clone)]
pub struct Integrator {
    pub params: PhysicsParameters,
    pinned: Option<IntegrationStrategy>,
    last_strategy: Option<IntegrationStrategy>,
    history: Vec<Vec2>,
    scratch: PointsSoA,
}

impl Integrator {
    pub fn new(params: PhysicsParameters) -> Self {
        Self {
            params,
            pinned: None,
            last_strategy: None,
            history: Vec::new(),
            scratch: PointsSoA::new(),
        }
    }

    /// Forces every tick onto `strategy` regardless of the point count.
    pub fn with_strategy(mut self, strategy: IntegrationStrategy) -> Self {
        self.pinned = Some(strategy);
        self
    }

    /// Pins a strategy, or returns to count-based selection with `None`.
    pub fn set_strategy(&mut self, strategy: Option<IntegrationStrategy>) {
        self.pinned = strategy;
    }

    pub fn strategy_for(&self, point_count: usize) -> IntegrationStrategy {
        self.pinned.unwrap_or_else(|| select_strategy(point_count))
    }

    /// Strategy used by the most recent [`Integrator::step`].
    pub fn last_strategy(&self) -> Option<IntegrationStrategy> {
        self.last_strategy
    }

    pub fn history(&self) -> &[Vec2] {
        &self.history
    }

    /// Forgets the velocity history; the next step reseeds it from the shape.
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Integrates every point of `shape` once. Returns `true` when at least
    /// one point is still in motion afterwards.
    pub fn step(&mut self, shape: &mut ShapeState) -> bool {
        let count = shape.len();
        if self.history.len() != count {
            self.history.clear();
            self.history.extend_from_slice(&shape.velocities);
        }

        let strategy = self.strategy_for(count);
        if self.last_strategy != Some(strategy) {
            debug!("integrator using {strategy:?} strategy for {count} points");
        }

        let kernel = PointKernel::new(&self.params, shape.center, shape.radius);
        let moving = match strategy {
            IntegrationStrategy::Sequential => integrate_slice(
                &kernel,
                &mut shape.positions,
                &mut shape.velocities,
                &shape.targets,
                &self.history,
            ),
            IntegrationStrategy::Batched => {
                parallel::integrate_batched(&kernel, shape, &self.history)
            }
            IntegrationStrategy::StructureOfArrays => {
                parallel::integrate_soa(&kernel, shape, &self.history, &mut self.scratch)
            }
        };

        self.history.copy_from_slice(&shape.velocities);
        self.last_strategy = Some(strategy);
        moving
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(PhysicsParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_thresholds() {
        assert_eq!(select_strategy(3), IntegrationStrategy::Sequential);
        assert_eq!(select_strategy(23), IntegrationStrategy::Sequential);
        assert_eq!(select_strategy(24), IntegrationStrategy::Batched);
        assert_eq!(select_strategy(64), IntegrationStrategy::Batched);
        assert_eq!(select_strategy(65), IntegrationStrategy::StructureOfArrays);
    }

    #[test]
    fn slow_points_are_snapped_to_rest() {
        let kernel = PointKernel::new(&PhysicsParameters::default(), Vec2::ZERO, 100.0);
        let p = Vec2::new(100.0, 0.0);
        let step = kernel.integrate(p, Vec2::new(0.05, 0.0), p, Vec2::ZERO);
        assert!(!step.moving);
        assert_eq!(step.velocity, Vec2::ZERO);
        assert_eq!(step.position, p);
    }

    #[test]
    fn speed_is_clamped_to_radius_fraction() {
        let kernel = PointKernel::new(&PhysicsParameters::default(), Vec2::ZERO, 100.0);
        let p = Vec2::new(50.0, 0.0);
        let step = kernel.integrate(p, Vec2::new(40.0, 0.0), p, Vec2::new(40.0, 0.0));
        assert!(step.moving);
        assert!((step.velocity.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn distant_points_are_pulled_back() {
        let kernel = PointKernel::new(&PhysicsParameters::default(), Vec2::ZERO, 100.0);
        let p = Vec2::new(200.0, 0.0);
        let step = kernel.integrate(p, Vec2::new(0.0, 0.0), p, Vec2::new(-1.0, 0.0));
        assert!(step.velocity.x < 0.0);
    }

    #[test]
    fn history_follows_previous_output() {
        let mut shape = ShapeState::circle(Vec2::ZERO, 100.0, 8);
        shape.velocities[0] = Vec2::new(2.0, 0.0);
        let mut integrator = Integrator::default();
        integrator.step(&mut shape);
        assert_eq!(integrator.history(), shape.velocities.as_slice());

        integrator.reset_history();
        assert!(integrator.history().is_empty());
    }
}
