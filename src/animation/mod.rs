//! Animation states and the state machine switching between them.
//!
//! Each [`AnimationMode`] has one [`BlobState`] implementation. The
//! [`AnimationStateMachine`] owns all three, so per-state accumulators such as
//! the idle wave phases survive mode switches.

pub mod blend;
pub mod idle;
pub mod machine;
pub mod moving;
pub mod resizing;

use glam::Vec2;

use crate::core::{
    shape::ShapeState,
    types::{AnimationMode, Bounds},
};
use crate::utils::math::radial_weight;

pub use blend::{ease_in_out, IdleTransitionBlend};
pub use idle::IdleState;
pub use machine::{AnimationStateMachine, TransitionOutcome};
pub use moving::MovingState;
pub use resizing::ResizingState;

/// Shared capability of the animation states.
pub trait BlobState: Send + Sync {
    fn mode(&self) -> AnimationMode;

    /// Per-tick effect of the state on the ring.
    fn apply(&mut self, shape: &mut ShapeState, bounds: Bounds);

    /// Applies an external body force: points get a distance-weighted share,
    /// the center gets a fifth of it.
    fn apply_force(&mut self, shape: &mut ShapeState, force: Vec2) {
        distance_weighted_impulse(shape, force);
        shape.center += force * CENTER_FORCE_SHARE;
    }
}

const POINT_FORCE_SHARE: f32 = 0.8;
const CENTER_FORCE_SHARE: f32 = 0.2;

/// Adds `force * min(d / r, 1) * 0.8` to every point's velocity.
pub fn distance_weighted_impulse(shape: &mut ShapeState, force: Vec2) {
    let center = shape.center;
    let radius = shape.radius;
    for (position, velocity) in shape.positions.iter().zip(shape.velocities.iter_mut()) {
        let scale = radial_weight(*position, center, radius).min(1.0);
        *velocity += force * (scale * POINT_FORCE_SHARE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_force_split_between_points_and_center() {
        let mut state = MovingState::default();
        let mut shape = ShapeState::circle(Vec2::ZERO, 100.0, 4);
        shape.positions[0] = Vec2::new(50.0, 0.0);

        state.apply_force(&mut shape, Vec2::new(10.0, 0.0));
        assert!((shape.velocities[0].x - 4.0).abs() < 1e-4);
        assert!((shape.velocities[1].x - 8.0).abs() < 1e-4);
        assert!((shape.center.x - 2.0).abs() < 1e-5);
    }
}
