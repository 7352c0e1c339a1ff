use glam::Vec2;

use crate::animation::BlobState;
use crate::config::MotionParameters;
use crate::core::{
    shape::ShapeState,
    types::{AnimationMode, Bounds},
};

/// Mean point speed below which the ring is not deformed.
const MIN_MEAN_SPEED: f32 = 0.1;
const STRETCH_GAIN: f32 = 0.05 * 0.015;
const SQUEEZE_GAIN: f32 = 0.0003;

/// Window speeds below this produce no inertia.
const MIN_WINDOW_SPEED: f32 = 0.1;
const INERTIA_GAIN: f32 = 0.0025;
const CENTER_DRIFT_GAIN: f32 = 0.0003;
/// Window speed at which the center drift saturates.
const CENTER_DRIFT_SPEED: f32 = 5.0;
const SWIRL_SPEED: f32 = 5.0;
const SWIRL_GAIN: f32 = 0.00002;

/// Reaction to host-window drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingState {
    /// Window speeds are saturated at this magnitude.
    pub speed_ceiling: f32,
}

impl MovingState {
    pub fn new(motion: &MotionParameters) -> Self {
        Self {
            speed_ceiling: motion.speed_ceiling,
        }
    }

    /// Converts a window drag velocity into an opposing, distance-weighted
    /// body force plus a small drift of the center.
    pub fn apply_inertia_force(&self, shape: &mut ShapeState, window_velocity: Vec2) {
        let window_velocity = window_velocity.clamp_length_max(self.speed_ceiling);
        let speed = window_velocity.length();
        if !(speed >= MIN_WINDOW_SPEED) {
            return;
        }

        let force = -window_velocity * (INERTIA_GAIN * (speed / 10.0).min(1.0));
        let center = shape.center;
        let inverse_radius = 1.0 / shape.radius;
        for (position, velocity) in shape.positions.iter().zip(shape.velocities.iter_mut()) {
            let offset = *position - center;
            let scale = (offset.length() * inverse_radius * 0.2).min(0.3);
            *velocity += force * scale;
        }

        shape.center += -window_velocity * (CENTER_DRIFT_GAIN * (speed / CENTER_DRIFT_SPEED).min(1.0));

        if speed > SWIRL_SPEED {
            let across = force.perp();
            let axis = across.normalize_or_zero();
            for (position, velocity) in shape.positions.iter().zip(shape.velocities.iter_mut()) {
                let lever = (*position - center).dot(across);
                *velocity += axis * (lever * SWIRL_GAIN);
            }
        }
    }
}

impl Default for MovingState {
    fn default() -> Self {
        Self::new(&MotionParameters::default())
    }
}

impl BlobState for MovingState {
    fn mode(&self) -> AnimationMode {
        AnimationMode::Moving
    }

    /// Stretches the ring along the mean point velocity and squeezes it
    /// across, both weighted by `(d / r)²`.
    fn apply(&mut self, shape: &mut ShapeState, _bounds: Bounds) {
        let mean = shape.mean_velocity();
        let mean_speed = mean.length();
        if mean_speed <= MIN_MEAN_SPEED {
            return;
        }

        let across = (mean / mean_speed).perp();
        let center = shape.center;
        let radius = shape.radius;
        for (position, velocity) in shape.positions.iter().zip(shape.velocities.iter_mut()) {
            let offset = *position - center;
            let ratio = offset.length() / radius;
            let factor = ratio * ratio;

            *velocity += mean * (factor * STRETCH_GAIN);
            let side = offset.dot(across) / radius;
            *velocity -= across * (side * factor * mean_speed * SQUEEZE_GAIN);
        }
    }
}
