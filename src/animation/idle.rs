use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::Vec2;

use crate::animation::BlobState;
use crate::config::IdleParameters;
use crate::core::{
    shape::ShapeState,
    types::{AnimationMode, Bounds},
};
use crate::utils::math::{centroid, wrap_phase};

/// Pulse cycles played after every shape regeneration.
pub const HEARTBEAT_CYCLES: u32 = 1;

const PRIMARY_PHASE_STEP: f32 = 0.01;
const SECONDARY_PHASE_STEP: f32 = 0.015;
const ROTATION_PHASE_STEP: f32 = 0.003;
const HEARTBEAT_PHASE_STEP: f32 = 0.02;

const DISPLACEMENT_GAIN: f32 = 0.15;
const HOMING_RATE: f32 = 0.01;

/// Pulse strength of the heartbeat at `phase` in `[0, 2π)`.
///
/// Four segments: a fast contraction, a short pause, a slow release and a
/// long pause before the next beat.
pub fn heartbeat_envelope(phase: f32) -> f32 {
    if phase < FRAC_PI_4 {
        0.5 * (phase * 4.0).sin()
    } else if phase < FRAC_PI_2 {
        0.3 * (phase * 4.0).sin()
    } else if phase < 3.0 * FRAC_PI_4 {
        0.4 * ((phase - FRAC_PI_2) * 0.8).sin()
    } else {
        0.5 * (phase * 1.2).sin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Heartbeat {
    phase: f32,
    completed: u32,
    active: bool,
}

impl Heartbeat {
    fn armed() -> Self {
        Self {
            phase: 0.0,
            completed: 0,
            active: true,
        }
    }

    /// Advances one tick and returns the pulse, or `None` on the tick the
    /// warm-up finishes.
    fn advance(&mut self) -> Option<f32> {
        self.phase += HEARTBEAT_PHASE_STEP;
        if self.phase >= TAU {
            self.phase -= TAU;
            self.completed += 1;
            if self.completed >= HEARTBEAT_CYCLES {
                self.active = false;
                return None;
            }
        }
        Some(heartbeat_envelope(self.phase))
    }
}

/// Organic wave motion while the host window is still.
#[derive(Debug, Clone)]
pub struct IdleState {
    pub params: IdleParameters,
    primary_phase: f32,
    secondary_phase: f32,
    rotation_phase: f32,
    heartbeat: Heartbeat,
    deltas: Vec<Vec2>,
}

impl IdleState {
    pub fn new(params: IdleParameters) -> Self {
        Self {
            primary_phase: wrap_phase(params.wave_phase),
            params,
            secondary_phase: 0.0,
            rotation_phase: 0.0,
            heartbeat: Heartbeat::armed(),
            deltas: Vec::new(),
        }
    }

    /// Replays the heartbeat warm-up on the next activations.
    pub fn rearm_heartbeat(&mut self) {
        self.heartbeat = Heartbeat::armed();
    }

    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat.active
    }

    /// Primary, secondary and rotation phases.
    pub fn phases(&self) -> (f32, f32, f32) {
        (self.primary_phase, self.secondary_phase, self.rotation_phase)
    }

    fn advance_phases(&mut self) {
        self.primary_phase = wrap_phase(self.primary_phase + PRIMARY_PHASE_STEP);
        self.secondary_phase = wrap_phase(self.secondary_phase + SECONDARY_PHASE_STEP);
        self.rotation_phase = wrap_phase(self.rotation_phase + ROTATION_PHASE_STEP);
    }

    fn apply_heartbeat(shape: &mut ShapeState, pulse: f32) {
        let center = shape.center;
        let radius = shape.radius;
        for (position, velocity) in shape.positions.iter().zip(shape.velocities.iter_mut()) {
            let offset = *position - center;
            let push = pulse * (offset.length() / radius) * 0.5;
            *velocity += offset.normalize_or_zero() * push;
        }
    }

    fn apply_waves(&mut self, shape: &mut ShapeState) {
        self.advance_phases();

        let amplitude = self.params.wave_amplitude;
        let frequency = self.params.wave_frequency;
        let rotation_strength = 0.15 * (self.rotation_phase * 0.3).sin();

        self.deltas.clear();
        for position in &shape.positions {
            let offset = *position - shape.center;
            let distance = offset.length();
            let normal = offset.normalize_or_zero();
            let angle = offset.y.atan2(offset.x);
            let weight = distance / shape.radius;

            let wave = amplitude * 0.9 * (self.primary_phase + frequency * angle).sin()
                + amplitude * 0.5 * (self.secondary_phase + frequency * 2.0 * angle).sin();
            let force = normal * wave + normal.perp() * (rotation_strength * weight);
            let scale = (0.2 + 0.8 * weight).min(1.0);
            self.deltas.push(force * scale * DISPLACEMENT_GAIN);
        }

        let mean = centroid(&self.deltas);
        for (velocity, delta) in shape.velocities.iter_mut().zip(&self.deltas) {
            *velocity += *delta - mean;
        }
    }
}

impl Default for IdleState {
    fn default() -> Self {
        Self::new(IdleParameters::default())
    }
}

impl BlobState for IdleState {
    fn mode(&self) -> AnimationMode {
        AnimationMode::Idle
    }

    fn apply(&mut self, shape: &mut ShapeState, bounds: Bounds) {
        if self.heartbeat.active {
            if let Some(pulse) = self.heartbeat.advance() {
                Self::apply_heartbeat(shape, pulse);
            }
        } else {
            self.apply_waves(shape);
        }
        shape.center += (bounds.center() - shape.center) * HOMING_RATE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled_idle() -> IdleState {
        let mut idle = IdleState::default();
        idle.heartbeat.active = false;
        idle
    }

    #[test]
    fn envelope_segments() {
        assert!(heartbeat_envelope(FRAC_PI_4 * 0.5) > 0.49);
        assert!(heartbeat_envelope(FRAC_PI_4 * 1.5) < 0.0);
        assert!(heartbeat_envelope(FRAC_PI_2 + 0.1) > 0.0);
    }

    #[test]
    fn heartbeat_runs_one_cycle_then_waves_start() {
        let mut idle = IdleState::default();
        let bounds = Bounds::new(800.0, 600.0);
        let mut shape = ShapeState::circle(bounds.center(), 250.0, 24);

        let ticks = (TAU / HEARTBEAT_PHASE_STEP).ceil() as usize;
        for _ in 0..ticks {
            idle.apply(&mut shape, bounds);
        }
        assert!(!idle.heartbeat_active());
        assert_eq!(idle.phases().1, 0.0);

        idle.apply(&mut shape, bounds);
        assert!(idle.phases().1 > 0.0);
    }

    #[test]
    fn waves_keep_mean_velocity_at_zero() {
        let mut idle = settled_idle();
        let bounds = Bounds::new(800.0, 600.0);
        let mut shape = ShapeState::circle(bounds.center(), 250.0, 24);
        for _ in 0..10 {
            idle.apply(&mut shape, bounds);
        }
        assert!(shape.mean_velocity().length() < 1e-4);
        assert!(shape.velocities.iter().any(|v| v.length() > 1e-3));
    }

    #[test]
    fn center_homes_toward_widget_center() {
        let mut idle = settled_idle();
        let bounds = Bounds::new(800.0, 600.0);
        let mut shape = ShapeState::circle(Vec2::new(300.0, 300.0), 250.0, 24);
        idle.apply(&mut shape, bounds);
        assert!((shape.center.x - 301.0).abs() < 1e-3);
    }

    #[test]
    fn phases_wrap() {
        let mut idle = settled_idle();
        for _ in 0..1000 {
            idle.advance_phases();
        }
        let (a, b, c) = idle.phases();
        assert!((0.0..TAU).contains(&a));
        assert!((0.0..TAU).contains(&b));
        assert!((0.0..TAU).contains(&c));
    }
}
