//! Configuration constants and parameter structs for the Blob Dynamics engine.
//!
//! Every struct here is immutable for the duration of a tick. Hosts replace
//! them between ticks through the `BlobWorld` setters.

use serde::{Deserialize, Serialize};

use crate::error::{BlobError, Result};

/// Nominal blob radius in pixels.
pub const DEFAULT_RADIUS: f32 = 250.0;

/// Number of control points on the ring.
pub const DEFAULT_POINT_COUNT: usize = 24;

/// Border width plus glow radius kept clear of the widget edges.
pub const DEFAULT_PADDING: f32 = 16.0;

/// Default widget size used until the host reports a real one.
pub const DEFAULT_WIDTH: f32 = 800.0;
pub const DEFAULT_HEIGHT: f32 = 600.0;

/// Simulation tick budget (~120 Hz).
pub const DEFAULT_TICK_INTERVAL_US: u64 = 8_333;

/// Duration of the Moving/Resizing → Idle blend.
pub const DEFAULT_IDLE_BLEND_MS: u64 = 700;

/// Time without movement or resize activity before Idle is requested.
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 2_000;

/// Window after a resize event during which Moving requests are suppressed.
pub const DEFAULT_RESIZE_COOLDOWN_MS: u64 = 400;

/// Quiet time after the last accepted resize before the ring is regenerated.
pub const DEFAULT_RESIZE_SETTLE_MS: u64 = 50;

/// Capacity of the host-window movement sample ring buffer.
pub const MOVEMENT_BUFFER_CAPACITY: usize = 10;

/// Smallest ring the solver can work with.
pub const MIN_POINT_COUNT: usize = 3;

/// Geometry of the blob and of the widget hosting it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlobParameters {
    pub radius: f32,
    pub point_count: usize,
    pub padding: f32,
    pub width: f32,
    pub height: f32,
    /// Seed for shape generation, stabilizer offsets and repairs.
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for BlobParameters {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            point_count: DEFAULT_POINT_COUNT,
            padding: DEFAULT_PADDING,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
        }
    }
}

impl BlobParameters {
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.point_count < MIN_POINT_COUNT {
            return Err(BlobError::InsufficientPoints {
                count: self.point_count,
            });
        }
        positive("radius", self.radius)?;
        non_negative("padding", self.padding)?;
        positive("width", self.width)?;
        positive("height", self.height)?;
        check_padded_extent("width", self.width, self.padding)?;
        check_padded_extent("height", self.height, self.padding)?;
        Ok(())
    }
}

/// Coefficients of the per-point integrator and the constraint passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParameters {
    /// Pull of each point toward its target.
    pub viscosity: f32,
    /// Per-tick velocity multiplier.
    pub damping: f32,
    /// Speeds below this are snapped to zero.
    pub velocity_threshold: f32,
    /// Speed clamp as a fraction of the nominal radius.
    pub max_speed_factor: f32,
    /// Bounciness of border collisions.
    pub restitution: f32,
    /// Easing rate toward the ideal ring while motionless.
    pub stabilization_rate: f32,
    pub min_neighbor_distance_factor: f32,
    pub max_neighbor_distance_factor: f32,
}

impl Default for PhysicsParameters {
    fn default() -> Self {
        Self {
            viscosity: 0.015,
            damping: 0.91,
            velocity_threshold: 0.1,
            max_speed_factor: 0.05,
            restitution: 0.2,
            stabilization_rate: 0.001,
            min_neighbor_distance_factor: 0.1,
            max_neighbor_distance_factor: 0.6,
        }
    }
}

impl PhysicsParameters {
    pub fn with_viscosity(mut self, viscosity: f32) -> Self {
        self.viscosity = viscosity;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_stabilization_rate(mut self, rate: f32) -> Self {
        self.stabilization_rate = rate;
        self
    }

    /// Minimum ring-neighbor distance in pixels for a blob of `radius`.
    pub fn min_neighbor_distance(&self, radius: f32) -> f32 {
        radius * self.min_neighbor_distance_factor
    }

    /// Maximum ring-neighbor distance in pixels for a blob of `radius`.
    pub fn max_neighbor_distance(&self, radius: f32) -> f32 {
        radius * self.max_neighbor_distance_factor
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("viscosity", self.viscosity)?;
        unit_interval("damping", self.damping)?;
        non_negative("velocity_threshold", self.velocity_threshold)?;
        positive("max_speed_factor", self.max_speed_factor)?;
        unit_interval("restitution", self.restitution)?;
        unit_interval("stabilization_rate", self.stabilization_rate)?;
        non_negative(
            "min_neighbor_distance_factor",
            self.min_neighbor_distance_factor,
        )?;
        if self.max_neighbor_distance_factor < self.min_neighbor_distance_factor {
            return Err(BlobError::InvalidParameter {
                name: "max_neighbor_distance_factor",
                reason: format!(
                    "{} is below min_neighbor_distance_factor {}",
                    self.max_neighbor_distance_factor, self.min_neighbor_distance_factor
                ),
            });
        }
        Ok(())
    }
}

/// Idle wave configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdleParameters {
    pub wave_amplitude: f32,
    /// Spatial frequency of the primary wave around the ring.
    pub wave_frequency: f32,
    /// Initial phase of the primary wave.
    pub wave_phase: f32,
}

impl Default for IdleParameters {
    fn default() -> Self {
        Self {
            wave_amplitude: 2.0,
            wave_frequency: 2.0,
            wave_phase: 0.0,
        }
    }
}

impl IdleParameters {
    pub fn validate(&self) -> Result<()> {
        non_negative("wave_amplitude", self.wave_amplitude)?;
        finite("wave_frequency", self.wave_frequency)?;
        finite("wave_phase", self.wave_phase)
    }
}

/// Tuning of the host-window movement tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParameters {
    /// Smoothed speed above which movement is significant.
    pub significant_speed: f32,
    /// Weight kept from the previous smoothed estimate.
    pub smoothing: f32,
    /// Extra damping applied before the inertia force.
    pub inertia_scale: f32,
    /// Interval velocities are normalized to.
    pub reference_interval_ms: u64,
    /// Quiet ticks before movement counts as stopped.
    pub stop_after_ticks: u32,
    /// Inactivity is not counted while the last sample is this recent.
    pub sample_grace_ms: u64,
    /// The buffer is trimmed to its last sample after this long without samples.
    pub stale_buffer_ms: u64,
    /// Window speeds are saturated at this magnitude.
    pub speed_ceiling: f32,
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            significant_speed: 0.3,
            smoothing: 0.7,
            inertia_scale: 0.6,
            reference_interval_ms: 700,
            stop_after_ticks: 60,
            sample_grace_ms: 200,
            stale_buffer_ms: 500,
            speed_ceiling: 3_000.0,
        }
    }
}

impl MotionParameters {
    pub fn validate(&self) -> Result<()> {
        non_negative("significant_speed", self.significant_speed)?;
        unit_interval("smoothing", self.smoothing)?;
        non_negative("inertia_scale", self.inertia_scale)?;
        positive("speed_ceiling", self.speed_ceiling)?;
        if self.reference_interval_ms == 0 {
            return Err(BlobError::InvalidParameter {
                name: "reference_interval_ms",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Cadences and timeouts of the state machine and scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingParameters {
    pub tick_interval_us: u64,
    pub idle_blend_ms: u64,
    pub inactivity_timeout_ms: u64,
    pub resize_cooldown_ms: u64,
    /// Quiet time after a resize before the ring is rebuilt at the widget center.
    pub resize_settle_ms: u64,
    /// Resize events changing no dimension by more than this are ignored.
    pub min_resize_delta: f32,
}

impl Default for TimingParameters {
    fn default() -> Self {
        Self {
            tick_interval_us: DEFAULT_TICK_INTERVAL_US,
            idle_blend_ms: DEFAULT_IDLE_BLEND_MS,
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            resize_cooldown_ms: DEFAULT_RESIZE_COOLDOWN_MS,
            resize_settle_ms: DEFAULT_RESIZE_SETTLE_MS,
            min_resize_delta: 3.0,
        }
    }
}

impl TimingParameters {
    pub fn with_tick_interval_us(mut self, interval: u64) -> Self {
        self.tick_interval_us = interval;
        self
    }

    pub fn with_idle_blend_ms(mut self, duration: u64) -> Self {
        self.idle_blend_ms = duration;
        self
    }

    pub fn with_resize_settle_ms(mut self, duration: u64) -> Self {
        self.resize_settle_ms = duration;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_us == 0 {
            return Err(BlobError::InvalidParameter {
                name: "tick_interval_us",
                reason: "must be non-zero".to_string(),
            });
        }
        if self.idle_blend_ms == 0 {
            return Err(BlobError::InvalidParameter {
                name: "idle_blend_ms",
                reason: "must be non-zero".to_string(),
            });
        }
        non_negative("min_resize_delta", self.min_resize_delta)
    }
}

/// Complete configuration bundle handed to [`crate::world::BlobWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BlobConfig {
    pub blob: BlobParameters,
    pub physics: PhysicsParameters,
    pub idle: IdleParameters,
    pub motion: MotionParameters,
    pub timing: TimingParameters,
}

impl BlobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(mut self, blob: BlobParameters) -> Self {
        self.blob = blob;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsParameters) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_idle(mut self, idle: IdleParameters) -> Self {
        self.idle = idle;
        self
    }

    pub fn with_motion(mut self, motion: MotionParameters) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_timing(mut self, timing: TimingParameters) -> Self {
        self.timing = timing;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.blob.validate()?;
        self.physics.validate()?;
        self.idle.validate()?;
        self.motion.validate()?;
        self.timing.validate()
    }
}

fn finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BlobError::InvalidParameter {
            name,
            reason: format!("{value} is not finite"),
        })
    }
}

fn positive(name: &'static str, value: f32) -> Result<()> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(BlobError::InvalidParameter {
            name,
            reason: format!("{value} must be positive"),
        })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(BlobError::InvalidParameter {
            name,
            reason: format!("{value} must not be negative"),
        })
    }
}

/// Fails unless `extent` leaves room inside the padding on both sides.
pub fn check_padded_extent(name: &'static str, extent: f32, padding: f32) -> Result<()> {
    if extent > 2.0 * padding {
        Ok(())
    } else {
        Err(BlobError::InvalidParameter {
            name,
            reason: format!("{extent} leaves no room inside padding {padding}"),
        })
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<()> {
    non_negative(name, value)?;
    if value <= 1.0 {
        Ok(())
    } else {
        Err(BlobError::InvalidParameter {
            name,
            reason: format!("{value} must be within [0, 1]"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(BlobConfig::default().validate().is_ok());
    }

    #[test]
    fn tiny_rings_are_rejected() {
        let blob = BlobParameters::default().with_point_count(2);
        assert!(matches!(
            blob.validate(),
            Err(BlobError::InsufficientPoints { count: 2 })
        ));
    }

    #[test]
    fn inverted_neighbor_band_is_rejected() {
        let mut physics = PhysicsParameters::default();
        physics.max_neighbor_distance_factor = 0.05;
        assert!(matches!(
            physics.validate(),
            Err(BlobError::InvalidParameter {
                name: "max_neighbor_distance_factor",
                ..
            })
        ));
    }

    #[test]
    fn neighbor_band_scales_with_radius() {
        let physics = PhysicsParameters::default();
        assert!((physics.min_neighbor_distance(250.0) - 25.0).abs() < 1e-4);
        assert!((physics.max_neighbor_distance(250.0) - 150.0).abs() < 1e-4);
    }

    #[test]
    fn widget_must_fit_its_padding() {
        let blob = BlobParameters::default().with_padding(16.0).with_size(32.0, 600.0);
        assert!(matches!(
            blob.validate(),
            Err(BlobError::InvalidParameter { name: "width", .. })
        ));
        assert!(check_padded_extent("height", 33.0, 16.0).is_ok());
    }
}
