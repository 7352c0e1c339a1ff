use glam::Vec2;
use log::debug;

use crate::animation::{idle::IdleState, BlobState};
use crate::core::{shape::ShapeState, types::Bounds};

/// Share of progress spent accelerating, and again decelerating.
const EASE_EDGE: f32 = 0.3;
/// Maximum share of the idle effect mixed in while blending.
const IDLE_SHARE: f32 = 0.4;
const VELOCITY_DAMPING_BASE: f32 = 0.98;
/// Velocity multiplier applied once the blend lands.
const LANDING_DAMPING: f32 = 0.7;

/// Ease-in-out with constant acceleration over the first 30% of progress,
/// constant speed in the middle and constant deceleration over the last 30%.
/// The curve and its slope are continuous.
pub fn ease_in_out(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    // 2 * edge * (1 - edge) normalizes the area under the speed profile to one
    let norm = 2.0 * EASE_EDGE * (1.0 - EASE_EDGE);
    if p < EASE_EDGE {
        p * p / norm
    } else if p <= 1.0 - EASE_EDGE {
        EASE_EDGE * EASE_EDGE / norm + (p - EASE_EDGE) / (1.0 - EASE_EDGE)
    } else {
        let q = 1.0 - p;
        1.0 - q * q / norm
    }
}

/// Eased transition from a Moving/Resizing shape back to the Idle rest shape.
///
/// Exists only while the Idle request is pending; the machine drops it once
/// [`IdleTransitionBlend::step`] reports completion.
#[derive(Debug, Clone)]
pub struct IdleTransitionBlend {
    pub origin_positions: Vec<Vec2>,
    pub origin_center: Vec2,
    pub target_positions: Vec<Vec2>,
    pub target_center: Vec2,
    pub start_ms: u64,
    pub duration_ms: u64,
    scratch: Option<ShapeState>,
}

impl IdleTransitionBlend {
    /// Snapshots `shape` and computes the Idle target: the current outline
    /// scaled back to the nominal radius and recentered on `widget_center`.
    pub fn new(shape: &ShapeState, widget_center: Vec2, start_ms: u64, duration_ms: u64) -> Self {
        let ratio = shape.mean_radius() / shape.radius;
        let scale = if ratio > 0.1 { 1.0 / ratio } else { 1.0 };
        let target_positions = shape
            .positions
            .iter()
            .map(|p| widget_center + (*p - shape.center) * scale)
            .collect();

        debug!(
            "idle blend started: {duration_ms} ms, radius ratio {ratio:.3}, center {} -> {}",
            shape.center, widget_center
        );

        Self {
            origin_positions: shape.positions.clone(),
            origin_center: shape.center,
            target_positions,
            target_center: widget_center,
            start_ms,
            duration_ms: duration_ms.max(1),
            scratch: None,
        }
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        (elapsed as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn is_complete(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }

    /// Advances the blend to `now_ms`. Returns `true` on the tick it lands,
    /// after snapping the shape onto the target.
    pub fn step(&mut self, shape: &mut ShapeState, idle: &mut IdleState, bounds: Bounds, now_ms: u64) -> bool {
        if self.is_complete(now_ms) {
            shape
                .positions
                .iter_mut()
                .zip(&self.target_positions)
                .for_each(|(p, t)| *p = *t);
            shape.center = self.target_center;
            for velocity in &mut shape.velocities {
                *velocity *= LANDING_DAMPING;
            }
            debug!("idle blend completed");
            return true;
        }

        let eased = ease_in_out(self.progress(now_ms));
        for ((position, origin), target) in shape
            .positions
            .iter_mut()
            .zip(&self.origin_positions)
            .zip(&self.target_positions)
        {
            *position = origin.lerp(*target, eased);
        }
        shape.center = self.origin_center.lerp(self.target_center, eased);

        let damping = VELOCITY_DAMPING_BASE.powf(1.0 + 3.0 * eased);
        for velocity in &mut shape.velocities {
            *velocity *= damping;
        }

        // Run idle on a copy so its phases advance while only a share of its
        // effect reaches the real shape.
        let scratch = self.scratch.get_or_insert_with(|| shape.clone());
        scratch.clone_from(shape);
        idle.apply(scratch, bounds);

        let share = eased * IDLE_SHARE;
        for (velocity, idle_velocity) in shape.velocities.iter_mut().zip(&scratch.velocities) {
            *velocity += (*idle_velocity - *velocity) * share;
        }
        shape.center += (scratch.center - shape.center) * share;
        false
    }
}
