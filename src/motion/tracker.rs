use std::collections::VecDeque;

use glam::Vec2;
use log::{debug, trace};

use crate::config::{MotionParameters, MOVEMENT_BUFFER_CAPACITY};
use crate::core::types::MovementSample;

/// Smoothed speeds below this are flushed to zero so the next movement
/// starts from a fresh estimate.
const REST_SPEED: f32 = 1e-4;

/// Outcome of one [`MovementTracker::process`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerUpdate {
    /// Nothing to report.
    Quiet,
    /// The smoothed window velocity exceeds the significance threshold.
    Significant {
        /// Smoothed window velocity, in pixels per reference interval.
        velocity: Vec2,
        /// Damped velocity to feed into the inertia force.
        inertia: Vec2,
        /// Whether the tracker was at rest before this update.
        started: bool,
    },
    /// The window has been still for long enough after moving.
    Stopped,
}

/// Bounded buffer of host-window positions with velocity estimation and
/// start/stop detection.
#[derive(Debug, Clone)]
pub struct MovementTracker {
    pub params: MotionParameters,
    samples: VecDeque<MovementSample>,
    smoothed: Vec2,
    moving: bool,
    inactivity_ticks: u32,
    last_sample_ms: Option<u64>,
    paused: bool,
}

impl MovementTracker {
    pub fn new(params: MotionParameters) -> Self {
        Self {
            params,
            samples: VecDeque::with_capacity(MOVEMENT_BUFFER_CAPACITY),
            smoothed: Vec2::ZERO,
            moving: false,
            inactivity_ticks: 0,
            last_sample_ms: None,
            paused: false,
        }
    }

    /// Appends a sample, evicting the oldest one when full. Samples that are
    /// not newer than the last accepted one are dropped, as is everything
    /// while paused. Returns whether the sample was kept.
    pub fn push_sample(&mut self, sample: MovementSample) -> bool {
        if self.paused {
            return false;
        }
        if self
            .last_sample_ms
            .is_some_and(|last| sample.timestamp_ms <= last)
        {
            trace!("dropping out-of-order movement sample at {} ms", sample.timestamp_ms);
            return false;
        }

        if self.samples.len() == MOVEMENT_BUFFER_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        self.last_sample_ms = Some(sample.timestamp_ms);
        true
    }

    pub fn samples(&self) -> impl Iterator<Item = &MovementSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn smoothed_velocity(&self) -> Vec2 {
        self.smoothed
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn inactivity_ticks(&self) -> u32 {
        self.inactivity_ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Paused trackers drop incoming samples and forget the current estimate.
    pub fn set_paused(&mut self, paused: bool) {
        if paused {
            self.clear();
        }
        self.paused = paused;
    }

    /// Forgets samples, the smoothed estimate and the moving flag.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.smoothed = Vec2::ZERO;
        self.moving = false;
        self.inactivity_ticks = 0;
    }

    /// Weighted average of the consecutive-sample velocities in the buffer,
    /// normalized to the reference interval. Later pairs weigh more, ramping
    /// linearly from 0.5 to 1.0. Fewer than two samples estimate zero.
    pub fn estimate_velocity(&self) -> Vec2 {
        let len = self.samples.len();
        if len < 2 {
            return Vec2::ZERO;
        }

        let reference = self.params.reference_interval_ms as f32;
        let mut total = Vec2::ZERO;
        let mut total_weight = 0.0;
        for i in 1..len {
            let previous = &self.samples[i - 1];
            let current = &self.samples[i];
            let dt = current.timestamp_ms.saturating_sub(previous.timestamp_ms);
            if dt == 0 {
                continue;
            }
            let velocity = (current.position - previous.position) * (reference / dt as f32);
            let weight = 0.5 + 0.5 * (i as f32 / (len - 1) as f32);
            total += velocity * weight;
            total_weight += weight;
        }

        if total_weight > 0.0 {
            total / total_weight
        } else {
            Vec2::ZERO
        }
    }

    /// Updates the smoothed estimate and reports movement start/stop.
    pub fn process(&mut self, now_ms: u64) -> TrackerUpdate {
        if self.paused {
            return TrackerUpdate::Quiet;
        }

        let estimate = self.estimate_velocity();
        self.smoothed = if self.smoothed != Vec2::ZERO {
            self.smoothed * self.params.smoothing + estimate * (1.0 - self.params.smoothing)
        } else {
            estimate
        };
        if self.smoothed.length() < REST_SPEED {
            self.smoothed = Vec2::ZERO;
        }

        let speed = self.smoothed.length();
        let since_sample = self.last_sample_ms.map(|last| now_ms.saturating_sub(last));

        let update = if speed > self.params.significant_speed {
            let started = !self.moving;
            if started {
                debug!("window movement detected at {speed:.1} px/interval");
            }
            self.moving = true;
            self.inactivity_ticks = 0;
            TrackerUpdate::Significant {
                velocity: self.smoothed,
                inertia: self.smoothed * self.params.inertia_scale,
                started,
            }
        } else if since_sample.is_some_and(|elapsed| elapsed < self.params.sample_grace_ms) {
            TrackerUpdate::Quiet
        } else if self.moving {
            self.inactivity_ticks += 1;
            if self.inactivity_ticks > self.params.stop_after_ticks {
                debug!("window movement stopped");
                self.moving = false;
                self.inactivity_ticks = 0;
                TrackerUpdate::Stopped
            } else {
                TrackerUpdate::Quiet
            }
        } else {
            TrackerUpdate::Quiet
        };

        if self.samples.len() > 1 && since_sample.is_some_and(|elapsed| elapsed > self.params.stale_buffer_ms) {
            if let Some(last) = self.samples.back().copied() {
                self.samples.clear();
                self.samples.push_back(last);
            }
        }

        update
    }
}

impl Default for MovementTracker {
    fn default() -> Self {
        Self::new(MotionParameters::default())
    }
}
