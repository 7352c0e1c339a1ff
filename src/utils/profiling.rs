use std::time::{Duration, Instant};

use log::info;

/// Per-pass timings of the most recent tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickProfiler {
    pub tracker_time: Duration,
    pub state_time: Duration,
    pub integrator_time: Duration,
    pub border_time: Duration,
    pub neighbor_time: Duration,
    pub smoothing_time: Duration,
    pub stabilizer_time: Duration,
    pub validator_time: Duration,
    pub total_tick_time: Duration,

    pub point_count: usize,
    pub repairs: usize,
}

impl TickProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sum of the constraint passes.
    pub fn solver_time(&self) -> Duration {
        self.border_time
            + self.neighbor_time
            + self.smoothing_time
            + self.stabilizer_time
            + self.validator_time
    }

    pub fn report(&self) {
        let total_us = self.total_tick_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        info!(
            "blob tick: {} points, {:.3} ms total, repairs {}",
            self.point_count,
            self.total_tick_time.as_secs_f32() * 1000.0,
            self.repairs
        );
        for (label, time) in [
            ("tracker", self.tracker_time),
            ("state", self.state_time),
            ("integrator", self.integrator_time),
            ("solver", self.solver_time()),
        ] {
            info!(
                "  {label:<10} {:.3} ms ({:.1}%)",
                time.as_secs_f32() * 1000.0,
                (time.as_micros() as f32 / total_us) * 100.0
            );
        }
    }
}

/// Adds the time until drop to the borrowed duration.
pub struct PassTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> PassTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for PassTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}
