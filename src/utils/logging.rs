use log::{log_enabled, warn, Level};
use std::time::{Duration, Instant};

/// Scoped timer that traces how long a labelled section took.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'a str) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        if log_enabled!(Level::Trace) {
            let elapsed = self.start.elapsed();
            log::trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}

/// Logs a warning when a tick overran its budget. Returns whether it did.
pub fn warn_if_tick_budget_exceeded(duration: Duration, budget: Duration) -> bool {
    if duration <= budget {
        return false;
    }
    warn!(
        "Tick exceeded budget: {:.2} ms > {:.2} ms",
        duration.as_secs_f32() * 1000.0,
        budget.as_secs_f32() * 1000.0
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrun_is_detected() {
        let budget = Duration::from_micros(8_333);
        assert!(!warn_if_tick_budget_exceeded(Duration::from_millis(2), budget));
        assert!(warn_if_tick_budget_exceeded(Duration::from_millis(12), budget));
    }
}
