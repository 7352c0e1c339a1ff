//! Notifications emitted by the engine.
//!
//! Events are fire-and-forget: the simulation thread hands them to an
//! [`EventSink`] after releasing the state lock and never waits for an
//! acknowledgement.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::types::AnimationMode;
use crate::error::BlobError;

/// Notification produced during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlobEvent {
    /// The host window moved significantly during this tick. `started` is
    /// set on the first such tick after rest.
    MovementDetected { speed: f32, started: bool },
    /// The host window has been still long enough.
    MovementStopped,
    /// The Idle re-entry blend finished.
    IdleBlendCompleted,
    ModeChanged {
        from: AnimationMode,
        to: AnimationMode,
    },
    /// Invalid point data was found and the ring regenerated.
    InvariantViolation {
        invalid_points: usize,
        center_reset: bool,
    },
}

/// Receiver of engine notifications. Both methods default to no-ops.
pub trait EventSink: Send + Sync {
    fn notify(&self, _event: &BlobEvent) {}

    /// Called when a tick was skipped because of a configuration error.
    fn diagnostic(&self, _error: &BlobError) {}
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {}

impl<F> EventSink for F
where
    F: Fn(&BlobEvent) + Send + Sync,
{
    fn notify(&self, event: &BlobEvent) {
        self(event)
    }
}

/// Sink that records every notification, mostly useful in tests and tools.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<BlobEvent>>,
    diagnostics: Mutex<Vec<String>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event received so far.
    pub fn events(&self) -> Vec<BlobEvent> {
        self.events.lock().clone()
    }

    /// Rendered diagnostic errors received so far.
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&BlobEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.diagnostics.lock().clear();
    }
}

impl EventSink for EventLog {
    fn notify(&self, event: &BlobEvent) {
        self.events.lock().push(event.clone());
    }

    fn diagnostic(&self, error: &BlobError) {
        self.diagnostics.lock().push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closures_are_sinks() {
        let seen = AtomicUsize::new(0);
        let sink = |_: &BlobEvent| {
            seen.fetch_add(1, Ordering::Relaxed);
        };
        sink.notify(&BlobEvent::MovementStopped);
        sink.diagnostic(&BlobError::InsufficientPoints { count: 1 });
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn log_records_events_and_diagnostics() {
        let log = EventLog::new();
        log.notify(&BlobEvent::IdleBlendCompleted);
        log.diagnostic(&BlobError::InsufficientPoints { count: 2 });
        assert_eq!(log.events(), vec![BlobEvent::IdleBlendCompleted]);
        assert_eq!(log.diagnostics().len(), 1);
        assert_eq!(log.count(|e| matches!(e, BlobEvent::IdleBlendCompleted)), 1);
    }
}
