//! Host-window movement tracking.

pub mod tracker;

pub use tracker::{MovementTracker, TrackerUpdate};
