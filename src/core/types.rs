use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Animation mode of the blob. Exactly one is active at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationMode {
    /// Organic wave motion while the host window is still.
    #[default]
    Idle,
    /// Reacting to host-window drags.
    Moving,
    /// Reacting to host-window resizes.
    Resizing,
}

impl AnimationMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Moving => "moving",
            Self::Resizing => "resizing",
        }
    }
}

/// Widget extent used for border collisions and centering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Geometric center of the widget.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// One host-window position observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSample {
    pub position: Vec2,
    /// Milliseconds on the clock shared with the tick driver.
    pub timestamp_ms: u64,
}

impl MovementSample {
    pub fn new(position: Vec2, timestamp_ms: u64) -> Self {
        Self {
            position,
            timestamp_ms,
        }
    }
}

/// Read-only view of the committed shape handed to the renderer once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub positions: Vec<Vec2>,
    pub center: Vec2,
    pub radius: f32,
    pub mode: AnimationMode,
    /// Number of ticks committed when the snapshot was taken.
    pub version: u64,
}
