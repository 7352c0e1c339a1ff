//! Blob Dynamics – deformable control-point ring simulation.
//!
//! This crate animates a ring of control points under a small physics
//! simulation: force integration with interchangeable execution strategies,
//! a fixed-order constraint solver, a three-mode animation state machine
//! with an eased Idle re-entry blend, host-window movement tracking, and a
//! background scheduler that decouples the simulation cadence from the
//! render cadence. Rendering and windowing stay outside the crate; they see
//! [`RenderSnapshot`]s and feed plain samples back in.

pub mod animation;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod events;
pub mod motion;
pub mod scheduler;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use animation::{
    AnimationStateMachine, BlobState, IdleState, IdleTransitionBlend, MovingState, ResizingState,
    TransitionOutcome,
};
pub use config::{
    BlobConfig, BlobParameters, IdleParameters, MotionParameters, PhysicsParameters,
    TimingParameters,
};
pub use crate::core::{
    shape::ShapeState,
    types::{AnimationMode, Bounds, MovementSample, RenderSnapshot},
};
pub use dynamics::{
    integrator::{select_strategy, IntegrationStrategy, Integrator},
    solver::{ConstraintSolver, SolverStepMetrics},
    stabilizer::Stabilizer,
    validator::{ValidationOutcome, Validator},
};
pub use error::{BlobError, Result};
pub use events::{BlobEvent, EventLog, EventSink, NoopSink};
pub use motion::tracker::{MovementTracker, TrackerUpdate};
pub use scheduler::{FrameSignal, RenderNotifier, SchedulerHandle, SimulationScheduler};
pub use utils::profiling::TickProfiler;
pub use world::{BlobWorld, TickReport};
