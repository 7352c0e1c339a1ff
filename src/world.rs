use std::time::Instant;

use glam::Vec2;
use log::{debug, error, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    animation::{AnimationStateMachine, TransitionOutcome},
    config::{
        check_padded_extent, BlobConfig, IdleParameters, MotionParameters, PhysicsParameters,
        TimingParameters,
    },
    core::{
        shape::ShapeState,
        types::{AnimationMode, Bounds, MovementSample, RenderSnapshot},
    },
    dynamics::{
        integrator::{IntegrationStrategy, Integrator},
        solver::{ConstraintSolver, SolverStepMetrics},
        stabilizer::Stabilizer,
        validator::{ValidationOutcome, Validator},
    },
    error::{BlobError, Result},
    events::BlobEvent,
    motion::tracker::{MovementTracker, TrackerUpdate},
    utils::{
        logging::ScopedTimer,
        profiling::{PassTimer, TickProfiler},
    },
};

/// Summary of one committed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Mode after the tick.
    pub mode: AnimationMode,
    /// Whether any point was still moving after integration.
    pub in_motion: bool,
    pub strategy: IntegrationStrategy,
    pub solver: SolverStepMetrics,
    /// Version of the committed state.
    pub version: u64,
}

/// Central simulation container: owns the ring and runs one tick as
/// tracker, state effect, integrator and constraint passes.
pub struct BlobWorld {
    config: BlobConfig,
    shape: ShapeState,
    bounds: Bounds,
    integrator: Integrator,
    solver: ConstraintSolver,
    machine: AnimationStateMachine,
    tracker: MovementTracker,
    rng: StdRng,
    pending_events: Vec<BlobEvent>,
    profiler: TickProfiler,
    version: u64,
    /// Time of the last accepted resize whose settle regeneration is pending.
    resize_settle_at: Option<u64>,
}

impl BlobWorld {
    /// Validates `config` and creates an organically perturbed ring around
    /// the widget center.
    pub fn new(config: BlobConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.blob.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bounds = Bounds::new(config.blob.width, config.blob.height);
        let shape = ShapeState::organic(
            bounds.center(),
            config.blob.radius,
            config.blob.point_count,
            &mut rng,
        );
        Self::assemble(config, shape, rng)
    }

    /// Wraps an existing ring. Its point count and radius override the ones
    /// in `config`.
    pub fn with_shape(mut config: BlobConfig, shape: ShapeState) -> Result<Self> {
        config.blob.point_count = shape.len();
        config.blob.radius = shape.radius;
        config.validate()?;
        shape.check_consistency(shape.len())?;
        let rng = match config.blob.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::assemble(config, shape, rng)
    }

    fn assemble(config: BlobConfig, shape: ShapeState, mut rng: StdRng) -> Result<Self> {
        let bounds = Bounds::new(config.blob.width, config.blob.height);
        let stabilizer = Stabilizer::new(
            config.blob.point_count,
            config.physics.stabilization_rate,
            &mut rng,
        );
        let validator = Validator::new(StdRng::seed_from_u64(rng.gen()));
        let solver = ConstraintSolver::new(
            config.physics,
            bounds,
            config.blob.padding,
            stabilizer,
            validator,
        );

        debug!(
            "blob world created: {} points, radius {}, widget {}x{}",
            config.blob.point_count, config.blob.radius, bounds.width, bounds.height
        );

        Ok(Self {
            integrator: Integrator::new(config.physics),
            machine: AnimationStateMachine::new(config.idle, &config.motion, config.timing),
            tracker: MovementTracker::new(config.motion),
            solver,
            shape,
            bounds,
            config,
            rng,
            pending_events: Vec::new(),
            profiler: TickProfiler::default(),
            version: 0,
            resize_settle_at: None,
        })
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    pub fn shape(&self) -> &ShapeState {
        &self.shape
    }

    /// Direct access for host collaborators. Length changes are detected on
    /// the next tick and reported as [`BlobError::ConfigurationMismatch`].
    pub fn shape_mut(&mut self) -> &mut ShapeState {
        &mut self.shape
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn mode(&self) -> AnimationMode {
        self.machine.mode()
    }

    /// Number of committed ticks.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn profiler(&self) -> &TickProfiler {
        &self.profiler
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn integrator_mut(&mut self) -> &mut Integrator {
        &mut self.integrator
    }

    pub fn machine(&self) -> &AnimationStateMachine {
        &self.machine
    }

    pub fn tracker(&self) -> &MovementTracker {
        &self.tracker
    }

    pub fn solver(&self) -> &ConstraintSolver {
        &self.solver
    }

    /// Takes every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<BlobEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            positions: self.shape.positions.clone(),
            center: self.shape.center,
            radius: self.shape.radius,
            mode: self.machine.mode(),
            version: self.version,
        }
    }

    /// Records a host-window position. Returns whether the tracker kept it.
    pub fn push_sample(&mut self, sample: MovementSample) -> bool {
        self.tracker.push_sample(sample)
    }

    /// Requests a mode through the state machine's single entry point.
    pub fn request_mode(&mut self, mode: AnimationMode, now_ms: u64) -> TransitionOutcome {
        self.machine
            .switch_to(mode, now_ms, &self.shape, self.bounds, &mut self.pending_events)
    }

    /// Handles a widget resize to `new_size`. Changes of at most
    /// `min_resize_delta` on both axes are ignored and return `Ok(None)`.
    pub fn handle_resize(&mut self, new_size: Bounds, now_ms: u64) -> Result<Option<TransitionOutcome>> {
        for (name, value) in [("width", new_size.width), ("height", new_size.height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BlobError::InvalidParameter {
                    name,
                    reason: format!("resize to {value} is not a positive size"),
                });
            }
        }

        check_padded_extent("width", new_size.width, self.config.blob.padding)?;
        check_padded_extent("height", new_size.height, self.config.blob.padding)?;

        let old_size = self.bounds;
        let change = (new_size.size() - old_size.size()).abs();
        if change.max_element() <= self.config.timing.min_resize_delta {
            return Ok(None);
        }

        self.bounds = new_size;
        self.solver.bounds = new_size;
        self.config.blob.width = new_size.width;
        self.config.blob.height = new_size.height;
        self.resize_settle_at = Some(now_ms);

        let outcome = self.machine.handle_resize(
            &mut self.shape,
            old_size,
            new_size,
            now_ms,
            &mut self.pending_events,
        );
        debug!(
            "resize {}x{} -> {}x{}: {outcome:?}",
            old_size.width, old_size.height, new_size.width, new_size.height
        );
        Ok(Some(outcome))
    }

    /// Applies an external body force through the active state.
    pub fn apply_force(&mut self, force: Vec2) {
        self.machine.apply_force(&mut self.shape, force);
    }

    /// Stops reacting to host-window movement and heads back to Idle.
    pub fn pause_tracking(&mut self, now_ms: u64) {
        self.tracker.set_paused(true);
        if self.machine.mode() != AnimationMode::Idle {
            self.request_mode(AnimationMode::Idle, now_ms);
        }
        debug!("movement tracking paused");
    }

    /// Re-enables movement tracking with a freshly generated ring.
    pub fn resume_tracking(&mut self, now_ms: u64) {
        self.tracker.set_paused(false);
        self.reset(now_ms);
        debug!("movement tracking resumed");
    }

    /// Regenerates the organic ring at the widget center, replays the
    /// heartbeat and blends back to Idle if another mode is active.
    pub fn reset(&mut self, now_ms: u64) {
        self.regenerate_shape();
        self.resize_settle_at = None;
        self.tracker.clear();
        self.machine.cancel_blend();
        if self.machine.mode() != AnimationMode::Idle {
            self.request_mode(AnimationMode::Idle, now_ms);
        }
        debug!("blob reset at {} ms", now_ms);
    }

    /// Whether a resize is still waiting for its settle regeneration.
    pub fn resize_settling(&self) -> bool {
        self.resize_settle_at.is_some()
    }

    /// Fresh organic ring at the widget center with the heartbeat re-armed.
    fn regenerate_shape(&mut self) {
        self.shape = ShapeState::organic(
            self.bounds.center(),
            self.config.blob.radius,
            self.config.blob.point_count,
            &mut self.rng,
        );
        self.integrator.reset_history();
        self.machine.idle_mut().rearm_heartbeat();
    }

    /// Rebuilds the ring once no resize arrived for `resize_settle_ms`.
    fn settle_resize(&mut self, now_ms: u64) {
        let Some(at) = self.resize_settle_at else {
            return;
        };
        if now_ms.saturating_sub(at) < self.config.timing.resize_settle_ms {
            return;
        }
        self.resize_settle_at = None;
        self.regenerate_shape();
        self.machine.restart_blend(&self.shape, self.bounds, now_ms);
        debug!(
            "resize settled at {}x{}, ring regenerated",
            self.bounds.width, self.bounds.height
        );
    }

    pub fn set_physics_parameters(&mut self, physics: PhysicsParameters) -> Result<()> {
        physics.validate()?;
        self.integrator.params = physics;
        self.solver.set_params(physics);
        self.config.physics = physics;
        Ok(())
    }

    pub fn set_idle_parameters(&mut self, idle: IdleParameters) -> Result<()> {
        idle.validate()?;
        self.machine.idle_mut().params = idle;
        self.config.idle = idle;
        Ok(())
    }

    pub fn set_motion_parameters(&mut self, motion: MotionParameters) -> Result<()> {
        motion.validate()?;
        self.tracker.params = motion;
        self.machine.moving_mut().speed_ceiling = motion.speed_ceiling;
        self.config.motion = motion;
        Ok(())
    }

    pub fn set_timing_parameters(&mut self, timing: TimingParameters) -> Result<()> {
        timing.validate()?;
        self.machine.timing = timing;
        self.config.timing = timing;
        Ok(())
    }

    /// Advances the simulation by one tick at `now_ms`.
    ///
    /// Fails without touching any state when the per-point sequences no
    /// longer match the configured point count.
    pub fn tick(&mut self, now_ms: u64) -> Result<TickReport> {
        let _timer = ScopedTimer::new("blob::tick");
        let started = Instant::now();

        if let Err(err) = self.shape.check_consistency(self.config.blob.point_count) {
            error!("tick skipped: {err}");
            return Err(err);
        }
        self.profiler.reset();
        self.profiler.point_count = self.shape.len();
        self.settle_resize(now_ms);

        let update = {
            let _pass = PassTimer::new(&mut self.profiler.tracker_time);
            self.tracker.process(now_ms)
        };
        self.react_to_tracker(update, now_ms);

        {
            let _pass = PassTimer::new(&mut self.profiler.state_time);
            self.machine
                .update(now_ms, &mut self.shape, self.bounds, &mut self.pending_events);
        }

        let in_motion = {
            let _pass = PassTimer::new(&mut self.profiler.integrator_time);
            self.integrator.step(&mut self.shape)
        };

        let solver = self
            .solver
            .solve(&mut self.shape, in_motion, &mut self.profiler);

        if let ValidationOutcome::Repaired {
            invalid_points,
            center_reset,
        } = solver.validation
        {
            warn!("blob ring regenerated after {invalid_points} invalid points");
            self.pending_events.push(BlobEvent::InvariantViolation {
                invalid_points,
                center_reset,
            });
            self.integrator.reset_history();
            self.machine.idle_mut().rearm_heartbeat();
            // a running blend still holds the pre-repair snapshot
            self.machine.restart_blend(&self.shape, self.bounds, now_ms);
            self.profiler.repairs += 1;
        }

        self.version += 1;
        self.profiler.total_tick_time = started.elapsed();

        Ok(TickReport {
            mode: self.machine.mode(),
            in_motion,
            strategy: self
                .integrator
                .last_strategy()
                .unwrap_or(IntegrationStrategy::Sequential),
            solver,
            version: self.version,
        })
    }

    fn react_to_tracker(&mut self, update: TrackerUpdate, now_ms: u64) {
        match update {
            TrackerUpdate::Quiet => {}
            TrackerUpdate::Significant {
                velocity,
                inertia,
                started,
            } => {
                self.pending_events.push(BlobEvent::MovementDetected {
                    speed: velocity.length(),
                    started,
                });
                self.request_mode(AnimationMode::Moving, now_ms);
                if self.machine.mode() == AnimationMode::Moving && !self.machine.is_blending() {
                    self.machine.apply_inertia(&mut self.shape, inertia);
                }
            }
            TrackerUpdate::Stopped => {
                self.pending_events.push(BlobEvent::MovementStopped);
                if self.machine.mode() == AnimationMode::Moving {
                    self.request_mode(AnimationMode::Idle, now_ms);
                }
            }
        }
    }
}
