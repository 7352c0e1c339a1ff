//! Background simulation thread.
//!
//! The simulation thread owns the tick cadence: it locks the world, runs one
//! tick, drains events, unlocks, then notifies the sink and the renderer. The
//! render side only ever takes short snapshot locks and is told about new
//! frames through a [`RenderNotifier`], so it never waits on the simulation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use glam::Vec2;
use log::{debug, info};
use parking_lot::{Condvar, Mutex};

use crate::{
    animation::TransitionOutcome,
    core::types::{Bounds, MovementSample, RenderSnapshot},
    error::Result,
    events::EventSink,
    utils::logging::warn_if_tick_budget_exceeded,
    world::BlobWorld,
};

/// Receiver of "repaint requested" notices. Must return immediately.
pub trait RenderNotifier: Send + Sync {
    fn request_repaint(&self, version: u64);
}

/// Coalescing repaint flag: the renderer polls it once per frame and only
/// ever sees the latest committed version. Missed versions are dropped.
#[derive(Debug, Default)]
pub struct FrameSignal {
    version: AtomicU64,
    pending: AtomicBool,
}

impl FrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the newest version if a repaint was requested since the last call.
    pub fn take_pending(&self) -> Option<u64> {
        if self.pending.swap(false, Ordering::AcqRel) {
            Some(self.version.load(Ordering::Acquire))
        } else {
            None
        }
    }

    pub fn latest_version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

impl RenderNotifier for FrameSignal {
    fn request_repaint(&self, version: u64) {
        self.version.fetch_max(version, Ordering::AcqRel);
        self.pending.store(true, Ordering::Release);
    }
}

/// Ticks between profiler reports, about ten seconds at the default rate.
const PROFILE_REPORT_TICKS: u64 = 1_200;

struct Shared {
    world: Mutex<BlobWorld>,
    sleep: Mutex<()>,
    wake: Condvar,
    running: AtomicBool,
    epoch: Instant,
}

impl Shared {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Owner of the simulation thread. Dropping it stops and joins the thread.
pub struct SimulationScheduler {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl SimulationScheduler {
    /// Moves `world` behind the state lock and starts ticking it.
    pub fn spawn(
        world: BlobWorld,
        sink: Arc<dyn EventSink>,
        notifier: Arc<dyn RenderNotifier>,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            world: Mutex::new(world),
            sleep: Mutex::new(()),
            wake: Condvar::new(),
            running: AtomicBool::new(true),
            epoch: Instant::now(),
        });

        let worker = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name("blob-simulation".into())
            .spawn(move || run(worker, sink, notifier))?;

        Ok(Self {
            shared,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stops the loop, wakes it if sleeping and joins it. Idempotent.
    pub fn stop(&mut self) {
        {
            let _guard = self.shared.sleep.lock();
            self.shared.running.store(false, Ordering::Release);
        }
        self.shared.wake.notify_all();

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("simulation thread panicked");
            }
        }
    }
}

impl Drop for SimulationScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(shared: Arc<Shared>, sink: Arc<dyn EventSink>, notifier: Arc<dyn RenderNotifier>) {
    info!("simulation thread started");
    let mut ticks: u64 = 0;

    while shared.running.load(Ordering::Acquire) {
        let tick_start = Instant::now();
        let now_ms = shared.now_ms();

        let (result, events, interval) = {
            let mut world = shared.world.lock();
            let result = world.tick(now_ms);
            if (ticks + 1) % PROFILE_REPORT_TICKS == 0 {
                world.profiler().report();
            }
            let interval = Duration::from_micros(world.config().timing.tick_interval_us);
            (result, world.drain_events(), interval)
        };

        for event in &events {
            sink.notify(event);
        }
        match result {
            Ok(report) => notifier.request_repaint(report.version),
            Err(err) => sink.diagnostic(&err),
        }
        ticks += 1;

        let elapsed = tick_start.elapsed();
        if warn_if_tick_budget_exceeded(elapsed, interval) {
            // overruns eat into the next tick's slack
            continue;
        }

        let mut guard = shared.sleep.lock();
        if !shared.running.load(Ordering::Acquire) {
            break;
        }
        shared.wake.wait_for(&mut guard, interval - elapsed);
    }

    info!("simulation thread stopped after {ticks} ticks");
}

/// Cloneable access to the shared world for the render and host threads.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Arc<Shared>,
}

impl SchedulerHandle {
    /// Milliseconds on the clock the simulation ticks with.
    pub fn now_ms(&self) -> u64 {
        self.shared.now_ms()
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Copies the committed shape under a short lock.
    pub fn snapshot(&self) -> RenderSnapshot {
        self.shared.world.lock().snapshot()
    }

    /// Records a window position stamped with the simulation clock.
    pub fn push_window_sample(&self, position: Vec2) -> bool {
        let timestamp_ms = self.now_ms();
        self.push_window_sample_at(position, timestamp_ms)
    }

    pub fn push_window_sample_at(&self, position: Vec2, timestamp_ms: u64) -> bool {
        self.shared
            .world
            .lock()
            .push_sample(MovementSample::new(position, timestamp_ms))
    }

    pub fn notify_resize(&self, new_size: Bounds) -> Result<Option<TransitionOutcome>> {
        let now_ms = self.now_ms();
        self.shared.world.lock().handle_resize(new_size, now_ms)
    }

    pub fn apply_force(&self, force: Vec2) {
        self.shared.world.lock().apply_force(force);
    }

    pub fn request_reset(&self) {
        let now_ms = self.now_ms();
        debug!("reset requested");
        self.shared.world.lock().reset(now_ms);
    }

    pub fn pause_tracking(&self) {
        let now_ms = self.now_ms();
        self.shared.world.lock().pause_tracking(now_ms);
    }

    pub fn resume_tracking(&self) {
        let now_ms = self.now_ms();
        self.shared.world.lock().resume_tracking(now_ms);
    }

    /// Runs `f` with the world locked. Keep `f` short: the simulation
    /// thread blocks on the same lock.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut BlobWorld) -> R) -> R {
        f(&mut self.shared.world.lock())
    }
}
