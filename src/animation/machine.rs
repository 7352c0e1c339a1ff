use glam::Vec2;
use log::debug;

use crate::animation::{
    blend::IdleTransitionBlend, idle::IdleState, moving::MovingState, resizing::ResizingState,
    BlobState,
};
use crate::config::{IdleParameters, MotionParameters, TimingParameters};
use crate::core::{
    shape::ShapeState,
    types::{AnimationMode, Bounds},
};
use crate::events::BlobEvent;

/// What a [`AnimationStateMachine::switch_to`] request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The active mode changed immediately.
    Changed,
    /// An Idle request started the re-entry blend; the mode changes when it lands.
    BlendStarted,
    /// Already in (or already blending to) the requested mode.
    Unchanged,
    /// A Moving request arrived inside the resize cooldown.
    Suppressed,
}

/// Owner of the three animation states and the single transition entry point.
///
/// Time is passed in as milliseconds on the caller's clock so the machine
/// itself never reads a clock.
#[derive(Debug, Clone)]
pub struct AnimationStateMachine {
    pub timing: TimingParameters,
    mode: AnimationMode,
    idle: IdleState,
    moving: MovingState,
    resizing: ResizingState,
    blend: Option<IdleTransitionBlend>,
    last_activity_ms: u64,
    last_resize_ms: Option<u64>,
}

impl AnimationStateMachine {
    pub fn new(idle: IdleParameters, motion: &MotionParameters, timing: TimingParameters) -> Self {
        Self {
            timing,
            mode: AnimationMode::Idle,
            idle: IdleState::new(idle),
            moving: MovingState::new(motion),
            resizing: ResizingState::new(),
            blend: None,
            last_activity_ms: 0,
            last_resize_ms: None,
        }
    }

    /// Externally observed mode. Stays on the old mode while an Idle blend runs.
    pub fn mode(&self) -> AnimationMode {
        self.mode
    }

    pub fn is_blending(&self) -> bool {
        self.blend.is_some()
    }

    pub fn blend(&self) -> Option<&IdleTransitionBlend> {
        self.blend.as_ref()
    }

    pub fn idle(&self) -> &IdleState {
        &self.idle
    }

    pub fn idle_mut(&mut self) -> &mut IdleState {
        &mut self.idle
    }

    pub fn moving(&self) -> &MovingState {
        &self.moving
    }

    pub fn moving_mut(&mut self) -> &mut MovingState {
        &mut self.moving
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    /// Records movement or resize activity, postponing the inactivity timeout.
    pub fn note_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = self.last_activity_ms.max(now_ms);
    }

    fn in_resize_cooldown(&self, now_ms: u64) -> bool {
        self.last_resize_ms
            .is_some_and(|at| now_ms.saturating_sub(at) < self.timing.resize_cooldown_ms)
    }

    fn active_state_mut(&mut self) -> &mut dyn BlobState {
        match self.mode {
            AnimationMode::Idle => &mut self.idle,
            AnimationMode::Moving => &mut self.moving,
            AnimationMode::Resizing => &mut self.resizing,
        }
    }

    fn set_mode(&mut self, to: AnimationMode, events: &mut Vec<BlobEvent>) {
        let from = self.mode;
        self.mode = to;
        debug!("blob mode {} -> {}", from.name(), to.name());
        events.push(BlobEvent::ModeChanged { from, to });
    }

    /// Single entry point for mode changes.
    ///
    /// Moving requests inside the resize cooldown are suppressed. Idle
    /// requests from Moving or Resizing start the re-entry blend instead of
    /// switching, and any non-Idle request cancels a running blend.
    pub fn switch_to(
        &mut self,
        requested: AnimationMode,
        now_ms: u64,
        shape: &ShapeState,
        bounds: Bounds,
        events: &mut Vec<BlobEvent>,
    ) -> TransitionOutcome {
        if requested == AnimationMode::Moving && self.in_resize_cooldown(now_ms) {
            debug!("moving request suppressed during resize cooldown");
            return TransitionOutcome::Suppressed;
        }

        if self.blend.is_some() {
            if requested == AnimationMode::Idle {
                return TransitionOutcome::Unchanged;
            }
            debug!("idle blend cancelled by {} request", requested.name());
            self.blend = None;
        }

        if requested == self.mode {
            if requested != AnimationMode::Idle {
                self.note_activity(now_ms);
            }
            return TransitionOutcome::Unchanged;
        }

        if requested == AnimationMode::Idle {
            self.blend = Some(IdleTransitionBlend::new(
                shape,
                bounds.center(),
                now_ms,
                self.timing.idle_blend_ms,
            ));
            return TransitionOutcome::BlendStarted;
        }

        self.note_activity(now_ms);
        self.set_mode(requested, events);
        TransitionOutcome::Changed
    }

    /// Switches to Resizing and lets the resizing state move the ring.
    pub fn handle_resize(
        &mut self,
        shape: &mut ShapeState,
        old_size: Bounds,
        new_size: Bounds,
        now_ms: u64,
        events: &mut Vec<BlobEvent>,
    ) -> TransitionOutcome {
        let outcome = self.switch_to(AnimationMode::Resizing, now_ms, shape, new_size, events);
        self.last_resize_ms = Some(now_ms);
        self.resizing.handle_resize(shape, old_size, new_size);
        outcome
    }

    /// Requests Idle once nothing happened for the inactivity timeout, then
    /// either advances the blend or runs the active state's per-tick effect.
    pub fn update(
        &mut self,
        now_ms: u64,
        shape: &mut ShapeState,
        bounds: Bounds,
        events: &mut Vec<BlobEvent>,
    ) {
        if self.mode != AnimationMode::Idle
            && self.blend.is_none()
            && now_ms.saturating_sub(self.last_activity_ms) >= self.timing.inactivity_timeout_ms
        {
            debug!("no activity for {} ms, returning to idle", self.timing.inactivity_timeout_ms);
            self.switch_to(AnimationMode::Idle, now_ms, shape, bounds, events);
        }

        if let Some(blend) = self.blend.as_mut() {
            if blend.step(shape, &mut self.idle, bounds, now_ms) {
                self.blend = None;
                events.push(BlobEvent::IdleBlendCompleted);
                self.set_mode(AnimationMode::Idle, events);
            }
            return;
        }

        self.active_state_mut().apply(shape, bounds);
    }

    /// Routes an external body force to the active state.
    pub fn apply_force(&mut self, shape: &mut ShapeState, force: Vec2) {
        self.active_state_mut().apply_force(shape, force);
    }

    /// Converts an observed window velocity into inertia on the ring.
    pub fn apply_inertia(&self, shape: &mut ShapeState, window_velocity: Vec2) {
        self.moving.apply_inertia_force(shape, window_velocity);
    }

    /// Restarts a running blend from the current `shape`, e.g. after the
    /// ring was regenerated underneath it. Returns whether a blend was running.
    pub fn restart_blend(&mut self, shape: &ShapeState, bounds: Bounds, now_ms: u64) -> bool {
        if self.blend.is_none() {
            return false;
        }
        debug!("idle blend restarted from a regenerated ring");
        self.blend = Some(IdleTransitionBlend::new(
            shape,
            bounds.center(),
            now_ms,
            self.timing.idle_blend_ms,
        ));
        true
    }

    /// Drops a running blend without changing the mode.
    pub fn cancel_blend(&mut self) {
        if self.blend.take().is_some() {
            debug!("idle blend cancelled");
        }
    }
}
