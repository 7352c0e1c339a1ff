use glam::Vec2;

use crate::animation::{distance_weighted_impulse, BlobState};
use crate::core::{
    shape::ShapeState,
    types::{AnimationMode, Bounds},
};

const RESIZE_FORCE_GAIN: f32 = 0.05;

/// Reaction to host-window resizes. The per-tick effect is empty; all work
/// happens in [`ResizingState::handle_resize`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResizingState;

impl ResizingState {
    pub fn new() -> Self {
        Self
    }

    /// Moves the ring with the widget center and kicks it proportionally to
    /// the size change.
    ///
    /// Positions, targets and center shift by the center delta. The kick only
    /// touches velocities, so resizing back restores the original geometry.
    pub fn handle_resize(&self, shape: &mut ShapeState, old_size: Bounds, new_size: Bounds) {
        let delta = new_size.center() - old_size.center();
        shape.translate(delta);

        let force: Vec2 = (new_size.size() - old_size.size()) * RESIZE_FORCE_GAIN;
        distance_weighted_impulse(shape, force);
    }
}

impl BlobState for ResizingState {
    fn mode(&self) -> AnimationMode {
        AnimationMode::Resizing
    }

    fn apply(&mut self, _shape: &mut ShapeState, _bounds: Bounds) {}
}
