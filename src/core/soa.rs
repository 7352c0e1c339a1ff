use glam::Vec2;

use crate::core::shape::ShapeState;

/// Structure-of-Arrays scratch storage for the control-point ring.
/// Used by the data-parallel integrator for better cache locality on large rings.
///
/// Buffers are owned by the integrator instance and reused across ticks;
/// they are resized only when the point count changes.
#[derive(Debug, Default, Clone)]
pub struct PointsSoA {
    pub pos_x: Vec<f32>,
    pub pos_y: Vec<f32>,
    pub target_x: Vec<f32>,
    pub target_y: Vec<f32>,
    pub vel_x: Vec<f32>,
    pub vel_y: Vec<f32>,
    // Velocity history of the previous tick.
    pub prev_x: Vec<f32>,
    pub prev_y: Vec<f32>,
}

/// Disjoint borrows of the SoA lanes: mutable state plus read-only inputs.
pub struct SoALanes<'a> {
    pub pos_x: &'a mut [f32],
    pub pos_y: &'a mut [f32],
    pub vel_x: &'a mut [f32],
    pub vel_y: &'a mut [f32],
    pub target_x: &'a [f32],
    pub target_y: &'a [f32],
    pub prev_x: &'a [f32],
    pub prev_y: &'a [f32],
}

impl PointsSoA {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pos_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_x.is_empty()
    }

    fn resize(&mut self, count: usize) {
        if self.len() == count {
            return;
        }
        for lane in [
            &mut self.pos_x,
            &mut self.pos_y,
            &mut self.target_x,
            &mut self.target_y,
            &mut self.vel_x,
            &mut self.vel_y,
            &mut self.prev_x,
            &mut self.prev_y,
        ] {
            lane.resize(count, 0.0);
        }
    }

    /// Scatters the shape and the velocity history into the lanes.
    ///
    /// `previous` must have the same length as the shape.
    pub fn load(&mut self, shape: &ShapeState, previous: &[Vec2]) {
        debug_assert_eq!(previous.len(), shape.len());
        self.resize(shape.len());
        for i in 0..shape.len() {
            self.pos_x[i] = shape.positions[i].x;
            self.pos_y[i] = shape.positions[i].y;
            self.target_x[i] = shape.targets[i].x;
            self.target_y[i] = shape.targets[i].y;
            self.vel_x[i] = shape.velocities[i].x;
            self.vel_y[i] = shape.velocities[i].y;
            self.prev_x[i] = previous[i].x;
            self.prev_y[i] = previous[i].y;
        }
    }

    /// Gathers positions and velocities back into the shape.
    pub fn store(&self, shape: &mut ShapeState) {
        for (i, (position, velocity)) in shape
            .positions
            .iter_mut()
            .zip(shape.velocities.iter_mut())
            .enumerate()
        {
            *position = Vec2::new(self.pos_x[i], self.pos_y[i]);
            *velocity = Vec2::new(self.vel_x[i], self.vel_y[i]);
        }
    }

    pub fn lanes(&mut self) -> SoALanes<'_> {
        SoALanes {
            pos_x: &mut self.pos_x,
            pos_y: &mut self.pos_y,
            vel_x: &mut self.vel_x,
            vel_y: &mut self.vel_y,
            target_x: &self.target_x,
            target_y: &self.target_y,
            prev_x: &self.prev_x,
            prev_y: &self.prev_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_then_store_preserves_shape() {
        let mut shape = ShapeState::circle(Vec2::new(10.0, 20.0), 5.0, 6);
        shape.velocities[2] = Vec2::new(0.5, -0.25);
        let history = vec![Vec2::ONE; 6];

        let mut soa = PointsSoA::new();
        soa.load(&shape, &history);
        assert_eq!(soa.len(), 6);
        assert_eq!(soa.prev_x[3], 1.0);

        let mut restored = shape.clone();
        restored.zero_velocities();
        soa.store(&mut restored);
        assert_eq!(restored, shape);
    }
}
