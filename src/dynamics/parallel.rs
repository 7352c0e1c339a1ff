//! Data-parallel integrator kernels.
//!
//! Both kernels evaluate [`PointKernel::integrate`] per point, so they agree
//! with the sequential path exactly. Without the `parallel` feature they run
//! the same chunked loops on the calling thread.

use glam::Vec2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{
    shape::ShapeState,
    soa::{PointsSoA, SoALanes},
};
use crate::dynamics::integrator::{integrate_slice, PointKernel};

/// Points per rayon task in the batched strategy.
pub const BATCH_SIZE: usize = 8;

/// Points per block in the structure-of-arrays strategy.
pub const SOA_BLOCK_SIZE: usize = 64;

/// Integrates contiguous batches of the ring. Returns whether any point moved.
pub fn integrate_batched(kernel: &PointKernel, shape: &mut ShapeState, history: &[Vec2]) -> bool {
    let ShapeState {
        positions,
        velocities,
        targets,
        ..
    } = shape;

    #[cfg(feature = "parallel")]
    {
        positions
            .par_chunks_mut(BATCH_SIZE)
            .zip(velocities.par_chunks_mut(BATCH_SIZE))
            .zip(targets.par_chunks(BATCH_SIZE))
            .zip(history.par_chunks(BATCH_SIZE))
            .map(|(((p, v), t), h)| integrate_slice(kernel, p, v, t, h))
            .reduce(|| false, |a, b| a || b)
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut moving = false;
        for (((p, v), t), h) in positions
            .chunks_mut(BATCH_SIZE)
            .zip(velocities.chunks_mut(BATCH_SIZE))
            .zip(targets.chunks(BATCH_SIZE))
            .zip(history.chunks(BATCH_SIZE))
        {
            moving |= integrate_slice(kernel, p, v, t, h);
        }
        moving
    }
}

/// Scatters the ring into `scratch`, integrates the lanes block by block and
/// gathers the result back. Returns whether any point moved.
pub fn integrate_soa(
    kernel: &PointKernel,
    shape: &mut ShapeState,
    history: &[Vec2],
    scratch: &mut PointsSoA,
) -> bool {
    scratch.load(shape, history);
    let moving = integrate_lanes(kernel, scratch.lanes());
    scratch.store(shape);
    moving
}

fn integrate_lanes(kernel: &PointKernel, lanes: SoALanes<'_>) -> bool {
    let SoALanes {
        pos_x,
        pos_y,
        vel_x,
        vel_y,
        target_x,
        target_y,
        prev_x,
        prev_y,
    } = lanes;
    let inputs = BlockInputs {
        target_x,
        target_y,
        prev_x,
        prev_y,
    };

    #[cfg(feature = "parallel")]
    {
        pos_x
            .par_chunks_mut(SOA_BLOCK_SIZE)
            .zip(pos_y.par_chunks_mut(SOA_BLOCK_SIZE))
            .zip(vel_x.par_chunks_mut(SOA_BLOCK_SIZE))
            .zip(vel_y.par_chunks_mut(SOA_BLOCK_SIZE))
            .enumerate()
            .map(|(block, (((px, py), vx), vy))| {
                integrate_block(kernel, block * SOA_BLOCK_SIZE, px, py, vx, vy, &inputs)
            })
            .reduce(|| false, |a, b| a || b)
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut moving = false;
        for (block, (((px, py), vx), vy)) in pos_x
            .chunks_mut(SOA_BLOCK_SIZE)
            .zip(pos_y.chunks_mut(SOA_BLOCK_SIZE))
            .zip(vel_x.chunks_mut(SOA_BLOCK_SIZE))
            .zip(vel_y.chunks_mut(SOA_BLOCK_SIZE))
            .enumerate()
        {
            moving |= integrate_block(kernel, block * SOA_BLOCK_SIZE, px, py, vx, vy, &inputs);
        }
        moving
    }
}

/// Read-only lanes indexed by absolute point index.
struct BlockInputs<'a> {
    target_x: &'a [f32],
    target_y: &'a [f32],
    prev_x: &'a [f32],
    prev_y: &'a [f32],
}

fn integrate_block(
    kernel: &PointKernel,
    offset: usize,
    px: &mut [f32],
    py: &mut [f32],
    vx: &mut [f32],
    vy: &mut [f32],
    inputs: &BlockInputs<'_>,
) -> bool {
    let mut moving = false;
    for i in 0..px.len() {
        let j = offset + i;
        let step = kernel.integrate(
            Vec2::new(px[i], py[i]),
            Vec2::new(vx[i], vy[i]),
            Vec2::new(inputs.target_x[j], inputs.target_y[j]),
            Vec2::new(inputs.prev_x[j], inputs.prev_y[j]),
        );
        px[i] = step.position.x;
        py[i] = step.position.y;
        vx[i] = step.velocity.x;
        vy[i] = step.velocity.y;
        moving |= step.moving;
    }
    moving
}
