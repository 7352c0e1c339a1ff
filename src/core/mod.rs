//! Core data describing the blob: the control-point ring and shared value types.

pub mod shape;
pub mod soa;
pub mod types;

pub use shape::{ring_angle, ring_neighbors, ShapeState};
pub use soa::{PointsSoA, SoALanes};
pub use types::{AnimationMode, Bounds, MovementSample, RenderSnapshot};
