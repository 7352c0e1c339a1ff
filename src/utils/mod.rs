//! Utility helpers: math extensions, scoped logging timers and tick profiling.

pub mod logging;
pub mod math;
pub mod profiling;

pub use math::*;
pub use profiling::TickProfiler;
