//! Async hosting of the engine: timers, teardown and request coordination.

pub mod desk;
pub mod session;
