//! Tick timing for the idle loop.
//!
//! One `FrameClock` per loop; call `tick()` once per `update`/`render` pair.
//! Only time-based rotation reads the delta.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
