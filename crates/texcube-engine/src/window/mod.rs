//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and drives the renderer from the
//! loop's idle point.

mod runtime;

pub use runtime::{RunSummary, Runtime, RuntimeConfig};
