//! Texcube engine crate.
//!
//! An explicit frame pipeline over wgpu that draws one textured, lit cube:
//! device selection, a double-buffered swap chain, resource upload, pipeline
//! state, fence-based frame pacing and per-frame command recording.

pub mod core;
pub mod device;
pub mod error;
pub mod frame;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod swapchain;
pub mod sync;
pub mod time;
pub mod upload;
pub mod window;

pub use crate::core::{Renderer, RendererConfig, UpdateStep};
pub use crate::device::{DeviceContext, DeviceInit, FeatureLevel};
pub use crate::error::{ErrorKind, RenderError};
