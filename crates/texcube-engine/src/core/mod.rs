//! Renderer facade.
//!
//! `Renderer` ties the device, swap chain, uploaded resources, pipeline state,
//! synchronizer and recorder together behind `new`/`update`/`render`/`destroy`.
//! The window runtime and the headless runner both drive it the same way.

mod config;
mod headless;
mod renderer;

pub use config::{RendererConfig, UpdateStep};
pub use headless::{run_headless, HeadlessOptions, HeadlessSummary};
pub use renderer::Renderer;
