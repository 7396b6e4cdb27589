//! Swap chain and frame targets.
//!
//! A fixed double-buffered presentation surface (window or offscreen), one
//! render-target view per buffer with checked state transitions, and a single
//! depth target.

mod chain;
mod depth;
mod headless;
mod targets;
mod window;

pub use chain::SwapChain;
pub use depth::DepthTarget;
pub use headless::HeadlessSurface;
pub use targets::{FrameTarget, RenderTargetTable, TargetState, TargetStates};
pub use window::WindowSurface;

/// Number of presentation buffers.
pub const BACK_BUFFER_COUNT: usize = 2;

/// Format of the shared depth target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
