use crate::device::{DeviceContext, DeviceInit};
use crate::error::RenderError;
use crate::frame::FrameReport;
use crate::time::FrameClock;
use crate::upload::TextureReadback;

use super::{Renderer, RendererConfig, UpdateStep};

/// Offscreen run parameters.
#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    pub device: DeviceInit,
    pub renderer: RendererConfig,
    pub frames: u32,
    pub step: UpdateStep,
    /// Read back the last presented frame.
    pub capture: bool,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            device: DeviceInit::default(),
            renderer: RendererConfig::default(),
            frames: 1,
            step: UpdateStep::default(),
            capture: false,
        }
    }
}

/// What an offscreen run did.
#[derive(Debug)]
pub struct HeadlessSummary {
    /// Fence value right after initialization.
    pub initial_fence: u64,
    pub frames: Vec<FrameReport>,
    pub capture: Option<TextureReadback>,
}

impl HeadlessSummary {
    pub fn final_fence(&self) -> u64 {
        self.frames
            .last()
            .map_or(self.initial_fence, |f| f.fence_value)
    }
}

/// Runs `frames` update/render ticks against an offscreen swap chain.
pub fn run_headless(options: HeadlessOptions) -> Result<HeadlessSummary, RenderError> {
    let ctx = pollster::block_on(DeviceContext::new(options.device))?;
    let mut renderer = Renderer::headless(ctx, &options.renderer)?;
    let initial_fence = renderer.last_signaled_fence();

    let mut clock = FrameClock::new();
    let mut frames = Vec::with_capacity(options.frames as usize);
    for _ in 0..options.frames {
        let time = clock.tick();
        renderer.update(options.step.delta(time.dt))?;
        frames.push(renderer.render()?);
    }

    let capture = if options.capture {
        renderer.read_back_last_frame()?
    } else {
        None
    };

    renderer.destroy()?;

    Ok(HeadlessSummary {
        initial_fence,
        frames,
        capture,
    })
}
