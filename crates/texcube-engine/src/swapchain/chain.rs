use winit::window::Window;

use crate::device::DeviceContext;
use crate::error::RenderError;
use crate::upload::{read_texture_rgba8, TextureReadback};

use super::targets::{FrameTarget, RenderTargetTable};
use super::{DepthTarget, HeadlessSurface, WindowSurface, BACK_BUFFER_COUNT};

enum Backend<'w> {
    Window(WindowSurface<'w>),
    Headless(HeadlessSurface),
}

/// Double-buffered presentation surface plus its frame targets.
///
/// Format, size and buffer count are fixed at creation.
pub struct SwapChain<'w> {
    backend: Backend<'w>,
    targets: RenderTargetTable,
    depth: DepthTarget,
    presented: u64,
}

impl<'w> SwapChain<'w> {
    /// Creates a swap chain presenting into `window`.
    pub fn for_window(ctx: &DeviceContext, window: &'w Window) -> Result<Self, RenderError> {
        let surface = WindowSurface::new(ctx, window, BACK_BUFFER_COUNT)?;
        let (width, height) = surface.extent();

        Ok(Self {
            backend: Backend::Window(surface),
            targets: RenderTargetTable::new(BACK_BUFFER_COUNT),
            depth: DepthTarget::new(ctx.device(), width, height),
            presented: 0,
        })
    }

    /// Creates an offscreen swap chain.
    pub fn headless(ctx: &DeviceContext, width: u32, height: u32) -> Result<Self, RenderError> {
        let surface = HeadlessSurface::new(ctx.device(), width, height, BACK_BUFFER_COUNT);
        let (width, height) = surface.extent();

        let mut targets = RenderTargetTable::new(BACK_BUFFER_COUNT);
        for (index, view) in surface.views().enumerate() {
            targets.register(index, view)?;
        }

        Ok(Self {
            backend: Backend::Headless(surface),
            targets,
            depth: DepthTarget::new(ctx.device(), width, height),
            presented: 0,
        })
    }

    pub fn buffer_count(&self) -> usize {
        self.targets.count()
    }

    /// Index of the buffer the next frame renders into.
    ///
    /// A window surface derives this from its own present count, so the
    /// current-target check only has teeth on the headless backend.
    pub fn current_back_buffer_index(&self) -> usize {
        match &self.backend {
            Backend::Window(s) => s.current_index(),
            Backend::Headless(s) => s.current_index(),
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        match &self.backend {
            Backend::Window(s) => s.format(),
            Backend::Headless(s) => s.format(),
        }
    }

    pub fn extent(&self) -> (u32, u32) {
        match &self.backend {
            Backend::Window(s) => s.extent(),
            Backend::Headless(s) => s.extent(),
        }
    }

    pub fn is_headless(&self) -> bool {
        matches!(self.backend, Backend::Headless(_))
    }

    /// Frames presented so far.
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        self.depth.view()
    }

    /// Hands out the current back buffer.
    pub fn acquire(&mut self, ctx: &DeviceContext) -> Result<FrameTarget, RenderError> {
        let index = self.current_back_buffer_index();
        match &mut self.backend {
            Backend::Window(surface) => {
                let texture = surface.acquire(ctx.device())?;
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.targets.register(index, view)?;
                Ok(FrameTarget {
                    index,
                    surface_texture: Some(texture),
                })
            }
            Backend::Headless(_) => Ok(FrameTarget::owned(index)),
        }
    }

    /// Transitions `target` to `RenderTarget`.
    ///
    /// Rejects a target that is not the surface's current buffer.
    pub fn begin_target(&mut self, target: &FrameTarget) -> Result<(), RenderError> {
        self.check_current(target)?;
        self.targets.states_mut().begin(target.index)
    }

    /// Render-target view of `target`.
    pub fn target_view(&self, target: &FrameTarget) -> Result<&wgpu::TextureView, RenderError> {
        self.targets.view(target.index)
    }

    /// Transitions `target` back to `Present`.
    pub fn end_target(&mut self, target: &FrameTarget) -> Result<(), RenderError> {
        self.targets.states_mut().end(target.index)
    }

    /// Presents `target` and advances the back buffer index.
    pub fn present(&mut self, target: FrameTarget) -> Result<(), RenderError> {
        self.check_current(&target)?;
        self.targets.states().expect_presentable(target.index)?;

        match &mut self.backend {
            Backend::Window(surface) => {
                let texture = target
                    .surface_texture
                    .ok_or(RenderError::TargetViewMissing { index: target.index })?;
                self.targets.release(target.index);
                surface.present(texture);
            }
            Backend::Headless(surface) => surface.present(),
        }

        self.presented += 1;
        log::trace!(
            "presented buffer {}, next {}",
            target.index,
            self.current_back_buffer_index()
        );
        Ok(())
    }

    /// Reads back the most recently presented headless frame.
    ///
    /// Returns `None` for window surfaces or before the first present.
    pub fn read_back_last(&self, ctx: &DeviceContext) -> Result<Option<TextureReadback>, RenderError> {
        let Backend::Headless(surface) = &self.backend else {
            return Ok(None);
        };
        let Some(texture) = surface.last_presented() else {
            return Ok(None);
        };
        read_texture_rgba8(ctx.device(), ctx.queue(), texture).map(Some)
    }

    fn check_current(&self, target: &FrameTarget) -> Result<(), RenderError> {
        let current = self.current_back_buffer_index();
        if target.index != current {
            return Err(RenderError::TargetMismatch {
                bound: target.index,
                current,
            });
        }
        Ok(())
    }
}
