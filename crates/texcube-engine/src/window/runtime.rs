use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{Renderer, RendererConfig, UpdateStep};
use crate::device::{DeviceContext, DeviceInit};
use crate::error::RenderError;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Back buffer size; the window is not resizable.
    pub size: PhysicalSize<u32>,
    pub step: UpdateStep,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "texcube".to_string(),
            size: PhysicalSize::new(1280, 720),
            step: UpdateStep::default(),
        }
    }
}

/// Totals of an orderly windowed run.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub final_fence: u64,
}

/// Entry point for the windowed message pump.
pub struct Runtime;

impl Runtime {
    /// Opens the window and renders on every idle tick until the window is
    /// closed.
    ///
    /// Returns an error when a fatal error stopped the loop.
    pub fn run(config: RuntimeConfig, device: DeviceInit, renderer: RendererConfig) -> Result<RunSummary> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, device, renderer);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.finish()
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Renderer<'this>,
}

struct AppState {
    config: RuntimeConfig,
    device: DeviceInit,
    renderer: RendererConfig,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
    summary: RunSummary,
}

impl AppState {
    fn new(config: RuntimeConfig, device: DeviceInit, renderer: RendererConfig) -> Self {
        Self {
            config,
            device,
            renderer,
            entry: None,
            failure: None,
            summary: RunSummary::default(),
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.size)
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let device = self.device.clone();
        let renderer = &self.renderer;

        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            renderer_builder: |w| {
                pollster::block_on(DeviceContext::new(device))
                    .and_then(|ctx| Renderer::for_window(ctx, w, renderer))
            },
        }
        .try_build()
        .context("renderer initialization failed")?;

        self.entry = Some(entry);
        Ok(())
    }

    /// Runs one idle tick: `update` then `render`.
    fn tick(&mut self) -> Result<(), RenderError> {
        let Some(entry) = self.entry.as_mut() else {
            return Ok(());
        };
        let step = self.config.step;

        let report = entry.with_mut(|fields| {
            let time = fields.clock.tick();
            fields.renderer.update(step.delta(time.dt))?;
            fields.renderer.render()
        })?;

        self.summary.frames += 1;
        self.summary.final_fence = report.fence_value;
        Ok(())
    }

    /// Final GPU wait, then releases the window and every GPU object.
    fn shutdown(&mut self) -> Result<(), RenderError> {
        let Some(mut entry) = self.entry.take() else {
            return Ok(());
        };
        let result = entry.with_renderer_mut(|r| r.destroy());
        if result.is_ok() {
            self.summary.final_fence = entry.with_renderer(|r| r.last_signaled_fence());
        }
        drop(entry);
        result
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("fatal: {err:#}");
        if let Err(e) = self.shutdown() {
            log::error!("shutdown after fatal error also failed: {e}");
        }
        self.failure.get_or_insert(err);
        event_loop.exit();
    }

    fn finish(mut self) -> Result<RunSummary> {
        // Event loop can return without a CloseRequested (e.g. platform exit).
        if self.entry.is_some() {
            self.shutdown().context("shutdown failed")?;
        }
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.summary),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.failure.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_none() {
            return;
        }

        // Render continuously: every pass through the idle point is a tick.
        event_loop.set_control_flow(ControlFlow::Poll);

        if let Err(e) = self.tick() {
            self.fail(event_loop, anyhow!(e).context("frame failed"));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let ours = self
            .entry
            .as_ref()
            .is_some_and(|e| e.with_window(|w| w.id()) == window_id);
        if !ours {
            return;
        }

        if let WindowEvent::CloseRequested = event {
            log::info!("close requested after {} frames", self.summary.frames);
            match self.shutdown() {
                Ok(()) => event_loop.exit(),
                Err(e) => self.fail(event_loop, anyhow!(e).context("shutdown failed")),
            }
        }
    }
}
