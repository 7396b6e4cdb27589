use winit::window::Window;

use crate::device::DeviceContext;
use crate::error::RenderError;
use crate::frame::{DrawResources, FrameRecorder, FrameReport};
use crate::model::{CubeScene, Face, Vertex, FACE_INDICES, FACE_VERTICES, TRANSFORM_BLOCK_SIZE};
use crate::pipeline::{PipelineState, RootSignature, ShaderSource};
use crate::swapchain::SwapChain;
use crate::sync::{FrameSynchronizer, QueueFence};
use crate::upload::{
    upload_indices, upload_texture, upload_vertices, ConstantBuffer, IndexBuffer, Texture,
    TextureAsset, TextureReadback, VertexBuffer,
};

use super::RendererConfig;

/// Owns every GPU object of the textured cube and drives its frames.
///
/// Built once by `new`; the message pump then calls `update` and `render` on
/// every idle tick, and `destroy` (or drop) before the window goes away.
pub struct Renderer<'w> {
    // Field order is drop order: GPU objects before the device that owns them.
    recorder: FrameRecorder,
    pipeline: PipelineState,
    vertices: VertexBuffer,
    indices: IndexBuffer,
    texture: Texture,
    constants: ConstantBuffer,
    constants_group: wgpu::BindGroup,
    texture_group: wgpu::BindGroup,
    scene: CubeScene,
    swapchain: SwapChain<'w>,
    sync: FrameSynchronizer<QueueFence>,
    destroyed: bool,
    ctx: DeviceContext,
}

impl<'w> Renderer<'w> {
    /// Creates a renderer presenting into `window`.
    pub fn for_window(
        ctx: DeviceContext,
        window: &'w Window,
        config: &RendererConfig,
    ) -> Result<Self, RenderError> {
        let swapchain = SwapChain::for_window(&ctx, window)?;
        Self::new(ctx, swapchain, config)
    }

    /// Builds pipeline state and uploads every resource.
    ///
    /// The texture upload is the first fenced submission, so the fence counter
    /// stands at 1 when this returns.
    pub fn new(
        ctx: DeviceContext,
        swapchain: SwapChain<'w>,
        config: &RendererConfig,
    ) -> Result<Self, RenderError> {
        let device = ctx.device();

        let constants = ConstantBuffer::new(device, Face::ALL.len(), TRANSFORM_BLOCK_SIZE)?;
        let root = RootSignature::new(device, constants.binding_size());

        let shader = ShaderSource::load(&config.shader_path)?;
        let pipeline = PipelineState::new(device, &root, &shader, swapchain.format())?;

        let vertices = upload_vertices::<Vertex>(device, "texcube vertices", &FACE_VERTICES)?;
        let indices = upload_indices(device, "texcube indices", &FACE_INDICES)?;

        let mut sync = FrameSynchronizer::new(QueueFence::new(device, ctx.queue()));
        let mut recorder = FrameRecorder::new();

        let asset = TextureAsset::load(&config.texture_path)?;
        let texture = upload_texture(&ctx, &asset, recorder.allocator_mut(), &mut sync)?;

        let constants_group = root.constants_bind_group(device, &constants);
        let texture_group = root.texture_bind_group(device, &texture);

        let (width, height) = swapchain.extent();
        let mut renderer = Self {
            recorder,
            pipeline,
            vertices,
            indices,
            texture,
            constants,
            constants_group,
            texture_group,
            scene: CubeScene::new(width, height),
            swapchain,
            sync,
            destroyed: false,
            ctx,
        };
        renderer.write_transforms()?;

        let (tex_w, tex_h) = renderer.texture.size();
        log::info!(
            "renderer ready: {width}x{height}, {} buffers, texture {tex_w}x{tex_h} {:?} ({} mips), fence at {}",
            renderer.swapchain.buffer_count(),
            renderer.texture.format(),
            renderer.texture.mip_levels(),
            renderer.sync.last_signaled()
        );
        Ok(renderer)
    }

    /// Advances the cube by `radians` and rewrites every transform slot.
    ///
    /// CPU only; the new values reach the GPU with the next `render`.
    pub fn update(&mut self, radians: f32) -> Result<(), RenderError> {
        self.scene.advance(radians);
        self.write_transforms()
    }

    /// Records, submits and presents one frame, then waits for it to retire.
    pub fn render(&mut self) -> Result<FrameReport, RenderError> {
        if self.destroyed {
            return Err(RenderError::FenceState {
                op: "render",
                state: "destroyed".to_owned(),
            });
        }

        let resources = DrawResources {
            pipeline: &self.pipeline,
            vertices: &self.vertices,
            indices: &self.indices,
            constants: &self.constants,
            constants_group: &self.constants_group,
            texture_group: &self.texture_group,
        };
        self.recorder
            .render_frame(&self.ctx, &mut self.swapchain, &mut self.sync, &resources)
    }

    /// Waits for the GPU one final time. Further calls are no-ops.
    pub fn destroy(&mut self) -> Result<(), RenderError> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        let value = self.sync.flush()?;
        log::info!(
            "renderer shut down after {} frames (fence {value}, {} recordings, waits: {} blocking, {} immediate)",
            self.recorder.frames(),
            self.recorder.recordings(),
            self.sync.blocking_waits(),
            self.sync.immediate_waits()
        );
        Ok(())
    }

    pub fn swapchain(&self) -> &SwapChain<'w> {
        &self.swapchain
    }

    pub fn current_back_buffer_index(&self) -> usize {
        self.swapchain.current_back_buffer_index()
    }

    pub fn last_signaled_fence(&self) -> u64 {
        self.sync.last_signaled()
    }

    pub fn completed_fence(&self) -> u64 {
        self.sync.completed_value()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.recorder.frames()
    }

    /// Host image of the transform buffer.
    pub fn transform_bytes(&self) -> &[u8] {
        self.constants.arena().as_bytes()
    }

    /// Pixels of the last presented frame (headless only).
    pub fn read_back_last_frame(&self) -> Result<Option<TextureReadback>, RenderError> {
        self.swapchain.read_back_last(&self.ctx)
    }

    fn write_transforms(&mut self) -> Result<(), RenderError> {
        for (slot, block) in self.scene.blocks().iter().enumerate() {
            self.constants.write_slot(slot, bytemuck::bytes_of(block))?;
        }
        Ok(())
    }
}

impl Renderer<'static> {
    /// Creates a renderer presenting into an offscreen swap chain of
    /// `config.width` × `config.height`.
    pub fn headless(ctx: DeviceContext, config: &RendererConfig) -> Result<Self, RenderError> {
        let swapchain = SwapChain::headless(&ctx, config.width, config.height)?;
        Self::new(ctx, swapchain, config)
    }
}

impl Drop for Renderer<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::error!("final GPU wait failed: {e}");
        }
    }
}
