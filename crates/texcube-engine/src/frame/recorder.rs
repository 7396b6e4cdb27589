use crate::device::DeviceContext;
use crate::error::RenderError;
use crate::pipeline::{PipelineState, CONSTANTS_GROUP, TEXTURE_GROUP};
use crate::swapchain::SwapChain;
use crate::sync::{Fence, FrameSynchronizer};
use crate::upload::{ConstantBuffer, IndexBuffer, VertexBuffer};

use super::CommandAllocator;

/// Back buffer clear color.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.2,
    b: 0.4,
    a: 1.0,
};

/// Depth clear value.
pub const CLEAR_DEPTH: f32 = 1.0;

/// Resources bound by every frame.
pub struct DrawResources<'a> {
    pub pipeline: &'a PipelineState,
    pub vertices: &'a VertexBuffer,
    pub indices: &'a IndexBuffer,
    pub constants: &'a ConstantBuffer,
    pub constants_group: &'a wgpu::BindGroup,
    pub texture_group: &'a wgpu::BindGroup,
}

/// Outcome of one recorded, submitted and retired frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameReport {
    /// Back buffer that was rendered and presented.
    pub target_index: usize,
    /// Fence value that retired the frame.
    pub fence_value: u64,
    pub draws: u32,
}

/// Records, submits and presents frames with a single command allocator.
pub struct FrameRecorder {
    allocator: CommandAllocator,
    frames: u64,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self {
            allocator: CommandAllocator::new("texcube frame"),
            frames: 0,
        }
    }

    pub fn allocator_mut(&mut self) -> &mut CommandAllocator {
        &mut self.allocator
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Encoders handed out by the allocator, the texture upload included.
    pub fn recordings(&self) -> u64 {
        self.allocator.recordings()
    }

    /// Runs one full frame.
    ///
    /// Resets the allocator, renders into the swap chain's current buffer,
    /// submits, presents, then blocks until the GPU has retired the frame.
    pub fn render_frame<F: Fence>(
        &mut self,
        ctx: &DeviceContext,
        swapchain: &mut SwapChain<'_>,
        sync: &mut FrameSynchronizer<F>,
        resources: &DrawResources<'_>,
    ) -> Result<FrameReport, RenderError> {
        self.allocator.reset(sync.completed_value())?;

        let target = swapchain.acquire(ctx)?;
        swapchain.begin_target(&target)?;

        let mut encoder = self.allocator.begin(ctx.device());
        let draws = {
            let color_view = swapchain.target_view(&target)?;
            record_draws(
                &mut encoder,
                color_view,
                swapchain.depth_view(),
                swapchain.extent(),
                resources,
            )?
        };

        swapchain.end_target(&target)?;

        resources.constants.flush(ctx.queue());
        ctx.queue().submit(std::iter::once(encoder.finish()));

        let target_index = target.index;
        swapchain.present(target)?;

        let fence_value = sync.signal()?;
        self.allocator.retire_after(fence_value);
        sync.wait()?;

        self.frames += 1;
        log::trace!("frame {} on buffer {target_index} retired at fence {fence_value}", self.frames);

        Ok(FrameReport {
            target_index,
            fence_value,
            draws,
        })
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Records the cube pass: clear, bind, then one indexed draw per transform
/// slot in slot order. Returns the number of draws.
pub fn record_draws(
    encoder: &mut wgpu::CommandEncoder,
    color_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    (width, height): (u32, u32),
    resources: &DrawResources<'_>,
) -> Result<u32, RenderError> {
    let offsets = (0..resources.constants.arena().slot_count())
        .map(|slot| resources.constants.offset(slot))
        .collect::<Result<Vec<u32>, _>>()?;
    let index_count = resources.indices.view().count;

    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("texcube cube pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_DEPTH),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    rpass.set_pipeline(resources.pipeline.pipeline());
    rpass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
    rpass.set_scissor_rect(0, 0, width, height);

    rpass.set_bind_group(TEXTURE_GROUP, resources.texture_group, &[]);
    rpass.set_vertex_buffer(0, resources.vertices.slice());
    rpass.set_index_buffer(resources.indices.slice(), resources.indices.view().format);

    for offset in &offsets {
        rpass.set_bind_group(CONSTANTS_GROUP, resources.constants_group, &[*offset]);
        rpass.draw_indexed(0..index_count, 0, 0..1);
    }

    Ok(offsets.len() as u32)
}
