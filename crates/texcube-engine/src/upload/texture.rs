use crate::device::DeviceContext;
use crate::error::RenderError;
use crate::frame::CommandAllocator;
use crate::sync::{Fence, FrameSynchronizer};

use super::dds::TextureAsset;
use super::footprint::write_footprints;
use super::mapped::{create_mapped_buffer, UnmapOnDrop};

/// GPU-resident sampled texture.
pub struct Texture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    format: wgpu::TextureFormat,
    mip_levels: u32,
}

impl Texture {
    /// Shader-resource view over the full mip chain.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Uploads `asset` to a GPU-resident texture.
///
/// The pixels go through a host-mapped staging buffer laid out in copyable
/// footprints. The copy is recorded once, submitted, and waited on through
/// `sync`; the staging buffer is released only after that wait returns.
pub fn upload_texture<F: Fence>(
    ctx: &DeviceContext,
    asset: &TextureAsset,
    allocator: &mut CommandAllocator,
    sync: &mut FrameSynchronizer<F>,
) -> Result<Texture, RenderError> {
    let device = ctx.device();

    let needed = asset.format.required_features();
    if !device.features().contains(needed) {
        return Err(RenderError::asset(
            &asset.path,
            format!("{:?} needs device features {needed:?}", asset.format),
        ));
    }
    let max_dim = device.limits().max_texture_dimension_2d;
    if asset.width > max_dim || asset.height > max_dim {
        return Err(RenderError::asset(
            &asset.path,
            format!("{}x{} exceeds the device limit of {max_dim}", asset.width, asset.height),
        ));
    }

    let layout = asset.footprints()?;

    // ── staging ───────────────────────────────────────────────────────────
    let staging = create_mapped_buffer(
        device,
        "texture staging",
        layout.staging_size,
        wgpu::BufferUsages::COPY_SRC,
    )?;
    {
        let guard = UnmapOnDrop::new(&staging);
        guard.fill(|dst| write_footprints(&layout, &asset.data, dst))?;
    }

    // ── destination ───────────────────────────────────────────────────────
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("texcube texture"),
        size: wgpu::Extent3d {
            width: asset.width,
            height: asset.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: asset.mip_levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: asset.format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    // ── copy ──────────────────────────────────────────────────────────────
    allocator.reset(sync.completed_value())?;
    let mut encoder = allocator.begin(device);
    for mip in &layout.mips {
        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: mip.staging_offset,
                    bytes_per_row: Some(mip.row_pitch),
                    rows_per_image: Some(mip.rows),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: mip.level,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: mip.copy_width,
                height: mip.copy_height,
                depth_or_array_layers: 1,
            },
        );
    }
    ctx.queue().submit(std::iter::once(encoder.finish()));

    let value = sync.signal()?;
    allocator.retire_after(value);
    sync.wait()?;
    drop(staging);

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("texcube texture view"),
        base_mip_level: 0,
        mip_level_count: None,
        ..Default::default()
    });

    log::info!(
        "texture `{}` uploaded: {}x{} {:?}, {} mips (fence {value})",
        asset.path.display(),
        asset.width,
        asset.height,
        asset.format,
        asset.mip_levels
    );

    Ok(Texture {
        texture,
        view,
        format: asset.format,
        mip_levels: asset.mip_levels,
    })
}
