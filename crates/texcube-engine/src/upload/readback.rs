use std::sync::mpsc;

use crate::error::RenderError;
use crate::sync::wait_for_submission;

/// RGBA8 pixels read back from a render target.
#[derive(Debug, Clone)]
pub struct TextureReadback {
    pub width: u32,
    pub height: u32,
    /// Tightly packed rows, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl TextureReadback {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.rgba.get(i..i + 4).and_then(|p| p.try_into().ok())
    }
}

/// Copies `size` bytes of `buffer` to host memory. The buffer needs `COPY_SRC`.
pub fn read_buffer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    size: u64,
) -> Result<Vec<u8>, RenderError> {
    let aligned = super::mapped::align_copy_size(size);
    let staging = create_readback_buffer(device, "buffer readback", aligned);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("buffer readback"),
    });
    encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, aligned);
    let index = queue.submit(std::iter::once(encoder.finish()));

    let mut bytes = map_and_read(device, &staging, index, "buffer readback")?;
    bytes.truncate(size as usize);
    Ok(bytes)
}

/// Reads mip 0 of an RGBA8 texture. The texture needs `COPY_SRC`.
pub fn read_texture_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> Result<TextureReadback, RenderError> {
    let format = texture.format();
    if format.block_copy_size(None) != Some(4) || format.block_dimensions() != (1, 1) {
        return Err(RenderError::resource(
            "texture readback",
            format!("{format:?} is not a 4-byte color format"),
        ));
    }

    let width = texture.width();
    let height = texture.height();
    let unpadded = width * 4;
    let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let staging = create_readback_buffer(device, "texture readback", padded as u64 * height as u64);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("texture readback"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    let index = queue.submit(std::iter::once(encoder.finish()));

    let padded_bytes = map_and_read(device, &staging, index, "texture readback")?;
    let mut rgba = vec![0u8; (unpadded * height) as usize];
    for row in 0..height as usize {
        let src = row * padded as usize;
        let dst = row * unpadded as usize;
        rgba[dst..dst + unpadded as usize].copy_from_slice(&padded_bytes[src..src + unpadded as usize]);
    }

    // BGRA targets come back as BGRA; swap to RGBA.
    if matches!(format, wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb) {
        for px in rgba.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }

    Ok(TextureReadback { width, height, rgba })
}

fn create_readback_buffer(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_and_read(
    device: &wgpu::Device,
    staging: &wgpu::Buffer,
    index: wgpu::SubmissionIndex,
    label: &'static str,
) -> Result<Vec<u8>, RenderError> {
    let slice = staging.slice(..);
    let (sender, receiver) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = sender.send(res);
    });
    wait_for_submission(device, index)?;

    receiver
        .recv()
        .map_err(|_| RenderError::resource(label, "map callback dropped"))?
        .map_err(|source| RenderError::Map { label, source })?;

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    Ok(bytes)
}
