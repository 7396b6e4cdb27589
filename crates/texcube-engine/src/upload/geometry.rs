use bytemuck::Pod;

use crate::error::RenderError;

use super::mapped::create_buffer_with_bytes;

/// Immutable description of an uploaded vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexBufferView {
    pub stride: u32,
    pub count: u32,
    /// Exact byte size of the vertex data (the allocation may be padded).
    pub size: u64,
}

/// Immutable description of an uploaded index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IndexBufferView {
    pub format: wgpu::IndexFormat,
    pub count: u32,
    pub size: u64,
}

pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    view: VertexBufferView,
}

impl VertexBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn view(&self) -> VertexBufferView {
        self.view
    }

    /// Slice covering exactly the vertex data.
    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..self.view.size)
    }
}

pub struct IndexBuffer {
    buffer: wgpu::Buffer,
    view: IndexBufferView,
}

impl IndexBuffer {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn view(&self) -> IndexBufferView {
        self.view
    }

    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..self.view.size)
    }
}

/// Uploads `vertices` through host-mapped memory.
pub fn upload_vertices<V: Pod>(
    device: &wgpu::Device,
    label: &'static str,
    vertices: &[V],
) -> Result<VertexBuffer, RenderError> {
    if vertices.is_empty() {
        return Err(RenderError::resource(label, "no vertices"));
    }

    let bytes: &[u8] = bytemuck::cast_slice(vertices);
    let buffer = create_buffer_with_bytes(
        device,
        label,
        bytes,
        wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
    )?;

    let view = VertexBufferView {
        stride: size_of::<V>() as u32,
        count: vertices.len() as u32,
        size: bytes.len() as u64,
    };
    log::debug!("uploaded `{label}`: {view:?}");

    Ok(VertexBuffer { buffer, view })
}

/// Uploads 32-bit triangle-list indices.
pub fn upload_indices(
    device: &wgpu::Device,
    label: &'static str,
    indices: &[u32],
) -> Result<IndexBuffer, RenderError> {
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(RenderError::resource(
            label,
            format!("{} indices do not form a triangle list", indices.len()),
        ));
    }

    let bytes: &[u8] = bytemuck::cast_slice(indices);
    let buffer = create_buffer_with_bytes(
        device,
        label,
        bytes,
        wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_SRC,
    )?;

    let view = IndexBufferView {
        format: wgpu::IndexFormat::Uint32,
        count: indices.len() as u32,
        size: bytes.len() as u64,
    };
    log::debug!("uploaded `{label}`: {view:?}");

    Ok(IndexBuffer { buffer, view })
}
