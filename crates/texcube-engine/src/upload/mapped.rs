use crate::error::RenderError;

/// Rounds `size` up to the buffer copy alignment.
pub(crate) fn align_copy_size(size: u64) -> u64 {
    let align = wgpu::COPY_BUFFER_ALIGNMENT;
    size.div_ceil(align) * align
}

/// Creates a buffer mapped for host writes, sized to `size` rounded up to the
/// copy alignment.
pub(crate) fn create_mapped_buffer(
    device: &wgpu::Device,
    label: &'static str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> Result<wgpu::Buffer, RenderError> {
    if size == 0 {
        return Err(RenderError::resource(label, "zero-sized allocation"));
    }
    let max = device.limits().max_buffer_size;
    let aligned = align_copy_size(size);
    if aligned > max {
        return Err(RenderError::resource(
            label,
            format!("{aligned} bytes exceeds the device limit of {max}"),
        ));
    }

    Ok(device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: aligned,
        usage,
        mapped_at_creation: true,
    }))
}

/// Unmaps a host-mapped buffer when dropped, on every exit path.
pub(crate) struct UnmapOnDrop<'a> {
    buffer: &'a wgpu::Buffer,
}

impl<'a> UnmapOnDrop<'a> {
    pub(crate) fn new(buffer: &'a wgpu::Buffer) -> Self {
        Self { buffer }
    }

    /// Gives `write` the whole mapped range.
    ///
    /// The range view is released before this returns, so the guard can unmap.
    pub(crate) fn fill<R>(
        &self,
        write: impl FnOnce(&mut [u8]) -> Result<R, RenderError>,
    ) -> Result<R, RenderError> {
        let mut range = self.buffer.slice(..).get_mapped_range_mut();
        write(&mut range)
    }
}

impl Drop for UnmapOnDrop<'_> {
    fn drop(&mut self) {
        self.buffer.unmap();
    }
}

/// Creates a buffer, writes `bytes` at offset 0 and unmaps it.
pub(crate) fn create_buffer_with_bytes(
    device: &wgpu::Device,
    label: &'static str,
    bytes: &[u8],
    usage: wgpu::BufferUsages,
) -> Result<wgpu::Buffer, RenderError> {
    let buffer = create_mapped_buffer(device, label, bytes.len() as u64, usage)?;
    {
        let guard = UnmapOnDrop::new(&buffer);
        guard.fill(|dst| {
            dst[..bytes.len()].copy_from_slice(bytes);
            Ok(())
        })?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_sizes_round_up_to_four_bytes() {
        assert_eq!(align_copy_size(1), 4);
        assert_eq!(align_copy_size(4), 4);
        assert_eq!(align_copy_size(6 * 4), 24);
        assert_eq!(align_copy_size(130), 132);
    }
}
