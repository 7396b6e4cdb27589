use crate::error::RenderError;

/// Staging placement of one mip level.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MipFootprint {
    pub level: u32,
    /// Logical mip size in texels.
    pub width: u32,
    pub height: u32,
    /// Copy extent: the mip size rounded up to whole blocks.
    pub copy_width: u32,
    pub copy_height: u32,
    /// Offset of the mip in the staging buffer (256-aligned).
    pub staging_offset: u64,
    /// Staging row pitch (256-aligned, at least `row_bytes`).
    pub row_pitch: u32,
    /// Number of texel rows (block rows for compressed formats).
    pub rows: u32,
    /// Tightly packed bytes per row.
    pub row_bytes: u32,
    /// Offset of the mip in the tightly packed source data.
    pub source_offset: u64,
}

impl MipFootprint {
    pub fn source_size(&self) -> u64 {
        self.row_bytes as u64 * self.rows as u64
    }
}

/// Layout of a full mip chain in a staging buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FootprintLayout {
    pub mips: Vec<MipFootprint>,
    /// Bytes needed for the staging buffer.
    pub staging_size: u64,
    /// Bytes needed in the tightly packed source.
    pub source_size: u64,
}

fn align_to(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

/// Computes copyable footprints for every mip of a 2D texture.
pub fn copyable_footprints(
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    mip_levels: u32,
) -> Result<FootprintLayout, RenderError> {
    let (block_w, block_h) = format.block_dimensions();
    let block_size = format
        .block_copy_size(None)
        .ok_or_else(|| RenderError::resource("texture footprint", format!("{format:?} is not copyable")))?;

    if width == 0 || height == 0 || mip_levels == 0 {
        return Err(RenderError::resource(
            "texture footprint",
            format!("invalid texture {width}x{height} with {mip_levels} mips"),
        ));
    }

    let row_align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;
    let mut mips = Vec::with_capacity(mip_levels as usize);
    let mut staging_offset = 0u64;
    let mut source_offset = 0u64;

    for level in 0..mip_levels {
        let w = (width >> level).max(1);
        let h = (height >> level).max(1);
        let blocks_x = w.div_ceil(block_w);
        let blocks_y = h.div_ceil(block_h);

        let row_bytes = blocks_x * block_size;
        let row_pitch = align_to(row_bytes as u64, row_align) as u32;

        let mip = MipFootprint {
            level,
            width: w,
            height: h,
            copy_width: blocks_x * block_w,
            copy_height: blocks_y * block_h,
            staging_offset,
            row_pitch,
            rows: blocks_y,
            row_bytes,
            source_offset,
        };

        staging_offset = align_to(staging_offset + row_pitch as u64 * blocks_y as u64, row_align);
        source_offset += mip.source_size();
        mips.push(mip);
    }

    Ok(FootprintLayout {
        mips,
        staging_size: staging_offset,
        source_size: source_offset,
    })
}

/// Copies tightly packed `source` rows into `staging` at the footprint pitch.
pub fn write_footprints(layout: &FootprintLayout, source: &[u8], staging: &mut [u8]) -> Result<(), RenderError> {
    if (source.len() as u64) < layout.source_size {
        return Err(RenderError::resource(
            "texture staging",
            format!("source holds {} bytes, layout needs {}", source.len(), layout.source_size),
        ));
    }
    if (staging.len() as u64) < layout.staging_size {
        return Err(RenderError::resource(
            "texture staging",
            format!("staging holds {} bytes, layout needs {}", staging.len(), layout.staging_size),
        ));
    }

    for mip in &layout.mips {
        let row_bytes = mip.row_bytes as usize;
        for row in 0..mip.rows as usize {
            let src = mip.source_offset as usize + row * row_bytes;
            let dst = mip.staging_offset as usize + row * mip.row_pitch as usize;
            staging[dst..dst + row_bytes].copy_from_slice(&source[src..src + row_bytes]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_chain_is_row_and_offset_aligned() {
        let layout = copyable_footprints(wgpu::TextureFormat::Rgba8Unorm, 256, 256, 9).unwrap();
        assert_eq!(layout.mips.len(), 9);

        for mip in &layout.mips {
            assert_eq!(mip.staging_offset % 256, 0, "mip {}", mip.level);
            assert_eq!(mip.row_pitch % 256, 0, "mip {}", mip.level);
            assert!(mip.row_pitch >= mip.row_bytes);
            assert_eq!(mip.row_bytes, mip.width * 4);
        }

        let last = layout.mips.last().unwrap();
        assert_eq!((last.width, last.height), (1, 1));
        assert_eq!(last.row_pitch, 256);
    }

    #[test]
    fn source_offsets_are_tightly_packed() {
        let layout = copyable_footprints(wgpu::TextureFormat::Rgba8Unorm, 8, 4, 3).unwrap();
        let offsets: Vec<u64> = layout.mips.iter().map(|m| m.source_offset).collect();
        assert_eq!(offsets, vec![0, 8 * 4 * 4, 8 * 4 * 4 + 4 * 2 * 4]);
        assert_eq!(layout.source_size, 128 + 32 + 8);
    }

    #[test]
    fn block_compressed_mips_round_up_to_whole_blocks() {
        let layout = copyable_footprints(wgpu::TextureFormat::Bc1RgbaUnorm, 8, 8, 4).unwrap();
        let tail = &layout.mips[3];
        assert_eq!((tail.width, tail.height), (1, 1));
        assert_eq!((tail.copy_width, tail.copy_height), (4, 4));
        assert_eq!(tail.rows, 1);
        assert_eq!(tail.row_bytes, 8);
    }

    #[test]
    fn rows_land_at_pitch_offsets() {
        let layout = copyable_footprints(wgpu::TextureFormat::Rgba8Unorm, 2, 2, 1).unwrap();
        let source: Vec<u8> = (0..16).collect();
        let mut staging = vec![0u8; layout.staging_size as usize];
        write_footprints(&layout, &source, &mut staging).unwrap();

        assert_eq!(&staging[0..8], &source[0..8]);
        assert!(staging[8..256].iter().all(|&b| b == 0));
        assert_eq!(&staging[256..264], &source[8..16]);
    }

    #[test]
    fn short_source_is_rejected() {
        let layout = copyable_footprints(wgpu::TextureFormat::Rgba8Unorm, 4, 4, 1).unwrap();
        let mut staging = vec![0u8; layout.staging_size as usize];
        assert!(write_footprints(&layout, &[0u8; 10], &mut staging).is_err());
    }
}
