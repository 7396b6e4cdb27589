use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use ddsfile::{D3DFormat, Dds, DxgiFormat};

use crate::error::RenderError;

use super::footprint::{copyable_footprints, FootprintLayout};

/// Texture decoded from a DDS container: format, size and mip chain come from
/// the file, pixel data is kept tightly packed mip after mip.
#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub path: PathBuf,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub data: Vec<u8>,
}

impl TextureAsset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RenderError::AssetIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, BufReader::new(file))
    }

    /// Parses a DDS stream. `path` is only used for error reporting.
    pub fn from_reader(path: impl AsRef<Path>, mut reader: impl Read) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let dds = Dds::read(&mut reader)
            .map_err(|e| RenderError::asset(path, format!("not a DDS file: {e}")))?;

        let format = wgpu_format(&dds).ok_or_else(|| {
            RenderError::asset(path, format!("unsupported pixel format {}", describe_format(&dds)))
        })?;

        if dds.get_depth() > 1 || dds.get_num_array_layers() > 1 {
            return Err(RenderError::asset(path, "only single 2D textures are supported"));
        }

        let width = dds.get_width();
        let height = dds.get_height();
        let mip_levels = dds.get_num_mipmap_levels().max(1);

        let (block_w, block_h) = format.block_dimensions();
        if width % block_w != 0 || height % block_h != 0 {
            return Err(RenderError::asset(
                path,
                format!("{width}x{height} is not a multiple of the {block_w}x{block_h} block size"),
            ));
        }
        let max_mips = 32 - width.max(height).leading_zeros();
        if mip_levels > max_mips {
            return Err(RenderError::asset(
                path,
                format!("{mip_levels} mips declared, a {width}x{height} texture has at most {max_mips}"),
            ));
        }

        let layout = copyable_footprints(format, width, height, mip_levels)
            .map_err(|e| RenderError::asset(path, e.to_string()))?;
        let expected = layout.source_size as usize;
        if dds.data.len() < expected {
            return Err(RenderError::asset(
                path,
                format!("truncated pixel data: {} bytes, expected {expected}", dds.data.len()),
            ));
        }

        let mut data = dds.data;
        data.truncate(expected);

        log::debug!(
            "loaded texture `{}`: {width}x{height} {format:?}, {mip_levels} mips",
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            format,
            width,
            height,
            mip_levels,
            data,
        })
    }

    pub fn footprints(&self) -> Result<FootprintLayout, RenderError> {
        copyable_footprints(self.format, self.width, self.height, self.mip_levels)
    }
}

fn wgpu_format(dds: &Dds) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat as T;

    if let Some(dxgi) = dds.get_dxgi_format() {
        return Some(match dxgi {
            DxgiFormat::R8G8B8A8_UNorm => T::Rgba8Unorm,
            DxgiFormat::R8G8B8A8_UNorm_sRGB => T::Rgba8UnormSrgb,
            DxgiFormat::B8G8R8A8_UNorm => T::Bgra8Unorm,
            DxgiFormat::B8G8R8A8_UNorm_sRGB => T::Bgra8UnormSrgb,
            DxgiFormat::BC1_UNorm => T::Bc1RgbaUnorm,
            DxgiFormat::BC1_UNorm_sRGB => T::Bc1RgbaUnormSrgb,
            DxgiFormat::BC2_UNorm => T::Bc2RgbaUnorm,
            DxgiFormat::BC2_UNorm_sRGB => T::Bc2RgbaUnormSrgb,
            DxgiFormat::BC3_UNorm => T::Bc3RgbaUnorm,
            DxgiFormat::BC3_UNorm_sRGB => T::Bc3RgbaUnormSrgb,
            DxgiFormat::BC4_UNorm => T::Bc4RUnorm,
            DxgiFormat::BC4_SNorm => T::Bc4RSnorm,
            DxgiFormat::BC5_UNorm => T::Bc5RgUnorm,
            DxgiFormat::BC5_SNorm => T::Bc5RgSnorm,
            DxgiFormat::BC7_UNorm => T::Bc7RgbaUnorm,
            DxgiFormat::BC7_UNorm_sRGB => T::Bc7RgbaUnormSrgb,
            _ => return None,
        });
    }

    match dds.get_d3d_format()? {
        D3DFormat::A8B8G8R8 => Some(T::Rgba8Unorm),
        D3DFormat::A8R8G8B8 => Some(T::Bgra8Unorm),
        D3DFormat::DXT1 => Some(T::Bc1RgbaUnorm),
        D3DFormat::DXT3 => Some(T::Bc2RgbaUnorm),
        D3DFormat::DXT5 => Some(T::Bc3RgbaUnorm),
        _ => None,
    }
}

fn describe_format(dds: &Dds) -> String {
    if let Some(dxgi) = dds.get_dxgi_format() {
        format!("{dxgi:?}")
    } else if let Some(d3d) = dds.get_d3d_format() {
        format!("{d3d:?}")
    } else {
        "unknown".to_owned()
    }
}
