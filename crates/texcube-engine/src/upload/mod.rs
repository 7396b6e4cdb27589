//! Resource uploader.
//!
//! Geometry is written through host-mapped buffers, the texture through a
//! staging buffer in copyable footprints, and per-draw transforms through a
//! host image of the constant buffer.

mod constants;
mod dds;
mod footprint;
mod geometry;
mod mapped;
mod readback;
mod texture;

pub use constants::{ConstantBuffer, TransformArena, CONSTANT_BUFFER_SIZE, SLOT_STRIDE};
pub use dds::TextureAsset;
pub use footprint::{copyable_footprints, write_footprints, FootprintLayout, MipFootprint};
pub use geometry::{
    upload_indices, upload_vertices, IndexBuffer, IndexBufferView, VertexBuffer, VertexBufferView,
};
pub use readback::{read_buffer, read_texture_rgba8, TextureReadback};
pub use texture::{upload_texture, Texture};
