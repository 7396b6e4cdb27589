//! The textured cube: one quad mesh and six per-face transforms.

mod mesh;
mod transform;

pub use mesh::{Vertex, FACE_INDICES, FACE_VERTICES};
pub use transform::{Camera, CubeScene, Face, TransformBlock, TRANSFORM_BLOCK_SIZE};
