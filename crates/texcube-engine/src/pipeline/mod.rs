//! Pipeline state: binding layout, shaders and fixed-function state.

mod layout;
mod shader;
mod state;

pub use layout::{RootSignature, CONSTANTS_GROUP, TEXTURE_GROUP};
pub use shader::{ShaderSource, FRAGMENT_ENTRY, VERTEX_ENTRY};
pub use state::PipelineState;
