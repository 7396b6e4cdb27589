//! Device context.
//!
//! This module is responsible for:
//! - enumerating adapters and selecting one that meets the feature level
//! - creating the wgpu Instance/Device/Queue
//! - enabling the validation layer in diagnostic builds

mod adapter;
mod context;
mod init;

pub use adapter::{select_adapter, AdapterCandidate, AdapterChoice, FeatureLevel};
pub use context::DeviceContext;
pub use init::DeviceInit;
