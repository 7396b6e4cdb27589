use std::path::PathBuf;

use thiserror::Error;

use crate::device::FeatureLevel;
use crate::swapchain::TargetState;

/// Fatal failure raised by the frame pipeline.
///
/// Nothing inside the engine recovers from a `RenderError`. Every fallible call
/// returns one at its call site and the runtime shuts down when it sees it.
#[derive(Debug, Error)]
pub enum RenderError {
    // ── device ────────────────────────────────────────────────────────────
    #[error("no {kind} adapter supports feature level {level:?}")]
    NoSuitableAdapter {
        kind: &'static str,
        level: FeatureLevel,
    },

    #[error("failed to create device on adapter `{adapter}`")]
    RequestDevice {
        adapter: String,
        #[source]
        source: wgpu::RequestDeviceError,
    },

    #[error("failed to create presentation surface")]
    CreateSurface(#[source] wgpu::CreateSurfaceError),

    #[error("adapter `{adapter}` cannot present to this surface")]
    SurfaceUnsupported { adapter: String },

    // ── resources ─────────────────────────────────────────────────────────
    #[error("resource `{label}`: {reason}")]
    Resource { label: &'static str, reason: String },

    #[error("failed to map buffer `{label}`")]
    Map {
        label: &'static str,
        #[source]
        source: wgpu::BufferAsyncError,
    },

    #[error("transform slot {slot} is outside the constant buffer ({capacity} slots)")]
    SlotOutOfRange { slot: usize, capacity: usize },

    // ── shaders / assets ──────────────────────────────────────────────────
    #[error("shader `{path}` failed to compile:\n{message}")]
    ShaderCompile { path: PathBuf, message: String },

    #[error("failed to read asset `{path}`")]
    AssetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("asset `{path}`: {reason}")]
    Asset { path: PathBuf, reason: String },

    // ── synchronization ───────────────────────────────────────────────────
    #[error("device poll failed")]
    Poll(#[source] wgpu::PollError),

    #[error("fence stalled: waited for {expected}, completed value is {completed}")]
    FenceStalled { expected: u64, completed: u64 },

    #[error("fence operation `{op}` is not valid in state {state}")]
    FenceState { op: &'static str, state: String },

    // ── presentation ──────────────────────────────────────────────────────
    #[error("failed to acquire back buffer")]
    Acquire(#[source] wgpu::SurfaceError),

    // ── frame pipeline ────────────────────────────────────────────────────
    #[error("back buffer {index} does not exist ({count} buffers)")]
    TargetIndex { index: usize, count: usize },

    #[error("frame target {bound} was bound but the surface's current buffer is {current}")]
    TargetMismatch { bound: usize, current: usize },

    #[error("frame target {index} is {found:?}, expected {expected:?}")]
    TargetState {
        index: usize,
        expected: TargetState,
        found: TargetState,
    },

    #[error("frame target {index} cannot begin rendering while target {busy} is being rendered")]
    TargetBusy { index: usize, busy: usize },

    #[error("render-target view for buffer {index} was never registered")]
    TargetViewMissing { index: usize },

    #[error(
        "command allocator `{label}` reset while its recording (fence {recorded_at}) is in flight \
         (completed {completed})"
    )]
    AllocatorInFlight {
        label: &'static str,
        recorded_at: u64,
        completed: u64,
    },
}

/// Failure category, used by the runtime for logging and exit reporting.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    Device,
    Resource,
    Shader,
    Asset,
    Sync,
    Present,
    FramePipeline,
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSuitableAdapter { .. }
            | Self::RequestDevice { .. }
            | Self::CreateSurface(_)
            | Self::SurfaceUnsupported { .. } => ErrorKind::Device,
            Self::Resource { .. } | Self::Map { .. } | Self::SlotOutOfRange { .. } => {
                ErrorKind::Resource
            }
            Self::ShaderCompile { .. } => ErrorKind::Shader,
            Self::AssetIo { .. } | Self::Asset { .. } => ErrorKind::Asset,
            Self::Poll(_) | Self::FenceStalled { .. } | Self::FenceState { .. } => ErrorKind::Sync,
            Self::Acquire(_) => ErrorKind::Present,
            Self::TargetIndex { .. }
            | Self::TargetMismatch { .. }
            | Self::TargetState { .. }
            | Self::TargetBusy { .. }
            | Self::TargetViewMissing { .. }
            | Self::AllocatorInFlight { .. } => ErrorKind::FramePipeline,
        }
    }

    pub(crate) fn asset(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Asset {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn resource(label: &'static str, reason: impl Into<String>) -> Self {
        Self::Resource {
            label,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_failure_taxonomy() {
        let no_adapter = RenderError::NoSuitableAdapter {
            kind: "hardware",
            level: FeatureLevel::Core,
        };
        assert_eq!(no_adapter.kind(), ErrorKind::Device);

        assert_eq!(
            RenderError::SlotOutOfRange { slot: 6, capacity: 6 }.kind(),
            ErrorKind::Resource
        );
        assert_eq!(
            RenderError::asset("texture.dds", "truncated").kind(),
            ErrorKind::Asset
        );
        assert_eq!(
            RenderError::FenceStalled { expected: 3, completed: 2 }.kind(),
            ErrorKind::Sync
        );
        assert_eq!(
            RenderError::TargetMismatch { bound: 0, current: 1 }.kind(),
            ErrorKind::FramePipeline
        );
    }

    #[test]
    fn messages_name_the_offending_values() {
        let err = RenderError::AllocatorInFlight {
            label: "frame",
            recorded_at: 7,
            completed: 6,
        };
        let msg = err.to_string();
        assert!(msg.contains("`frame`"));
        assert!(msg.contains("fence 7"));
        assert!(msg.contains("completed 6"));
    }
}
