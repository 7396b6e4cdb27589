//! CPU/GPU synchronization.
//!
//! A fence plus a monotonically increasing counter. The renderer keeps at most
//! one frame in flight: after each submission it signals the next value and
//! blocks until the GPU has reached it.

mod fence;
mod synchronizer;

pub use fence::{Fence, QueueFence};
pub use synchronizer::{FrameSynchronizer, SyncState};

use crate::error::RenderError;

/// Blocks until `index` (and everything submitted before it) has completed.
pub(crate) fn wait_for_submission(
    device: &wgpu::Device,
    index: wgpu::SubmissionIndex,
) -> Result<(), RenderError> {
    device
        .poll(wgpu::PollType::Wait {
            submission_index: Some(index),
            timeout: None,
        })
        .map_err(RenderError::Poll)?;
    Ok(())
}
