//! Command recording and submission.

mod allocator;
mod recorder;

pub use allocator::CommandAllocator;
pub use recorder::{
    record_draws, DrawResources, FrameRecorder, FrameReport, CLEAR_COLOR, CLEAR_DEPTH,
};
