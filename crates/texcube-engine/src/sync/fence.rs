use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::RenderError;

/// GPU-to-CPU completion counter.
///
/// The queue is asked to set the fence to a value once all work submitted
/// before the request has finished. Values are monotonically increasing.
pub trait Fence {
    /// Requests that the fence reaches `value` when the queue drains up to now.
    fn signal(&mut self, value: u64) -> Result<(), RenderError>;

    /// Highest value the GPU has reached.
    fn completed_value(&self) -> u64;

    /// Blocks the calling thread until `completed_value() >= value`.
    fn wait_for(&mut self, value: u64) -> Result<(), RenderError>;
}

/// Fence backed by the wgpu queue.
///
/// Completion is recorded by a queue work-done callback; waiting blocks in
/// `Device::poll` on the submission that carries the signal.
pub struct QueueFence {
    device: wgpu::Device,
    queue: wgpu::Queue,
    completed: Arc<AtomicU64>,
    pending: Option<(u64, wgpu::SubmissionIndex)>,
}

impl QueueFence {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            completed: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }
}

impl Fence for QueueFence {
    fn signal(&mut self, value: u64) -> Result<(), RenderError> {
        let completed = Arc::clone(&self.completed);
        self.queue.on_submitted_work_done(move || {
            completed.fetch_max(value, Ordering::AcqRel);
        });

        // An empty submission gives an index that orders after all prior work.
        let index = self.queue.submit(std::iter::empty());
        self.pending = Some((value, index));
        Ok(())
    }

    fn completed_value(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    fn wait_for(&mut self, value: u64) -> Result<(), RenderError> {
        if self.completed_value() >= value {
            return Ok(());
        }

        let Some((signaled, index)) = self.pending.take() else {
            return Err(RenderError::FenceStalled {
                expected: value,
                completed: self.completed_value(),
            });
        };

        if signaled < value {
            return Err(RenderError::FenceStalled {
                expected: value,
                completed: self.completed_value(),
            });
        }

        super::wait_for_submission(&self.device, index)?;

        let completed = self.completed_value();
        if completed < value {
            return Err(RenderError::FenceStalled {
                expected: value,
                completed,
            });
        }
        Ok(())
    }
}
