use std::fmt;

use crate::error::RenderError;

use super::Fence;

/// Synchronizer state.
///
/// `Idle → Signaled → (Waited) → Idle`. `Waited` is only entered when the
/// fence had not reached the signaled value yet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SyncState {
    Idle,
    Signaled(u64),
    Waited(u64),
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Signaled(v) => write!(f, "Signaled({v})"),
            Self::Waited(v) => write!(f, "Waited({v})"),
        }
    }
}

/// Single-frame-in-flight CPU/GPU synchronizer.
///
/// After every submission the CPU signals the next counter value and blocks
/// until the GPU reaches it. Nothing is pipelined: the next frame is recorded
/// only once the previous one has retired, which is what makes resetting the
/// single command allocator and rewriting the transform buffer safe.
pub struct FrameSynchronizer<F: Fence> {
    fence: F,
    next_value: u64,
    state: SyncState,
    blocking_waits: u64,
    immediate_waits: u64,
}

impl<F: Fence> FrameSynchronizer<F> {
    pub fn new(fence: F) -> Self {
        Self {
            fence,
            next_value: 1,
            state: SyncState::Idle,
            blocking_waits: 0,
            immediate_waits: 0,
        }
    }

    /// Signals the next counter value on the queue. `Idle → Signaled`.
    pub fn signal(&mut self) -> Result<u64, RenderError> {
        if self.state != SyncState::Idle {
            return Err(RenderError::FenceState {
                op: "signal",
                state: self.state.to_string(),
            });
        }

        let value = self.next_value;
        self.fence.signal(value)?;
        self.next_value += 1;
        self.state = SyncState::Signaled(value);
        Ok(value)
    }

    /// Blocks until the signaled value is reached. `Signaled → (Waited) → Idle`.
    pub fn wait(&mut self) -> Result<(), RenderError> {
        let SyncState::Signaled(value) = self.state else {
            return Err(RenderError::FenceState {
                op: "wait",
                state: self.state.to_string(),
            });
        };

        if self.fence.completed_value() >= value {
            self.immediate_waits += 1;
            log::trace!("fence {value} already reached");
        } else {
            self.state = SyncState::Waited(value);
            self.fence.wait_for(value)?;
            self.blocking_waits += 1;
            log::trace!("blocked until fence {value}");
        }

        self.state = SyncState::Idle;
        Ok(())
    }

    /// Signals and waits; returns the value the GPU has now retired.
    pub fn wait_for_previous_frame(&mut self) -> Result<u64, RenderError> {
        let value = self.signal()?;
        self.wait()?;
        Ok(value)
    }

    /// Drives the synchronizer one last time before teardown so no GPU work
    /// still references resources about to be released.
    pub fn flush(&mut self) -> Result<u64, RenderError> {
        if let SyncState::Signaled(_) = self.state {
            self.wait()?;
        }
        self.wait_for_previous_frame()
    }

    /// Last value handed to the queue (0 before the first signal).
    pub fn last_signaled(&self) -> u64 {
        self.next_value - 1
    }

    pub fn completed_value(&self) -> u64 {
        self.fence.completed_value()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Number of waits that had to block.
    pub fn blocking_waits(&self) -> u64 {
        self.blocking_waits
    }

    /// Number of waits where the GPU was already done.
    pub fn immediate_waits(&self) -> u64 {
        self.immediate_waits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Completes every signal immediately, like a GPU that is never behind.
    #[derive(Default)]
    struct EagerFence {
        completed: u64,
    }

    impl Fence for EagerFence {
        fn signal(&mut self, value: u64) -> Result<(), RenderError> {
            self.completed = value;
            Ok(())
        }
        fn completed_value(&self) -> u64 {
            self.completed
        }
        fn wait_for(&mut self, _value: u64) -> Result<(), RenderError> {
            panic!("an eager fence never needs to block");
        }
    }

    /// Completes only when waited on, like a GPU that is always behind.
    #[derive(Default)]
    struct LaggingFence {
        signaled: u64,
        completed: u64,
        waits: Vec<u64>,
    }

    impl Fence for LaggingFence {
        fn signal(&mut self, value: u64) -> Result<(), RenderError> {
            self.signaled = value;
            Ok(())
        }
        fn completed_value(&self) -> u64 {
            self.completed
        }
        fn wait_for(&mut self, value: u64) -> Result<(), RenderError> {
            self.waits.push(value);
            self.completed = self.signaled;
            Ok(())
        }
    }

    /// Never completes anything.
    struct StuckFence;

    impl Fence for StuckFence {
        fn signal(&mut self, _value: u64) -> Result<(), RenderError> {
            Ok(())
        }
        fn completed_value(&self) -> u64 {
            0
        }
        fn wait_for(&mut self, value: u64) -> Result<(), RenderError> {
            Err(RenderError::FenceStalled { expected: value, completed: 0 })
        }
    }

    #[test]
    fn counter_increases_by_one_per_frame() {
        let mut sync = FrameSynchronizer::new(LaggingFence::default());
        let initial = sync.last_signaled();

        for n in 1..=5 {
            let value = sync.wait_for_previous_frame().unwrap();
            assert_eq!(value, initial + n);
            assert_eq!(sync.last_signaled(), initial + n);
        }
    }

    #[test]
    fn already_completed_fence_does_not_block() {
        let mut sync = FrameSynchronizer::new(EagerFence::default());
        sync.wait_for_previous_frame().unwrap();
        sync.wait_for_previous_frame().unwrap();

        assert_eq!(sync.immediate_waits(), 2);
        assert_eq!(sync.blocking_waits(), 0);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn lagging_fence_blocks_on_the_signaled_value() {
        let mut sync = FrameSynchronizer::new(LaggingFence::default());
        assert_eq!(sync.signal().unwrap(), 1);
        assert_eq!(sync.state(), SyncState::Signaled(1));

        sync.wait().unwrap();
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(sync.blocking_waits(), 1);
        assert_eq!(sync.completed_value(), 1);
        assert_eq!(sync.fence.waits, vec![1]);
    }

    #[test]
    fn stuck_fence_surfaces_an_error() {
        let mut sync = FrameSynchronizer::new(StuckFence);
        let err = sync.wait_for_previous_frame().unwrap_err();
        assert!(matches!(err, RenderError::FenceStalled { expected: 1, .. }));
        assert_eq!(sync.state(), SyncState::Waited(1));
    }

    #[test]
    fn signal_twice_without_wait_is_rejected() {
        let mut sync = FrameSynchronizer::new(LaggingFence::default());
        sync.signal().unwrap();
        assert!(matches!(
            sync.signal().unwrap_err(),
            RenderError::FenceState { op: "signal", .. }
        ));
    }

    #[test]
    fn wait_without_signal_is_rejected() {
        let mut sync = FrameSynchronizer::new(EagerFence::default());
        assert!(matches!(
            sync.wait().unwrap_err(),
            RenderError::FenceState { op: "wait", .. }
        ));
    }

    #[test]
    fn flush_retires_outstanding_signal_then_signals_once_more() {
        let mut sync = FrameSynchronizer::new(LaggingFence::default());
        sync.signal().unwrap();

        let value = sync.flush().unwrap();
        assert_eq!(value, 2);
        assert_eq!(sync.completed_value(), 2);
        assert_eq!(sync.state(), SyncState::Idle);
    }
}
