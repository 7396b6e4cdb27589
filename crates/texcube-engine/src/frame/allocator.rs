use crate::error::RenderError;

/// Command allocator.
///
/// wgpu encoders are one-shot, so there is no memory pool to recycle; what is
/// kept is the rule that a recording may only start once the GPU has retired
/// the previous one, tracked by the fence value that retires it.
#[derive(Debug)]
pub struct CommandAllocator {
    label: &'static str,
    retires_at: Option<u64>,
    recordings: u64,
}

impl CommandAllocator {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            retires_at: None,
            recordings: 0,
        }
    }

    /// Makes the allocator available for a new recording.
    ///
    /// Fails while the fence has not reached the value of the last recording.
    pub fn reset(&mut self, completed: u64) -> Result<(), RenderError> {
        if let Some(recorded_at) = self.retires_at {
            if completed < recorded_at {
                return Err(RenderError::AllocatorInFlight {
                    label: self.label,
                    recorded_at,
                    completed,
                });
            }
        }
        self.retires_at = None;
        Ok(())
    }

    /// Opens a command encoder for a new recording.
    pub fn begin(&mut self, device: &wgpu::Device) -> wgpu::CommandEncoder {
        self.recordings += 1;
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(self.label),
        })
    }

    /// Records that the last submission retires once the fence reaches `value`.
    pub fn retire_after(&mut self, value: u64) {
        self.retires_at = Some(value);
    }

    pub fn in_flight_until(&self) -> Option<u64> {
        self.retires_at
    }

    pub fn recordings(&self) -> u64 {
        self.recordings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_allocator_resets() {
        let mut alloc = CommandAllocator::new("frame");
        alloc.reset(0).unwrap();
        assert_eq!(alloc.in_flight_until(), None);
    }

    #[test]
    fn reset_is_rejected_while_in_flight() {
        let mut alloc = CommandAllocator::new("frame");
        alloc.retire_after(4);

        let err = alloc.reset(3).unwrap_err();
        assert!(matches!(
            err,
            RenderError::AllocatorInFlight {
                label: "frame",
                recorded_at: 4,
                completed: 3,
            }
        ));
        assert_eq!(alloc.in_flight_until(), Some(4));
    }

    #[test]
    fn reset_succeeds_once_retired() {
        let mut alloc = CommandAllocator::new("frame");
        alloc.retire_after(4);
        alloc.reset(4).unwrap();
        assert_eq!(alloc.in_flight_until(), None);
    }
}
