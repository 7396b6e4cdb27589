use crate::error::RenderError;

/// Size of the constant buffer allocation.
pub const CONSTANT_BUFFER_SIZE: u64 = 64 * 1024;

/// Distance between transform slots; the uniform offset alignment.
pub const SLOT_STRIDE: u64 = 256;

/// Host-side, write-only image of the constant buffer.
///
/// Slot `i` lives at `[i * SLOT_STRIDE, i * SLOT_STRIDE + block_size)`. Writes
/// never touch the padding between blocks.
#[derive(Debug, Clone)]
pub struct TransformArena {
    bytes: Vec<u8>,
    slot_count: usize,
    block_size: usize,
}

impl TransformArena {
    pub fn new(slot_count: usize, block_size: usize) -> Result<Self, RenderError> {
        if block_size == 0 || block_size as u64 > SLOT_STRIDE {
            return Err(RenderError::resource(
                "constant buffer",
                format!("block of {block_size} bytes does not fit a {SLOT_STRIDE}-byte slot"),
            ));
        }
        let size = slot_count as u64 * SLOT_STRIDE;
        if slot_count == 0 || size > CONSTANT_BUFFER_SIZE {
            return Err(RenderError::resource(
                "constant buffer",
                format!("{slot_count} slots do not fit in {CONSTANT_BUFFER_SIZE} bytes"),
            ));
        }

        Ok(Self {
            bytes: vec![0; size as usize],
            slot_count,
            block_size,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Byte offset of `slot`, used as the dynamic uniform offset.
    pub fn offset(&self, slot: usize) -> Result<u32, RenderError> {
        self.check_slot(slot)?;
        Ok((slot as u64 * SLOT_STRIDE) as u32)
    }

    pub fn write_slot(&mut self, slot: usize, block: &[u8]) -> Result<(), RenderError> {
        self.check_slot(slot)?;
        if block.len() != self.block_size {
            return Err(RenderError::resource(
                "constant buffer",
                format!("slot write of {} bytes, blocks are {}", block.len(), self.block_size),
            ));
        }
        let start = slot * SLOT_STRIDE as usize;
        self.bytes[start..start + self.block_size].copy_from_slice(block);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn check_slot(&self, slot: usize) -> Result<(), RenderError> {
        if slot >= self.slot_count {
            return Err(RenderError::SlotOutOfRange {
                slot,
                capacity: self.slot_count,
            });
        }
        Ok(())
    }
}

/// The per-draw transform buffer.
///
/// Allocated once at [`CONSTANT_BUFFER_SIZE`] and never reallocated. The host
/// writes slots into its [`TransformArena`]; `flush` copies the arena to the
/// GPU buffer ahead of the frame's submission.
pub struct ConstantBuffer {
    buffer: wgpu::Buffer,
    arena: TransformArena,
}

impl ConstantBuffer {
    pub fn new(device: &wgpu::Device, slot_count: usize, block_size: usize) -> Result<Self, RenderError> {
        let arena = TransformArena::new(slot_count, block_size)?;

        let limits = device.limits();
        if (limits.min_uniform_buffer_offset_alignment as u64) > SLOT_STRIDE {
            return Err(RenderError::resource(
                "constant buffer",
                format!(
                    "uniform offset alignment {} exceeds the slot stride",
                    limits.min_uniform_buffer_offset_alignment
                ),
            ));
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("texcube transforms"),
            size: CONSTANT_BUFFER_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        Ok(Self { buffer, arena })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn arena(&self) -> &TransformArena {
        &self.arena
    }

    pub fn write_slot(&mut self, slot: usize, block: &[u8]) -> Result<(), RenderError> {
        self.arena.write_slot(slot, block)
    }

    pub fn offset(&self, slot: usize) -> Result<u32, RenderError> {
        self.arena.offset(slot)
    }

    /// Binding size of one slot.
    pub fn binding_size(&self) -> wgpu::BufferSize {
        wgpu::BufferSize::new(self.arena.block_size() as u64).unwrap_or(wgpu::BufferSize::MIN)
    }

    /// Copies the host image into the GPU buffer.
    pub fn flush(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, self.arena.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: usize = 240;

    #[test]
    fn writing_a_slot_touches_only_its_block() {
        for slot in 0..6 {
            let mut arena = TransformArena::new(6, BLOCK).unwrap();
            let before = arena.as_bytes().to_vec();

            arena.write_slot(slot, &[0xAB; BLOCK]).unwrap();
            let after = arena.as_bytes();

            let start = slot * 256;
            for (i, (a, b)) in before.iter().zip(after).enumerate() {
                let inside = (start..start + BLOCK).contains(&i);
                if inside {
                    assert_eq!(*b, 0xAB, "slot {slot} byte {i}");
                } else {
                    assert_eq!(a, b, "slot {slot} touched byte {i}");
                }
            }
        }
    }

    #[test]
    fn offsets_step_by_256() {
        let arena = TransformArena::new(6, BLOCK).unwrap();
        let offsets: Vec<u32> = (0..6).map(|s| arena.offset(s).unwrap()).collect();
        assert_eq!(offsets, vec![0, 256, 512, 768, 1024, 1280]);
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let mut arena = TransformArena::new(6, BLOCK).unwrap();
        assert!(matches!(
            arena.write_slot(6, &[0; BLOCK]).unwrap_err(),
            RenderError::SlotOutOfRange { slot: 6, capacity: 6 }
        ));
    }

    #[test]
    fn block_size_is_enforced() {
        let mut arena = TransformArena::new(6, BLOCK).unwrap();
        assert!(arena.write_slot(0, &[0; 256]).is_err());
        assert!(TransformArena::new(6, 300).is_err());
    }

    #[test]
    fn slots_must_fit_in_64_kib() {
        assert!(TransformArena::new(256, BLOCK).is_ok());
        assert!(TransformArena::new(257, BLOCK).is_err());
    }
}
