//! Fixed-capacity staging buffer for captured samples.
//!
//! The buffer is an append-only view over the staging region. Samples are
//! written once per cycle, in capture order, and are never modified
//! afterwards; [`StagingBuffer::reset`] is the only way to start over.

use crate::memory_map::{StagingRegion, SAMPLE_BYTES};

/// The staging buffer has no free cell left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("staging buffer full ({capacity} samples)")]
pub struct BufferFull {
    /// Capacity of the buffer that rejected the sample.
    pub capacity: usize,
}

/// Append-only sample storage with a fixed bus address.
pub struct StagingBuffer<'a> {
    bus_address: usize,
    cells: &'a mut [u32],
    len: usize,
}

impl<'a> StagingBuffer<'a> {
    /// Wrap caller-provided storage that the transfer engine sees at
    /// `bus_address`.
    pub fn new(bus_address: usize, cells: &'a mut [u32]) -> Self {
        Self {
            bus_address,
            cells,
            len: 0,
        }
    }

    /// Bind the buffer to a physical staging region.
    ///
    /// # Safety
    ///
    /// `region` must describe RAM that is mapped 1:1 at its bus address,
    /// readable and writable by the CPU, and not referenced by anything else
    /// for the lifetime `'a` (the `STAGING` block of `memory.x` keeps the linker off it).
    pub unsafe fn from_region(region: StagingRegion) -> Self {
        // SAFETY: caller guarantees exclusive access to a mapped region;
        // `StagingRegion` guarantees 32-byte alignment (>= align_of::<u32>)
        // and that base + size does not wrap.
        let cells = unsafe {
            core::slice::from_raw_parts_mut(region.base() as *mut u32, region.capacity_samples())
        };
        Self::new(region.base(), cells)
    }

    /// Append one sample at the next free index.
    pub fn push(&mut self, value: u32) -> Result<(), BufferFull> {
        let capacity = self.cells.len();
        let slot = self.cells.get_mut(self.len).ok_or(BufferFull { capacity })?;
        *slot = value;
        self.len = self.len.saturating_add(1);
        Ok(())
    }

    /// Samples written this cycle.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if no sample has been written this cycle.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of cells.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// `true` once every cell holds a sample.
    pub fn is_full(&self) -> bool {
        self.len == self.cells.len()
    }

    /// Start a new cycle. Previously written cells are not cleared.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Bus address of cell 0.
    pub fn bus_address(&self) -> usize {
        self.bus_address
    }

    /// Bytes holding valid samples (`len * 4`).
    ///
    /// Never exceeds the storage size, so cache maintenance over this range
    /// stays inside the staging region.
    #[allow(clippy::arithmetic_side_effects)] // len <= cells.len(), a live allocation
    pub fn valid_bytes(&self) -> usize {
        self.len * SAMPLE_BYTES
    }

    /// Samples written this cycle, in capture order.
    pub fn samples(&self) -> &[u32] {
        self.cells.get(..self.len).unwrap_or_default()
    }
}

impl core::fmt::Debug for StagingBuffer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StagingBuffer")
            .field("bus_address", &format_args!("{:#x}", self.bus_address))
            .field("len", &self.len)
            .field("capacity", &self.cells.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn push_appends_in_order() {
        let mut cells = [0u32; 4];
        let mut buf = StagingBuffer::new(0x1000, &mut cells);
        buf.push(7).unwrap();
        buf.push(9).unwrap();
        assert_eq!(buf.samples(), &[7, 9]);
        assert_eq!(buf.valid_bytes(), 8);
    }

    #[test]
    fn push_past_capacity_fails_without_writing() {
        let mut cells = [0u32; 2];
        let mut buf = StagingBuffer::new(0x1000, &mut cells);
        buf.push(1).unwrap();
        buf.push(2).unwrap();
        assert!(buf.is_full());
        assert_eq!(buf.push(3), Err(BufferFull { capacity: 2 }));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.samples(), &[1, 2]);
    }

    #[test]
    fn reset_starts_a_new_cycle() {
        let mut cells = [0u32; 2];
        let mut buf = StagingBuffer::new(0x2000, &mut cells);
        buf.push(5).unwrap();
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.valid_bytes(), 0);
        assert_eq!(buf.bus_address(), 0x2000);
        buf.push(6).unwrap();
        assert_eq!(buf.samples(), &[6]);
    }

    #[test]
    fn zero_capacity_buffer_is_always_full() {
        let mut cells: [u32; 0] = [];
        let mut buf = StagingBuffer::new(0, &mut cells);
        assert!(buf.is_full());
        assert!(buf.push(1).is_err());
    }
}
