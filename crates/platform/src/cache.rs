//! Data cache maintenance for buffers shared with a bus master.
//!
//! The CPU writes samples through the data cache; the transfer engine reads
//! and writes memory directly. Before a submission the written range must be
//! flushed (cleaned) to memory, and after the transfer resolves the range
//! must be invalidated so later CPU reads observe what the engine left there.

use crate::memory_map::CACHE_LINE_BYTES;

/// Range-based data cache maintenance.
///
/// Both operations cover every cache line that intersects
/// `[address, address + len)`. A zero-length range is a no-op.
pub trait CacheMaintenance {
    /// Write back dirty lines in the range to memory.
    fn flush_range(&mut self, address: usize, len: usize);

    /// Discard cached copies of the range.
    fn invalidate_range(&mut self, address: usize, len: usize);
}

/// Line-aligned span covering `[address, address + len)`.
///
/// Returns `(aligned_start, aligned_len)`, or `None` for an empty range or
/// one that wraps the address space.
pub fn line_span(address: usize, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let mask = CACHE_LINE_BYTES.wrapping_sub(1);
    let start = address & !mask;
    let end = address
        .checked_add(len)?
        .checked_add(mask)
        .map(|e| e & !mask)?;
    Some((start, end.wrapping_sub(start)))
}
