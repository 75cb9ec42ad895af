//! 32-bit register access for memory-mapped IP blocks.
//!
//! Drivers in [`crate::drivers`] are generic over [`RegisterBus`] so the
//! same driver code runs against [`Mmio`] on hardware and against a
//! recording fake in unit tests.

/// Word-wide access to one register block, addressed by byte offset.
pub trait RegisterBus {
    /// Read the register at `offset`.
    fn read32(&mut self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    fn write32(&mut self, offset: usize, value: u32);
}

/// Volatile access to a register block at a fixed physical address.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Register block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a mapped, word-aligned register block
    /// owned exclusively by the returned handle, and every offset later
    /// passed to [`RegisterBus`] must lie inside that block.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block.
    pub const fn base(&self) -> usize {
        self.base
    }

    fn ptr(&self, offset: usize) -> *mut u32 {
        self.base.wrapping_add(offset) as *mut u32
    }
}

impl RegisterBus for Mmio {
    #[inline]
    fn read32(&mut self, offset: usize) -> u32 {
        // SAFETY: `Mmio::new` contract: base + offset is a mapped register.
        unsafe { core::ptr::read_volatile(self.ptr(offset)) }
    }

    #[inline]
    fn write32(&mut self, offset: usize, value: u32) {
        // SAFETY: `Mmio::new` contract: base + offset is a mapped register.
        unsafe { core::ptr::write_volatile(self.ptr(offset), value) }
    }
}
