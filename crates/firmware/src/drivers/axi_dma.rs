//! AXI-DMA-style one-shot transfer engine driver (direct register mode).
//!
//! ## Register map
//!
//! | Offset | Name         | Channel |
//! |--------|--------------|---------|
//! | 0x00   | MM2S_DMACR   | memory → stream control |
//! | 0x04   | MM2S_DMASR   | memory → stream status  |
//! | 0x18   | MM2S_SA      | source address          |
//! | 0x28   | MM2S_LENGTH  | length, write starts    |
//! | 0x30   | S2MM_DMACR   | stream → memory control |
//! | 0x34   | S2MM_DMASR   | stream → memory status  |
//! | 0x48   | S2MM_DA      | destination address     |
//! | 0x58   | S2MM_LENGTH  | length, write starts    |
//!
//! A reset requested on either channel resets the whole core; the reset bit
//! reads back as 1 until the core is done.

use platform::transfer::status;
use platform::{Direction, SubmitRejected, TransferDescriptor, TransferEngine};

use super::{HandshakeFailed, BUS_FLOAT};
use crate::registers::RegisterBus;

/// MM2S control register.
pub const MM2S_DMACR: usize = 0x00;
/// MM2S status register.
pub const MM2S_DMASR: usize = 0x04;
/// MM2S source address.
pub const MM2S_SA: usize = 0x18;
/// MM2S transfer length.
pub const MM2S_LENGTH: usize = 0x28;
/// S2MM control register.
pub const S2MM_DMACR: usize = 0x30;
/// S2MM status register.
pub const S2MM_DMASR: usize = 0x34;
/// S2MM destination address.
pub const S2MM_DA: usize = 0x48;
/// S2MM transfer length.
pub const S2MM_LENGTH: usize = 0x58;

/// Control register: run/stop.
pub const CR_RUN_STOP: u32 = 1 << 0;
/// Control register: soft reset (self-clearing).
pub const CR_RESET: u32 = 1 << 2;

/// Width of the length registers as synthesized on this board.
pub const LENGTH_REGISTER_BITS: u32 = 26;

struct ChannelRegs {
    control: usize,
    status: usize,
    address: usize,
    length: usize,
}

const fn channel(direction: Direction) -> ChannelRegs {
    match direction {
        Direction::MemoryToDevice => ChannelRegs {
            control: MM2S_DMACR,
            status: MM2S_DMASR,
            address: MM2S_SA,
            length: MM2S_LENGTH,
        },
        Direction::DeviceToMemory => ChannelRegs {
            control: S2MM_DMACR,
            status: S2MM_DMASR,
            address: S2MM_DA,
            length: S2MM_LENGTH,
        },
    }
}

/// Transfer engine on a register bus.
#[derive(Debug)]
pub struct AxiDma<B> {
    bus: B,
    max_length: usize,
}

impl<B: RegisterBus> AxiDma<B> {
    /// Check that the core answers. Does not reset it.
    pub fn configure(mut bus: B) -> Result<Self, HandshakeFailed> {
        let sr = bus.read32(MM2S_DMASR);
        if sr == BUS_FLOAT {
            return Err(HandshakeFailed(sr));
        }
        Ok(Self {
            bus,
            max_length: (1usize << LENGTH_REGISTER_BITS).wrapping_sub(1),
        })
    }

    /// Longest transfer the length register accepts, in bytes.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Release the bus.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus> TransferEngine for AxiDma<B> {
    fn start_reset(&mut self) {
        self.bus.write32(MM2S_DMACR, CR_RESET);
    }

    fn reset_done(&mut self) -> bool {
        let tx = self.bus.read32(MM2S_DMACR);
        let rx = self.bus.read32(S2MM_DMACR);
        (tx | rx) & CR_RESET == 0
    }

    fn read_status(&mut self, direction: Direction) -> u32 {
        self.bus.read32(channel(direction).status)
    }

    fn write_status(&mut self, direction: Direction, value: u32) {
        self.bus.write32(channel(direction).status, value);
    }

    fn submit(&mut self, descriptor: &TransferDescriptor) -> Result<(), SubmitRejected> {
        let len = descriptor.length_bytes();
        if len == 0 || len > self.max_length {
            return Err(SubmitRejected::InvalidLength(len));
        }
        let len32 = u32::try_from(len).map_err(|_| SubmitRejected::InvalidLength(len))?;
        let address = u32::try_from(descriptor.address())
            .map_err(|_| SubmitRejected::InvalidAddress(descriptor.address()))?;
        let regs = channel(descriptor.direction());

        // A running channel that is not idle still owns its descriptor.
        let sr = self.bus.read32(regs.status);
        if sr & (status::HALTED | status::IDLE) == 0 {
            return Err(SubmitRejected::ChannelBusy);
        }

        let cr = self.bus.read32(regs.control);
        self.bus.write32(regs.control, cr | CR_RUN_STOP);
        self.bus.write32(regs.address, address);
        self.bus.write32(regs.length, len32);
        Ok(())
    }

    /// Done once the channel is idle and has raised its completion flag.
    ///
    /// The completion flag is write-one-to-clear and is cleared before every
    /// submission, so an `IDLE` left over from the previous transfer alone
    /// never reads as done.
    fn busy(&mut self, direction: Direction) -> bool {
        const DONE: u32 = status::IDLE | status::IOC_IRQ;
        self.bus.read32(channel(direction).status) & DONE != DONE
    }
}
