//! One-shot transfer engine abstraction.
//!
//! The engine moves one contiguous region per submission and reports
//! progress only through a polled busy flag and a status register. There is
//! no interrupt path.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──reset──▶ Idle ──submit──▶ Transferring ──poll──▶ Completed
//!                            ▲                                 └─▶ TimedOut
//!                            └───────────────reset───────────────────┘
//! ```
//!
//! The state machine itself is tracked by the firmware (`firmware::engine`);
//! this module only defines the vocabulary and the register-level seam.

use crate::staging::StagingBuffer;

/// Transfer direction, from the engine's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Stream into memory (S2MM channel).
    DeviceToMemory,
    /// Memory out to the stream (MM2S channel).
    MemoryToDevice,
}

/// One submission: a contiguous byte range and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferDescriptor {
    address: usize,
    length_bytes: usize,
    direction: Direction,
}

impl TransferDescriptor {
    /// Describe an arbitrary range.
    pub const fn new(address: usize, length_bytes: usize, direction: Direction) -> Self {
        Self {
            address,
            length_bytes,
            direction,
        }
    }

    /// Describe the valid samples of a staging buffer.
    ///
    /// The address is the staging base; the length is `len * 4`.
    pub fn for_staging(buffer: &StagingBuffer<'_>, direction: Direction) -> Self {
        Self::new(buffer.bus_address(), buffer.valid_bytes(), direction)
    }

    /// Bus address of the first byte.
    pub const fn address(&self) -> usize {
        self.address
    }

    /// Length in bytes.
    pub const fn length_bytes(&self) -> usize {
        self.length_bytes
    }

    /// Direction of the transfer.
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

/// Lifecycle of the transfer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Not reset since power-on.
    #[default]
    Uninitialized,
    /// Reset complete, no transfer submitted.
    Idle,
    /// A submission was accepted and has not resolved.
    Transferring,
    /// The last transfer finished within its poll budget.
    Completed,
    /// The last transfer exhausted its poll budget. Only a reset leaves this
    /// state.
    TimedOut,
}

impl EngineState {
    /// `true` if a new submission may be issued from this state.
    pub const fn accepts_submission(self) -> bool {
        matches!(self, Self::Idle | Self::Completed)
    }
}

/// The engine refused a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubmitRejected {
    /// Zero length, or longer than the engine's length register.
    #[error("invalid transfer length {0}")]
    InvalidLength(usize),
    /// Address does not fit the engine's address register.
    #[error("address {0:#x} not reachable by the engine")]
    InvalidAddress(usize),
    /// The channel is still running a previous transfer.
    #[error("channel busy")]
    ChannelBusy,
}

/// Status register value that clears every sticky flag (write-one-to-clear).
pub const CLEAR_ALL_STATUS: u32 = 0xFFFF_FFFF;

/// Channel status register bits.
pub mod status {
    /// Channel is halted (after reset, before run/stop is set).
    pub const HALTED: u32 = 1 << 0;
    /// Channel finished its last transfer.
    pub const IDLE: u32 = 1 << 1;
    /// Internal engine error. Cleared only by reset.
    pub const INTERNAL_ERROR: u32 = 1 << 4;
    /// Slave error on the memory bus. Cleared only by reset.
    pub const SLAVE_ERROR: u32 = 1 << 5;
    /// Address decode error. Cleared only by reset.
    pub const DECODE_ERROR: u32 = 1 << 6;
    /// Interrupt on complete (sticky, write-one-to-clear).
    pub const IOC_IRQ: u32 = 1 << 12;
    /// Delay interrupt (sticky, write-one-to-clear).
    pub const DELAY_IRQ: u32 = 1 << 13;
    /// Error interrupt (sticky, write-one-to-clear).
    pub const ERROR_IRQ: u32 = 1 << 14;

    /// Bits cleared by writing ones.
    pub const IRQ_MASK: u32 = IOC_IRQ | DELAY_IRQ | ERROR_IRQ;
    /// Error bits that only a reset clears.
    pub const ERROR_MASK: u32 = INTERNAL_ERROR | SLAVE_ERROR | DECODE_ERROR;
}

/// Register-level contract of a one-shot transfer engine.
///
/// Implemented by `firmware::drivers::axi_dma::AxiDma` for the real IP and
/// by `mocks::MockEngine` on the host.
pub trait TransferEngine {
    /// Request a soft reset. The request bit is self-clearing.
    fn start_reset(&mut self);

    /// `true` once the reset requested by [`start_reset`](Self::start_reset)
    /// has completed.
    fn reset_done(&mut self) -> bool;

    /// Raw status register of the channel serving `direction`.
    fn read_status(&mut self, direction: Direction) -> u32;

    /// Write the status register of the channel serving `direction`.
    fn write_status(&mut self, direction: Direction, value: u32);

    /// Program and start one transfer.
    fn submit(&mut self, descriptor: &TransferDescriptor) -> Result<(), SubmitRejected>;

    /// `true` while the channel serving `direction` is still transferring.
    fn busy(&mut self, direction: Direction) -> bool;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_and_completed_accept_submission() {
        assert!(EngineState::Idle.accepts_submission());
        assert!(EngineState::Completed.accepts_submission());
        assert!(!EngineState::Uninitialized.accepts_submission());
        assert!(!EngineState::Transferring.accepts_submission());
        assert!(!EngineState::TimedOut.accepts_submission());
    }

    #[test]
    fn descriptor_covers_exactly_the_valid_samples() {
        let mut cells = [0u32; 8];
        let mut buf = StagingBuffer::new(0x0020_0000, &mut cells);
        for v in 0..3 {
            buf.push(v).unwrap();
        }
        let d = TransferDescriptor::for_staging(&buf, Direction::DeviceToMemory);
        assert_eq!(d.address(), 0x0020_0000);
        assert_eq!(d.length_bytes(), 12);
        assert_eq!(d.direction(), Direction::DeviceToMemory);
    }
}
