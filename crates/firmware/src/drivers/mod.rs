//! Register-level drivers for the capture fabric's IP blocks.
//!
//! Each driver owns a [`RegisterBus`](crate::registers::RegisterBus) and
//! offers a `configure` constructor that performs the block's register
//! handshake. Bootstrap picks the base address from the hardware
//! description and hands it to these constructors.

pub mod axi_dma;
pub mod pwm_core;
pub mod sysmon;

pub use axi_dma::AxiDma;
pub use pwm_core::PwmCore;
pub use sysmon::SysMon;

/// A register block did not answer like the expected IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("register handshake failed ({0:#x} read back)")]
pub struct HandshakeFailed(pub u32);

/// Value read back from an address with no responding slave.
pub(crate) const BUS_FLOAT: u32 = 0xFFFF_FFFF;
