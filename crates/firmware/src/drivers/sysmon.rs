//! System monitor (XADC-style) driver.
//!
//! The monitor converts continuously; the driver only reads the latest
//! result register of a channel. No sequencer programming is done here:
//! the power-on sequence already covers the on-chip sensors and the
//! auxiliary inputs the board uses.

use platform::{AdcChannel, AnalogFrontEnd};

use super::{HandshakeFailed, BUS_FLOAT};
use crate::registers::RegisterBus;

/// Software reset register.
pub const SRR: usize = 0x00;
/// Status register.
pub const SR: usize = 0x04;
/// First conversion result register; channel `n` is at `DATA_BASE + 4n`.
pub const DATA_BASE: usize = 0x200;

/// Key written to [`SRR`] to reset the monitor core.
pub const RESET_KEY: u32 = 0x0000_000A;

/// System monitor on a register bus.
#[derive(Debug)]
pub struct SysMon<B> {
    bus: B,
}

impl<B: RegisterBus> SysMon<B> {
    /// Reset the core and check that it answers.
    pub fn configure(mut bus: B) -> Result<Self, HandshakeFailed> {
        bus.write32(SRR, RESET_KEY);
        let status = bus.read32(SR);
        if status == BUS_FLOAT {
            return Err(HandshakeFailed(status));
        }
        Ok(Self { bus })
    }

    /// Result register offset of `channel`.
    pub const fn data_offset(channel: AdcChannel) -> usize {
        #[allow(clippy::arithmetic_side_effects)] // channel <= 31: offset <= 0x27C
        let offset = DATA_BASE + (channel.number() as usize) * 4;
        offset
    }

    /// Release the bus.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus> AnalogFrontEnd for SysMon<B> {
    #[inline]
    fn read_raw(&mut self, channel: AdcChannel) -> u16 {
        (self.bus.read32(Self::data_offset(channel)) & 0xFFFF) as u16
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registers::fake::FakeBus;

    #[test]
    fn configure_resets_the_core() {
        let mon = SysMon::configure(FakeBus::new()).unwrap();
        let bus = mon.release();
        assert_eq!(bus.writes_to(SRR), vec![RESET_KEY]);
    }

    #[test]
    fn absent_block_fails_handshake() {
        let mut bus = FakeBus::new();
        bus.set(SR, 0xFFFF_FFFF);
        assert_eq!(
            SysMon::configure(bus).unwrap_err(),
            HandshakeFailed(0xFFFF_FFFF)
        );
    }

    #[test]
    fn reads_the_channel_result_register() {
        let mut bus = FakeBus::new();
        bus.set(0x240, 0xDEAD_8010);
        bus.set(0x244, 0x0000_1230);
        let mut mon = SysMon::configure(bus).unwrap();
        assert_eq!(mon.read_raw(AdcChannel::AUX_MIN), 0x8010);
        assert_eq!(mon.read_raw(AdcChannel::aux(1).unwrap()), 0x1230);
    }

    #[test]
    fn data_offsets_follow_channel_numbers() {
        assert_eq!(SysMon::<FakeBus>::data_offset(AdcChannel::TEMPERATURE), 0x200);
        assert_eq!(SysMon::<FakeBus>::data_offset(AdcChannel::VCCINT), 0x204);
        assert_eq!(SysMon::<FakeBus>::data_offset(AdcChannel::VP_VN), 0x20C);
        assert_eq!(SysMon::<FakeBus>::data_offset(AdcChannel::AUX_MIN), 0x240);
    }
}
