//! Dual-channel PWM core driver.
//!
//! The core has no status or identification register: configuration cannot
//! fail and compare writes are fire-and-forget.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use platform::{DutyCycleOutput, PwmChannel};

use super::HandshakeFailed;
use crate::registers::RegisterBus;

/// PWM core on a register bus.
#[derive(Debug)]
pub struct PwmCore<B> {
    bus: B,
    counter_max: u32,
}

impl<B: RegisterBus> PwmCore<B> {
    /// Bind the core. `counter_max` is the period synthesized into the core.
    pub fn configure(bus: B, counter_max: u32) -> Result<Self, HandshakeFailed> {
        Ok(Self { bus, counter_max })
    }

    /// Counter period.
    pub fn counter_max(&self) -> u32 {
        self.counter_max
    }

    /// One channel as an [`embedded_hal::pwm::SetDutyCycle`] output.
    pub fn channel(&mut self, channel: PwmChannel) -> PwmOutput<'_, B> {
        PwmOutput {
            core: self,
            channel,
        }
    }

    /// Release the bus.
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus> DutyCycleOutput for PwmCore<B> {
    fn set_duty_cycle(&mut self, channel: PwmChannel, value: u32) {
        self.bus.write32(channel.register_offset(), value);
    }
}

/// Borrowed single channel of a [`PwmCore`].
pub struct PwmOutput<'a, B> {
    core: &'a mut PwmCore<B>,
    channel: PwmChannel,
}

impl<B> ErrorType for PwmOutput<'_, B> {
    type Error = Infallible;
}

impl<B: RegisterBus> SetDutyCycle for PwmOutput<'_, B> {
    fn max_duty_cycle(&self) -> u16 {
        u16::try_from(self.core.counter_max).unwrap_or(u16::MAX)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        DutyCycleOutput::set_duty_cycle(&mut *self.core, self.channel, u32::from(duty));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registers::fake::FakeBus;

    #[test]
    fn compare_values_land_at_channel_offsets() {
        let mut pwm = PwmCore::configure(FakeBus::new(), 254).unwrap();
        DutyCycleOutput::set_duty_cycle(&mut pwm, PwmChannel::Pwm0, 190);
        DutyCycleOutput::set_duty_cycle(&mut pwm, PwmChannel::Pwm1, 63);
        let bus = pwm.release();
        assert_eq!(bus.writes, vec![(0x0, 190), (0x4, 63)]);
        assert!(bus.reads.is_empty());
    }

    #[test]
    fn embedded_hal_percent_helper_scales_to_counter_max() {
        let mut pwm = PwmCore::configure(FakeBus::new(), 1024).unwrap();
        pwm.channel(PwmChannel::Pwm1).set_duty_cycle_percent(25).unwrap();
        assert_eq!(pwm.release().writes_to(0x4), vec![256]);
    }
}
