//! Dual-channel PWM actuator interface.
//!
//! The PWM core exposes one 32-bit compare register per channel. Writing a
//! value sets the duty cycle to `value / counter_max`; there is no readback
//! and no acknowledgement.

/// Output channel of the PWM core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    /// Compare register at offset 0.
    Pwm0,
    /// Compare register at offset 4.
    Pwm1,
}

impl PwmChannel {
    /// Byte offset of the channel's compare register.
    pub const fn register_offset(self) -> usize {
        match self {
            Self::Pwm0 => 0x0,
            Self::Pwm1 => 0x4,
        }
    }
}

/// Sink for duty-cycle compare values.
pub trait DutyCycleOutput {
    /// Write `value` to `channel`'s compare register.
    fn set_duty_cycle(&mut self, channel: PwmChannel, value: u32);
}

/// A compare value for one PWM channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle(pub u32);

impl DutyCycle {
    /// `counter_max * numerator / denominator`, truncated.
    ///
    /// 75% of 254 is 190; 25% of 1024 is 256. A zero denominator yields 0.
    pub fn fraction(counter_max: u32, numerator: u32, denominator: u32) -> Self {
        let scaled = u64::from(counter_max)
            .saturating_mul(u64::from(numerator))
            .checked_div(u64::from(denominator))
            .unwrap_or(0);
        Self(u32::try_from(scaled).unwrap_or(u32::MAX))
    }

    /// Compare register value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Duty-cycle configuration applied once, before sampling starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorSetup {
    /// Counter period of the PWM core.
    pub counter_max: u32,
    /// Compare value for [`PwmChannel::Pwm0`].
    pub pwm0: DutyCycle,
    /// Compare value for [`PwmChannel::Pwm1`].
    pub pwm1: DutyCycle,
}

impl ActuatorSetup {
    /// 75% on channel 0, 25% on channel 1.
    pub fn three_quarters_one_quarter(counter_max: u32) -> Self {
        Self {
            counter_max,
            pwm0: DutyCycle::fraction(counter_max, 3, 4),
            pwm1: DutyCycle::fraction(counter_max, 1, 4),
        }
    }

    /// Write both compare registers, channel 0 first.
    pub fn apply<O: DutyCycleOutput + ?Sized>(&self, output: &mut O) {
        output.set_duty_cycle(PwmChannel::Pwm0, self.pwm0.value());
        output.set_duty_cycle(PwmChannel::Pwm1, self.pwm1.value());
    }
}
