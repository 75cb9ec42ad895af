//! Raw ADC code conversions.
//!
//! The front-end returns 16-bit codes with the 12 significant bits left
//! justified. The capture path stores every sample as a `u32`; signed
//! quantities are stored as the two's complement bit pattern of the `i32`.

/// Full-scale value of a 12-bit conversion.
pub const ADC_FULL_SCALE_CODE: f64 = 4095.0;

/// Analog input reference voltage of the current sensor chain.
pub const REFERENCE_VOLTS: f64 = 3.3;

/// Sensor output at zero current (VCC / 2).
pub const ZERO_CURRENT_VOLTS: f64 = 1.65;

/// Hall-effect sensor sensitivity in volts per ampere (5 A variant).
pub const SENSITIVITY_VOLTS_PER_AMP: f64 = 0.185;

/// Current through the Hall-effect sensor, in milliamps, for a raw code.
///
/// ```text
/// code12 = raw >> 4
/// volts  = code12 / 4095 * 3.3
/// mA     = round((volts - 1.65) / 0.185 * 1000)
/// ```
///
/// Rounds half away from zero.
pub fn hall_effect_milliamps(raw: u16) -> i32 {
    let code12 = f64::from(raw >> 4);
    let volts = code12 / ADC_FULL_SCALE_CODE * REFERENCE_VOLTS;
    let amps = (volts - ZERO_CURRENT_VOLTS) / SENSITIVITY_VOLTS_PER_AMP;
    // |result| <= 8_919 for any u16 input; the cast cannot saturate.
    #[allow(clippy::cast_possible_truncation)]
    let milliamps = libm::round(amps * 1000.0) as i32;
    milliamps
}

/// Two's complement bit pattern of a signed sample, as staged.
#[allow(clippy::cast_sign_loss)] // bit pattern reinterpretation
pub const fn encode_signed(value: i32) -> u32 {
    value as u32
}

/// Inverse of [`encode_signed`].
#[allow(clippy::cast_possible_wrap)]
pub const fn decode_signed(cell: u32) -> i32 {
    cell as i32
}

/// How a raw code becomes a staged sample.
#[derive(Debug, Clone, Copy)]
pub enum SampleConversion {
    /// Stage the raw 16-bit code, zero extended.
    Raw,
    /// Stage [`hall_effect_milliamps`] as a signed bit pattern.
    HallEffectMilliamps,
    /// Caller-supplied conversion.
    Custom(fn(u16) -> u32),
}

impl SampleConversion {
    /// Convert one raw code.
    #[inline]
    pub fn apply(self, raw: u16) -> u32 {
        match self {
            Self::Raw => u32::from(raw),
            Self::HallEffectMilliamps => encode_signed(hall_effect_milliamps(raw)),
            Self::Custom(f) => f(raw),
        }
    }
}

// ── On-chip monitor readouts ────────────────────────────────────────────────

/// Supply sensor reading (VCCINT and friends) in millivolts.
///
/// Supply channels are scaled so that full scale (65536) is 3 V.
pub const fn supply_millivolts(raw: u16) -> u32 {
    // 65535 * 3000 fits u32 comfortably.
    #[allow(clippy::arithmetic_side_effects)]
    let mv = (raw as u32 * 3000) >> 16;
    mv
}

/// Die temperature in millidegrees Celsius.
///
/// `raw * 503.975 / 65536 - 273.15`, in integer arithmetic.
pub const fn die_temperature_millicelsius(raw: u16) -> i32 {
    // raw * 503_975 < 2^35: i64 holds it; the result lies in -273_150..=230_818.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    let mc = ((raw as i64 * 503_975) >> 16) as i32 - 273_150;
    mc
}

/// Unipolar input as a percentage of full scale (duty cycle of a filtered
/// PWM signal fed back into the monitor).
pub const fn duty_cycle_percent(raw: u16) -> u32 {
    #[allow(clippy::arithmetic_side_effects)] // 65535 * 100 fits u32
    let pct = raw as u32 * 100 / 65_535;
    pct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_scale_reads_zero_current() {
        // 0x8000 >> 4 = 2048 -> 1.65037 V -> +2 mA (2047.5 is true zero).
        assert_eq!(hall_effect_milliamps(0x8000), 2);
        assert_eq!(hall_effect_milliamps(0x7FF0), -2);
    }

    #[test]
    fn rails_map_to_full_scale_current() {
        assert_eq!(hall_effect_milliamps(0x0000), -8919);
        assert_eq!(hall_effect_milliamps(0xFFFF), 8919);
    }

    #[test]
    fn low_four_bits_are_ignored() {
        assert_eq!(hall_effect_milliamps(0x1000), hall_effect_milliamps(0x100F));
    }

    #[test]
    fn known_codes() {
        assert_eq!(hall_effect_milliamps(0x0800), -8361);
        assert_eq!(hall_effect_milliamps(0x1000), -7804);
        assert_eq!(hall_effect_milliamps(0x8010), 7);
    }

    #[test]
    fn negative_current_is_staged_as_twos_complement() {
        let cell = SampleConversion::HallEffectMilliamps.apply(0x0000);
        assert_eq!(cell, 0xFFFF_DD29);
        assert_eq!(decode_signed(cell), -8919);
    }

    #[test]
    fn raw_conversion_zero_extends() {
        assert_eq!(SampleConversion::Raw.apply(0xABCD), 0x0000_ABCD);
    }

    #[test]
    fn custom_conversion_is_applied() {
        fn code12(raw: u16) -> u32 {
            u32::from(raw >> 4)
        }
        assert_eq!(SampleConversion::Custom(code12).apply(0xFFF0), 0xFFF);
    }

    #[test]
    fn monitor_readouts() {
        // 1.0 V core rail reads 0x5555.
        assert_eq!(supply_millivolts(0x5555), 999);
        assert_eq!(die_temperature_millicelsius(0x9A00), 30_022);
        assert_eq!(die_temperature_millicelsius(0), -273_150);
        assert_eq!(duty_cycle_percent(0xFFFF), 100);
        assert_eq!(duty_cycle_percent(0xBFFF), 74);
    }
}
