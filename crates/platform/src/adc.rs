//! Analog front-end (on-chip system monitor) abstraction.

/// Input channel of the system monitor.
///
/// Channel numbers follow the monitor's register map: internal sensors
/// occupy 0..16, auxiliary analog inputs start at 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcChannel(u8);

impl AdcChannel {
    /// On-die temperature sensor.
    pub const TEMPERATURE: Self = Self(0);
    /// Core supply (VCCINT).
    pub const VCCINT: Self = Self(1);
    /// Auxiliary supply (VCCAUX).
    pub const VCCAUX: Self = Self(2);
    /// Dedicated differential input VP/VN.
    pub const VP_VN: Self = Self(3);
    /// First auxiliary analog input (VAUX0).
    pub const AUX_MIN: Self = Self(16);
    /// Last auxiliary analog input (VAUX15).
    pub const AUX_MAX: Self = Self(31);

    /// Auxiliary input `VAUX<index>`, if `index < 16`.
    pub const fn aux(index: u8) -> Option<Self> {
        if index < 16 {
            Some(Self(Self::AUX_MIN.0.wrapping_add(index)))
        } else {
            None
        }
    }

    /// Register-map channel number.
    pub const fn number(self) -> u8 {
        self.0
    }
}

/// Source of raw conversion results.
///
/// Each read returns the most recent 16-bit conversion of `channel`; the
/// significant bits are left justified. Reads never fail once the front-end
/// is configured.
pub trait AnalogFrontEnd {
    /// Latest raw code of `channel`.
    fn read_raw(&mut self, channel: AdcChannel) -> u16;
}

/// One-shot readout of the monitor's health channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HealthSnapshot {
    /// Raw code of [`AdcChannel::TEMPERATURE`].
    pub temperature_raw: u16,
    /// Raw code of [`AdcChannel::VCCINT`].
    pub vccint_raw: u16,
    /// Raw code of [`AdcChannel::VP_VN`].
    pub vp_vn_raw: u16,
    /// Die temperature in millidegrees Celsius.
    pub temperature_millicelsius: i32,
    /// Core supply in millivolts.
    pub vccint_millivolts: u32,
    /// VP/VN input as a percentage of full scale.
    pub vp_vn_percent: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aux_channels_start_at_sixteen() {
        assert_eq!(AdcChannel::aux(0), Some(AdcChannel::AUX_MIN));
        assert_eq!(AdcChannel::aux(1).map(AdcChannel::number), Some(17));
        assert_eq!(AdcChannel::aux(15), Some(AdcChannel::AUX_MAX));
        assert_eq!(AdcChannel::aux(16), None);
    }
}
