//! Static hardware description table.
//!
//! Peripherals are found by a fixed device identifier, never by probing.
//! The board crate provides one `static` table; bootstrap looks entries up
//! by `(DeviceId, PeripheralKind)` and configures the driver from the base
//! address it finds there.

/// Fixed identifier of a peripheral instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(pub u16);

impl core::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Class of peripheral an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralKind {
    /// System monitor / ADC.
    AnalogFrontEnd,
    /// One-shot DMA transfer engine.
    TransferEngine,
    /// Dual-channel PWM core.
    PwmCore,
}

impl core::fmt::Display for PeripheralKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::AnalogFrontEnd => "analog front-end",
            Self::TransferEngine => "transfer engine",
            Self::PwmCore => "PWM core",
        })
    }
}

/// One entry of the hardware description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralDescriptor {
    /// Instance identifier.
    pub id: DeviceId,
    /// Peripheral class.
    pub kind: PeripheralKind,
    /// Base address of the register block.
    pub base_address: usize,
}

/// Immutable table of every peripheral on the board.
#[derive(Debug, Clone, Copy)]
pub struct HardwareDescription {
    entries: &'static [PeripheralDescriptor],
}

impl HardwareDescription {
    /// Wrap a static table.
    pub const fn new(entries: &'static [PeripheralDescriptor]) -> Self {
        Self { entries }
    }

    /// Entry for `id` of class `kind`, if present.
    pub fn lookup(&self, id: DeviceId, kind: PeripheralKind) -> Option<&'static PeripheralDescriptor> {
        self.entries.iter().find(|d| d.id == id && d.kind == kind)
    }

    /// All entries, in table order.
    pub fn entries(&self) -> &'static [PeripheralDescriptor] {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: [PeripheralDescriptor; 2] = [
        PeripheralDescriptor {
            id: DeviceId(0),
            kind: PeripheralKind::TransferEngine,
            base_address: 0x4040_0000,
        },
        PeripheralDescriptor {
            id: DeviceId(0),
            kind: PeripheralKind::AnalogFrontEnd,
            base_address: 0x43C0_0000,
        },
    ];

    #[test]
    fn lookup_matches_id_and_kind() {
        let hw = HardwareDescription::new(&TABLE);
        let d = hw.lookup(DeviceId(0), PeripheralKind::AnalogFrontEnd);
        assert_eq!(d.map(|d| d.base_address), Some(0x43C0_0000));
    }

    #[test]
    fn unknown_entries_are_absent() {
        let hw = HardwareDescription::new(&TABLE);
        assert!(hw.lookup(DeviceId(1), PeripheralKind::TransferEngine).is_none());
        assert!(hw.lookup(DeviceId(0), PeripheralKind::PwmCore).is_none());
    }
}
