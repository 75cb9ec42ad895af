//! Board constants: peripheral table, clocks and the cycle step order.
//!
//! Addresses match the capture fabric's address map. Keep them in sync with
//! `memory.x` and `platform::memory_map`.

use platform::{DeviceId, HardwareDescription, PeripheralDescriptor, PeripheralKind};

/// System monitor instance.
pub const SYSMON_DEVICE_ID: DeviceId = DeviceId(0);
/// Transfer engine instance.
pub const DMA_DEVICE_ID: DeviceId = DeviceId(0);
/// PWM core instance.
pub const PWM_DEVICE_ID: DeviceId = DeviceId(0);

/// System monitor register block.
pub const SYSMON_BASE: usize = 0x43C0_0000;
/// Transfer engine register block.
pub const AXI_DMA_BASE: usize = 0x4040_0000;
/// PWM core register block.
pub const PWM_BASE: usize = 0x43C1_0000;

/// Core clock, which is also the DWT cycle counter rate.
pub const CPU_CLOCK_HZ: u32 = 400_000_000;

static PERIPHERALS: [PeripheralDescriptor; 3] = [
    PeripheralDescriptor {
        id: SYSMON_DEVICE_ID,
        kind: PeripheralKind::AnalogFrontEnd,
        base_address: SYSMON_BASE,
    },
    PeripheralDescriptor {
        id: DMA_DEVICE_ID,
        kind: PeripheralKind::TransferEngine,
        base_address: AXI_DMA_BASE,
    },
    PeripheralDescriptor {
        id: PWM_DEVICE_ID,
        kind: PeripheralKind::PwmCore,
        base_address: PWM_BASE,
    },
];

/// Every peripheral on the board.
pub static HARDWARE: HardwareDescription = HardwareDescription::new(&PERIPHERALS);

/// Ordered list of the cycle's steps for documentation and testing.
///
/// # Ordering invariants
///
/// - The staging range is flushed from the data cache BEFORE the engine is
///   given the descriptor; otherwise the engine may read or overwrite memory
///   the cache still holds dirty lines for.
/// - The range is invalidated only AFTER the engine has stopped (completed or
///   timed out); an earlier invalidate lets the core refill lines the engine
///   is still writing.
/// - The status register is cleared before submission so a completion flag
///   left by a previous cycle is never mistaken for this one.
pub const CYCLE_STEPS: &[&str] = &[
    "1. Bootstrap: look up and configure front-end, PWM core and transfer engine",
    "2. Engine reset: at boot, and again whenever a timeout is still unresolved",
    "3. Actuator: write PWM compare values",
    "4. Capture: sample until the window closes or the buffer is full",
    "5. Flush: clean the staging range from the data cache",
    "6. Clear status: write all-ones to the channel status register",
    "7. Submit: hand the staging range to the engine",
    "8. Poll: busy flag, bounded by the poll budget",
    "9. Invalidate: drop cached copies of the staging range",
    "10. Reset: per reset policy, whatever the outcome",
];
