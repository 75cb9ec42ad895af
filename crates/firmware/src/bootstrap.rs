//! Peripheral bootstrap.
//!
//! Every peripheral is brought up the same way:
//!
//! 1. look up its `(DeviceId, PeripheralKind)` entry in the static
//!    [`HardwareDescription`];
//! 2. hand the entry's base address to a caller-supplied `configure`
//!    closure, which binds a register bus and performs the driver's
//!    handshake.
//!
//! The transfer engine additionally gets a full reset (see
//! [`crate::recovery`]) followed by an all-ones write to both status
//! registers, so it leaves bootstrap `Idle` with no stale flags.
//!
//! Failures are fatal for the cycle and are never retried.

use platform::calibration::{
    die_temperature_millicelsius, duty_cycle_percent, supply_millivolts,
};
use platform::transfer::CLEAR_ALL_STATUS;
use platform::{
    AdcChannel, AnalogFrontEnd, DeviceId, Direction, HardwareDescription, HealthSnapshot,
    PeripheralDescriptor, PeripheralKind, TransferEngine,
};

use crate::drivers::HandshakeFailed;
use crate::engine::Engine;
use crate::recovery;

/// A peripheral could not be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// No entry for the peripheral in the hardware description.
    #[error("no {kind} with device id {id} in the hardware description")]
    ConfigNotFound {
        /// Identifier looked up.
        id: DeviceId,
        /// Peripheral class looked up.
        kind: PeripheralKind,
    },
    /// The driver's register handshake failed.
    #[error("{kind} {id} failed to initialize: {source}")]
    ConfigInitFailed {
        /// Identifier of the peripheral.
        id: DeviceId,
        /// Peripheral class.
        kind: PeripheralKind,
        /// Handshake failure reported by the driver.
        source: HandshakeFailed,
    },
}

fn bring_up<P, F>(
    hw: &HardwareDescription,
    id: DeviceId,
    kind: PeripheralKind,
    configure: F,
) -> Result<P, InitError>
where
    F: FnOnce(usize) -> Result<P, HandshakeFailed>,
{
    let entry: &PeripheralDescriptor = hw.lookup(id, kind).ok_or_else(|| {
        error!("bootstrap: {:?} {:?} not in hardware description", kind, id);
        InitError::ConfigNotFound { id, kind }
    })?;
    debug!(
        "bootstrap: {:?} {:?} at {:#x}",
        kind, id, entry.base_address
    );
    configure(entry.base_address).map_err(|source| {
        error!("bootstrap: {:?} {:?} handshake failed: {}", kind, id, source);
        InitError::ConfigInitFailed { id, kind, source }
    })
}

/// Look up and configure the analog front-end.
pub fn initialize_analog_front_end<A, F>(
    hw: &HardwareDescription,
    id: DeviceId,
    configure: F,
) -> Result<A, InitError>
where
    A: AnalogFrontEnd,
    F: FnOnce(usize) -> Result<A, HandshakeFailed>,
{
    let front_end = bring_up(hw, id, PeripheralKind::AnalogFrontEnd, configure)?;
    info!("analog front-end ready");
    Ok(front_end)
}

/// Look up, configure and reset the transfer engine.
///
/// Blocks until the engine reports reset done (see the fatal wait in
/// [`crate::recovery`]). The returned engine is `Idle`.
pub fn initialize_transfer_engine<E, F>(
    hw: &HardwareDescription,
    id: DeviceId,
    configure: F,
) -> Result<Engine<E>, InitError>
where
    E: TransferEngine,
    F: FnOnce(usize) -> Result<E, HandshakeFailed>,
{
    let regs = bring_up(hw, id, PeripheralKind::TransferEngine, configure)?;
    let mut engine = Engine::new(regs);
    recovery::reset(&mut engine);
    for direction in [Direction::DeviceToMemory, Direction::MemoryToDevice] {
        engine.hw.write_status(direction, CLEAR_ALL_STATUS);
    }
    info!("transfer engine ready");
    Ok(engine)
}

/// Look up and configure the PWM core.
pub fn initialize_actuator<P, F>(
    hw: &HardwareDescription,
    id: DeviceId,
    configure: F,
) -> Result<P, InitError>
where
    F: FnOnce(usize) -> Result<P, HandshakeFailed>,
{
    let pwm = bring_up(hw, id, PeripheralKind::PwmCore, configure)?;
    info!("PWM core ready");
    Ok(pwm)
}

/// Read the monitor's temperature, VCCINT and VP/VN channels once and log
/// them in engineering units.
pub fn read_health<A: AnalogFrontEnd + ?Sized>(front_end: &mut A) -> HealthSnapshot {
    let temperature_raw = front_end.read_raw(AdcChannel::TEMPERATURE);
    let vccint_raw = front_end.read_raw(AdcChannel::VCCINT);
    let vp_vn_raw = front_end.read_raw(AdcChannel::VP_VN);
    let snapshot = HealthSnapshot {
        temperature_raw,
        vccint_raw,
        vp_vn_raw,
        temperature_millicelsius: die_temperature_millicelsius(temperature_raw),
        vccint_millivolts: supply_millivolts(vccint_raw),
        vp_vn_percent: duty_cycle_percent(vp_vn_raw),
    };
    info!(
        "health: die {} mdegC, VCCINT {} mV, VP/VN {}%",
        snapshot.temperature_millicelsius, snapshot.vccint_millivolts, snapshot.vp_vn_percent
    );
    snapshot
}
