//! One capture-then-transfer cycle.
//!
//! [`run_cycle`] drives the steps listed in [`crate::board::CYCLE_STEPS`]
//! against peripherals that bootstrap has already brought up. The staging
//! buffer is reset at the start of every cycle; nothing carries over
//! between cycles except the engine's lifecycle state.

use platform::{
    AnalogFrontEnd, CacheMaintenance, CaptureConfig, ConfigError, DutyCycleOutput, EngineState,
    MonotonicTimer, ResetPolicy, StagingBuffer, TimeoutRetry, TransferDescriptor,
    TransferEngine,
};

use crate::capture::{capture, CaptureReport};
use crate::engine::Engine;
use crate::recovery;
use crate::transfer::{transfer, TransferError, TransferReport};

/// Peripheral handles one cycle runs against.
pub struct CyclePeripherals<'a, 'b, A, E, C, T>
where
    A: AnalogFrontEnd + ?Sized,
    C: CacheMaintenance + ?Sized,
    T: MonotonicTimer + ?Sized,
{
    /// Sampled front-end.
    pub front_end: &'a mut A,
    /// Offload engine, already bootstrapped.
    pub engine: &'a mut Engine<E>,
    /// Data cache maintenance.
    pub cache: &'a mut C,
    /// Capture window clock.
    pub timer: &'a mut T,
    /// PWM core, when the board has one.
    pub actuator: Option<&'a mut dyn DutyCycleOutput>,
    /// Staging buffer bound to the configured region.
    pub buffer: &'a mut StagingBuffer<'b>,
}

/// Result of one transfer attempt within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttemptOutcome {
    /// Completed after this many polls.
    Completed {
        /// Busy polls issued.
        polls: u32,
    },
    /// Failed with this error.
    Failed(TransferError),
}

/// Successful cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Sampling loop outcome.
    pub capture: CaptureReport,
    /// The transfer that completed.
    pub transfer: TransferReport,
    /// Every transfer attempt, in order. Two entries when a timeout was
    /// retried.
    pub attempts: heapless::Vec<AttemptOutcome, 2>,
}

/// Why a cycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleError {
    /// Configuration rejected before any hardware access.
    #[error("invalid capture configuration: {0}")]
    Config(#[from] ConfigError),
    /// Offload failed (after the retry, if one was configured).
    #[error("offload failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Run one cycle: validate, set up the actuator, capture, transfer, reset.
///
/// With [`ResetPolicy::AfterEveryCycle`] the engine is reset before
/// returning whether the transfer succeeded or not. With
/// [`TimeoutRetry::OnceAfterReset`] a timed-out transfer triggers one reset
/// and a full resubmission of the same range. An engine still timed out
/// from an earlier cycle (possible under [`ResetPolicy::AtBootOnly`]) is
/// reset before anything else touches the hardware.
pub fn run_cycle<A, E, C, T>(
    p: &mut CyclePeripherals<'_, '_, A, E, C, T>,
    config: &CaptureConfig,
) -> Result<CycleReport, CycleError>
where
    A: AnalogFrontEnd + ?Sized,
    E: TransferEngine,
    C: CacheMaintenance + ?Sized,
    T: MonotonicTimer + ?Sized,
{
    let settings = config.validate(p.timer.tick_hz())?;

    if p.engine.state() == EngineState::TimedOut {
        warn!("engine still timed out from the previous cycle, resetting");
        recovery::reset(p.engine);
    }

    match (config.actuator, p.actuator.as_deref_mut()) {
        (Some(setup), Some(output)) => {
            setup.apply(output);
            debug!(
                "actuator: pwm0 {} pwm1 {} of {}",
                setup.pwm0.value(),
                setup.pwm1.value(),
                setup.counter_max
            );
        }
        (Some(_), None) => warn!("actuator setup requested but no PWM core is bound"),
        (None, _) => {}
    }

    p.buffer.reset();
    let capture_report = capture(p.front_end, p.timer, p.buffer, &settings);
    let descriptor = TransferDescriptor::for_staging(p.buffer, config.direction);

    let mut attempts = heapless::Vec::new();
    let mut outcome = transfer(p.engine, p.cache, &descriptor, config.poll_budget);
    record(&mut attempts, &outcome);

    if let Err(TransferError::Timeout { status }) = outcome {
        if config.timeout_retry == TimeoutRetry::OnceAfterReset {
            warn!("transfer timed out (status {:#x}), retrying after reset", status);
            recovery::reset(p.engine);
            outcome = transfer(p.engine, p.cache, &descriptor, config.poll_budget);
            record(&mut attempts, &outcome);
        }
    }

    if config.reset_policy == ResetPolicy::AfterEveryCycle {
        recovery::reset(p.engine);
    }

    let transfer_report = outcome?;
    info!(
        "cycle complete: {} samples, {} bytes offloaded",
        capture_report.sample_count, transfer_report.length_bytes
    );
    Ok(CycleReport {
        capture: capture_report,
        transfer: transfer_report,
        attempts,
    })
}

fn record(
    attempts: &mut heapless::Vec<AttemptOutcome, 2>,
    outcome: &Result<TransferReport, TransferError>,
) {
    let entry = match outcome {
        Ok(report) => AttemptOutcome::Completed {
            polls: report.polls,
        },
        Err(err) => AttemptOutcome::Failed(*err),
    };
    if attempts.push(entry).is_err() {
        warn!("attempt log full, outcome not recorded");
    }
}
