//! Capture cycle configuration and defaults.
//!
//! One [`CaptureConfig`] describes a complete capture-then-transfer cycle.
//! The named presets reproduce the three bench setups the board has been
//! run with; anything else is built by editing the public fields and
//! calling [`CaptureConfig::validate`].
//!
//! # Presets
//!
//! | Preset             | Region            | Deadline check | Conversion  | Channel | PWM        |
//! |--------------------|-------------------|----------------|-------------|---------|------------|
//! | `current_sensor`   | `PRIMARY_STAGING` | every sample   | Hall effect | VAUX0   | 254, 75/25 |
//! | `raw_batched`      | `LEGACY_STAGING`  | every 1024     | raw         | VAUX0   | 1024, 75/25|
//! | `raw_per_sample`   | `LEGACY_STAGING`  | every sample   | raw         | VAUX1   | none       |

use core::num::NonZeroUsize;

use crate::actuator::ActuatorSetup;
use crate::adc::AdcChannel;
use crate::calibration::SampleConversion;
use crate::memory_map::{RegionError, StagingRegion, LEGACY_STAGING, PRIMARY_STAGING};
use crate::timer::{ticks_for_duration, WindowTooLong};
use crate::transfer::Direction;

/// Default capture window (0.1 s).
pub const DEFAULT_CAPTURE_DURATION_MS: u32 = 100;

/// Default number of samples between deadline checks in batched mode.
pub const DEFAULT_BATCH: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Default number of busy polls before a transfer is declared timed out.
pub const DEFAULT_POLL_BUDGET: u32 = 1_000_000;

/// A progress line is logged every this many busy polls.
pub const PROGRESS_INTERVAL_POLLS: u32 = 100_000;

/// PWM counter period of the current-sensor bench setup.
pub const CURRENT_SENSOR_PWM_COUNTER_MAX: u32 = 254;

/// PWM counter period of the raw batched bench setup.
pub const RAW_BATCHED_PWM_COUNTER_MAX: u32 = 1024;

/// When the sampling loop compares the timer against the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeadlinePolicy {
    /// After every sample. Overshoot is at most one sample period.
    PerSample,
    /// After every `batch` samples. Overshoot is at most `batch - 1` samples
    /// past the deadline.
    Batched {
        /// Samples between checks.
        batch: NonZeroUsize,
    },
}

/// When the transfer engine is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetPolicy {
    /// Only during bootstrap.
    AtBootOnly,
    /// During bootstrap and at the end of every cycle, whatever its outcome.
    #[default]
    AfterEveryCycle,
}

/// What a cycle does when the transfer times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutRetry {
    /// Fail the cycle.
    #[default]
    Never,
    /// Reset the engine and resubmit the same range once.
    OnceAfterReset,
}

/// Configuration was rejected by [`CaptureConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Capture duration of zero milliseconds.
    #[error("capture duration must be non-zero")]
    ZeroDuration,
    /// Completion poll budget of zero.
    #[error("poll budget must be non-zero")]
    ZeroPollBudget,
    /// Window does not fit the tick counter.
    #[error(transparent)]
    WindowTooLong(#[from] WindowTooLong),
    /// Staging region is not cache-line aligned.
    #[error(transparent)]
    Region(#[from] RegionError),
}

/// What the sampling loop needs from the configuration, already validated.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    /// Channel sampled.
    pub channel: AdcChannel,
    /// Raw-code conversion.
    pub conversion: SampleConversion,
    /// Deadline check cadence.
    pub deadline_policy: DeadlinePolicy,
    /// Capture window length in timer ticks.
    pub window_ticks: u32,
}

/// Complete description of one capture-then-transfer cycle.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Where samples are staged.
    pub region: StagingRegion,
    /// Capture window in milliseconds.
    pub duration_ms: u32,
    /// Deadline check cadence.
    pub deadline_policy: DeadlinePolicy,
    /// Raw-code conversion applied before staging.
    pub conversion: SampleConversion,
    /// Channel sampled.
    pub channel: AdcChannel,
    /// Direction of the offload transfer.
    pub direction: Direction,
    /// Busy polls before a transfer times out.
    pub poll_budget: u32,
    /// Transfer engine reset cadence.
    pub reset_policy: ResetPolicy,
    /// Behaviour on transfer timeout.
    pub timeout_retry: TimeoutRetry,
    /// PWM setup applied before sampling, if any.
    pub actuator: Option<ActuatorSetup>,
}

impl CaptureConfig {
    /// Hall-effect current capture into the primary region.
    ///
    /// Checks the deadline after every sample and drives the PWM core at
    /// 75% / 25% of a 254-count period.
    pub fn current_sensor() -> Self {
        Self {
            region: PRIMARY_STAGING,
            duration_ms: DEFAULT_CAPTURE_DURATION_MS,
            deadline_policy: DeadlinePolicy::PerSample,
            conversion: SampleConversion::HallEffectMilliamps,
            channel: AdcChannel::AUX_MIN,
            direction: Direction::DeviceToMemory,
            poll_budget: DEFAULT_POLL_BUDGET,
            reset_policy: ResetPolicy::AfterEveryCycle,
            timeout_retry: TimeoutRetry::Never,
            actuator: Some(ActuatorSetup::three_quarters_one_quarter(
                CURRENT_SENSOR_PWM_COUNTER_MAX,
            )),
        }
    }

    /// Raw-code capture into the legacy region, deadline checked every 1024
    /// samples, PWM at 75% / 25% of a 1024-count period.
    pub fn raw_batched() -> Self {
        Self {
            region: LEGACY_STAGING,
            deadline_policy: DeadlinePolicy::Batched {
                batch: DEFAULT_BATCH,
            },
            conversion: SampleConversion::Raw,
            actuator: Some(ActuatorSetup::three_quarters_one_quarter(
                RAW_BATCHED_PWM_COUNTER_MAX,
            )),
            ..Self::current_sensor()
        }
    }

    /// Raw-code capture of VAUX1 into the legacy region, deadline checked
    /// every sample, no PWM setup.
    pub fn raw_per_sample() -> Self {
        Self {
            region: LEGACY_STAGING,
            conversion: SampleConversion::Raw,
            channel: AdcChannel::aux(1).unwrap_or(AdcChannel::AUX_MIN),
            actuator: None,
            ..Self::current_sensor()
        }
    }

    /// Replace the staging region, validating its alignment.
    pub fn with_region(mut self, base: usize, size_bytes: usize) -> Result<Self, ConfigError> {
        self.region = StagingRegion::new(base, size_bytes)?;
        Ok(self)
    }

    /// Check the configuration against a timer running at `tick_hz`.
    ///
    /// Region alignment is enforced when the [`StagingRegion`] is built.
    pub fn validate(&self, tick_hz: u32) -> Result<CaptureSettings, ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.poll_budget == 0 {
            return Err(ConfigError::ZeroPollBudget);
        }
        let window_ticks = ticks_for_duration(self.duration_ms, tick_hz)?;
        Ok(CaptureSettings {
            channel: self.channel,
            conversion: self.conversion,
            deadline_policy: self.deadline_policy,
            window_ticks,
        })
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::current_sensor()
    }
}
