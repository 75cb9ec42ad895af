//! Host simulator for one capture-then-transfer cycle.
//!
//! Runs the real pipeline (bootstrap, sampling loop, transfer manager,
//! reset) against the platform mocks, with a simulated clock that advances
//! a fixed number of ticks on every ADC read.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin capture-sim --features emulator -- --preset raw-batched
//! RUST_LOG=info cargo run --bin capture-sim --features emulator -- --fault stall --retry
//! ```

#![allow(missing_docs)]
#![allow(clippy::print_stdout)]

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use platform::mocks::{Completion, EventLog, MockEngine, MockFrontEnd, MockPwm, RecordingCache, SimClock};
use platform::transfer::status;
use platform::{CaptureConfig, DutyCycleOutput, StagingBuffer, SubmitRejected, TimeoutRetry};
use tracing_subscriber::EnvFilter;

use firmware::board::{self, HARDWARE};
use firmware::{
    initialize_actuator, initialize_analog_front_end, initialize_transfer_engine, read_health,
    run_cycle, CyclePeripherals,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    CurrentSensor,
    RawBatched,
    RawPerSample,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Fault {
    /// Engine completes normally.
    #[value(name = "none")]
    Off,
    /// Engine never leaves busy and reports a slave error.
    Stall,
    /// Engine rejects the descriptor.
    Reject,
}

#[derive(Debug, Parser)]
#[command(name = "capture-sim", about = "Simulate one ADC capture and DMA offload cycle")]
struct Cli {
    /// Capture configuration preset.
    #[arg(long, value_enum, default_value = "current-sensor")]
    preset: Preset,

    /// Staging buffer capacity in samples.
    #[arg(long, default_value_t = 4096)]
    capacity: usize,

    /// Simulated clock ticks consumed by one ADC read.
    #[arg(long, default_value_t = 10)]
    ticks_per_read: u32,

    /// Simulated clock rate in Hz.
    #[arg(long, default_value_t = 10_000_000)]
    tick_hz: u32,

    /// Override the capture window in milliseconds.
    #[arg(long)]
    duration_ms: Option<u32>,

    /// Override the completion poll budget.
    #[arg(long)]
    poll_budget: Option<u32>,

    /// Inject a transfer engine fault.
    #[arg(long, value_enum, default_value = "none")]
    fault: Fault,

    /// Retry a timed-out transfer once after resetting the engine.
    #[arg(long)]
    retry: bool,
}

impl Cli {
    fn config(&self) -> CaptureConfig {
        let mut config = match self.preset {
            Preset::CurrentSensor => CaptureConfig::current_sensor(),
            Preset::RawBatched => CaptureConfig::raw_batched(),
            Preset::RawPerSample => CaptureConfig::raw_per_sample(),
        };
        if let Some(ms) = self.duration_ms {
            config.duration_ms = ms;
        }
        if let Some(budget) = self.poll_budget {
            config.poll_budget = budget;
        }
        if self.retry {
            config.timeout_retry = TimeoutRetry::OnceAfterReset;
        }
        config
    }

    fn engine(&self, log: EventLog) -> MockEngine {
        let engine = MockEngine::new(log).with_reset_polls(3);
        match self.fault {
            Fault::Off => engine.with_default_completion(Completion::AfterPolls(250)),
            Fault::Stall => engine.then(Completion::Stall {
                error_bits: status::SLAVE_ERROR,
            }),
            Fault::Reject => engine.rejecting(SubmitRejected::ChannelBusy),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    tracing::info!(preset = ?cli.preset, fault = ?cli.fault, "starting capture simulation");

    let log = EventLog::new();
    let clock = SimClock::new(cli.tick_hz);

    let result = (|| -> Result<_, Box<dyn std::error::Error>> {
        let mut front_end = initialize_analog_front_end(&HARDWARE, board::SYSMON_DEVICE_ID, |_| {
            Ok(MockFrontEnd::new()
                .with_clock(clock.clone(), cli.ticks_per_read)
                .with_ramp(0x7F00))
        })?;
        let mut pwm = initialize_actuator(&HARDWARE, board::PWM_DEVICE_ID, |_| {
            Ok(MockPwm::new(log.clone()))
        })?;
        let mut engine = initialize_transfer_engine(&HARDWARE, board::DMA_DEVICE_ID, |_| {
            Ok(cli.engine(log.clone()))
        })?;

        read_health(&mut front_end);

        let mut cache = RecordingCache::new(log.clone());
        let mut timer = clock.clone();
        let mut cells = vec![0u32; cli.capacity];
        let mut buffer = StagingBuffer::new(config.region.base(), &mut cells);

        let mut peripherals = CyclePeripherals {
            front_end: &mut front_end,
            engine: &mut engine,
            cache: &mut cache,
            timer: &mut timer,
            actuator: Some(&mut pwm as &mut dyn DutyCycleOutput),
            buffer: &mut buffer,
        };
        let report = run_cycle(&mut peripherals, &config)?;
        let head: Vec<u32> = buffer.samples().iter().take(4).copied().collect();
        Ok((report, head))
    })();

    match result {
        Ok((report, head)) => {
            println!(
                "captured {} samples ({:?}) in {} ticks",
                report.capture.sample_count, report.capture.stop_reason, report.capture.elapsed_ticks
            );
            println!(
                "offloaded {} bytes in {} polls after {} attempt(s)",
                report.transfer.length_bytes,
                report.transfer.polls,
                report.attempts.len()
            );
            println!("first cells: {head:08x?}");
            println!("hardware events recorded: {}", log.events().len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("capture cycle failed: {err}");
            ExitCode::FAILURE
        }
    }
}
