//! Integration test: complete capture-then-transfer cycles on mock peripherals.
//!
//! Tests that:
//!   1. The bench scenario (4096 cells, 1 µs per read, fixed code 0x1000)
//!      stops on buffer-full and offloads exactly the staged bytes from the
//!      region base
//!   2. Cache maintenance brackets the engine: flush before submit,
//!      invalidate after the last poll, reset last
//!   3. A timed-out transfer leaves no sticky flags once the cycle resets
//!   4. A timeout is declared after exactly the poll budget
//!   5. The single retry recovers from one stalled transfer
//!   6. Bootstrap fails cleanly on a missing table entry or a dead bus
//!
//! Does NOT require physical hardware.
//!
//! Run with: cargo test -p firmware --test integration_cycle

// Integration test file -- intentional test patterns permitted.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
)]

use firmware::board::{self, HARDWARE};
use firmware::{
    initialize_actuator, initialize_analog_front_end, initialize_transfer_engine, run_cycle,
    AttemptOutcome, CycleError, CyclePeripherals, CycleReport, Engine, HandshakeFailed, InitError,
    StopReason, TransferError,
};
use platform::mocks::{
    Completion, Event, EventLog, MockEngine, MockFrontEnd, MockPwm, RecordingCache, SimClock,
};
use platform::calibration::{encode_signed, hall_effect_milliamps};
use platform::transfer::status;
use platform::{
    AdcChannel, CaptureConfig, DeviceId, Direction, DutyCycleOutput, EngineState, PeripheralKind,
    StagingBuffer, TimeoutRetry,
};

const ONE_MHZ: u32 = 1_000_000;

// -- Bench rig ------------------------------------------------------------

struct Bench {
    log: EventLog,
    clock: SimClock,
    front_end: MockFrontEnd,
    pwm: MockPwm,
    engine: Engine<MockEngine>,
    cache: RecordingCache,
    cells: Vec<u32>,
}

impl Bench {
    /// Bootstrap every peripheral through the board table. The front-end
    /// ramps up from mid-scale.
    fn boot(capacity: usize, ticks_per_read: u32, engine: impl FnOnce(EventLog) -> MockEngine) -> Self {
        Self::boot_with(capacity, ticks_per_read, |adc| adc.with_ramp(0x8000), engine)
    }

    fn boot_with(
        capacity: usize,
        ticks_per_read: u32,
        front_end: impl FnOnce(MockFrontEnd) -> MockFrontEnd,
        engine: impl FnOnce(EventLog) -> MockEngine,
    ) -> Self {
        let log = EventLog::new();
        let clock = SimClock::new(ONE_MHZ);
        let front_end = initialize_analog_front_end(&HARDWARE, board::SYSMON_DEVICE_ID, |_| {
            Ok(front_end(MockFrontEnd::new().with_clock(clock.clone(), ticks_per_read)))
        })
        .unwrap();
        let pwm = initialize_actuator(&HARDWARE, board::PWM_DEVICE_ID, |_| {
            Ok(MockPwm::new(log.clone()))
        })
        .unwrap();
        let hw = engine(log.clone());
        let engine = initialize_transfer_engine(&HARDWARE, board::DMA_DEVICE_ID, |_| Ok(hw)).unwrap();
        Self {
            cache: RecordingCache::new(log.clone()),
            log,
            clock,
            front_end,
            pwm,
            engine,
            cells: vec![0; capacity],
        }
    }

    fn cycle(&mut self, config: &CaptureConfig) -> Result<CycleReport, CycleError> {
        let mut buffer = StagingBuffer::new(config.region.base(), &mut self.cells);
        let mut p = CyclePeripherals {
            front_end: &mut self.front_end,
            engine: &mut self.engine,
            cache: &mut self.cache,
            timer: &mut self.clock,
            actuator: Some(&mut self.pwm as &mut dyn DutyCycleOutput),
            buffer: &mut buffer,
        };
        run_cycle(&mut p, config)
    }
}

// -- Scenario -------------------------------------------------------------

#[test]
fn bench_scenario_fills_buffer_before_the_window_closes() {
    let mut bench = Bench::boot_with(
        4096,
        1,
        |adc| adc.with_value(AdcChannel::AUX_MIN, 0x1000),
        MockEngine::new,
    );
    let config = CaptureConfig::current_sensor();
    bench.log.clear();

    let report = bench.cycle(&config).unwrap();

    // 4096 reads at 1 µs each is ~4.1 ms, well inside the 100 ms window.
    assert_eq!(report.capture.stop_reason, StopReason::BufferFull);
    assert_eq!(report.capture.sample_count, 4096);
    assert!(report.capture.elapsed_ticks < 100_000);
    assert_eq!(report.transfer.length_bytes, 4096 * 4);

    // Code 0x1000 is about -7.8 A below the sensor midpoint.
    let expected = encode_signed(hall_effect_milliamps(0x1000));
    assert_eq!(expected, encode_signed(-7804));
    assert!(bench.cells.iter().all(|&cell| cell == expected));

    let submitted = bench
        .log
        .events()
        .into_iter()
        .find_map(|e| match e {
            Event::Submit(d) => Some(d),
            _ => None,
        })
        .unwrap();
    assert_eq!(submitted.address(), config.region.base());
    assert_eq!(submitted.length_bytes(), 16_384);
    assert_eq!(submitted.direction(), Direction::DeviceToMemory);
}

#[test]
fn staged_cells_hold_converted_samples() {
    let mut bench = Bench::boot(32, 1, MockEngine::new);
    // Ramp from mid-scale: 0x8000..=0x800F convert to +2 mA, 0x8010 to +7 mA.
    bench.cycle(&CaptureConfig::current_sensor()).unwrap();
    assert_eq!(bench.cells[0], 2);
    assert_eq!(bench.cells[15], 2);
    assert_eq!(bench.cells[16], 7);
}

// -- Ordering -------------------------------------------------------------

#[test]
fn cache_maintenance_brackets_the_engine() {
    let mut bench = Bench::boot(64, 1, |log| {
        MockEngine::new(log).then(Completion::AfterPolls(5))
    });
    bench.log.clear();
    bench.cycle(&CaptureConfig::current_sensor()).unwrap();

    let log = &bench.log;
    let duty = log.last_position(|e| matches!(e, Event::DutyCycle { .. })).unwrap();
    let flush = log.position(|e| matches!(e, Event::Flush { .. })).unwrap();
    let clear = log
        .position(|e| matches!(e, Event::StatusWrite { value: 0xFFFF_FFFF, .. }))
        .unwrap();
    let submit = log.position(|e| matches!(e, Event::Submit(_))).unwrap();
    let first_poll = log.position(|e| matches!(e, Event::BusyPoll(_))).unwrap();
    let last_poll = log.last_position(|e| matches!(e, Event::BusyPoll(_))).unwrap();
    let invalidate = log.position(|e| matches!(e, Event::Invalidate { .. })).unwrap();
    let reset = log.position(|e| *e == Event::ResetRequested).unwrap();

    assert!(duty < flush);
    assert!(flush < clear);
    assert!(clear < submit);
    assert!(submit < first_poll);
    assert!(last_poll < invalidate);
    assert!(invalidate < reset);
    assert_eq!(last_poll - first_poll, 5);
}

#[test]
fn flush_and_invalidate_cover_only_the_staged_bytes() {
    let mut bench = Bench::boot(100, 1, MockEngine::new);
    let config = CaptureConfig::current_sensor();
    bench.cycle(&config).unwrap();

    let base = config.region.base();
    assert_eq!(
        bench.log.count(|e| *e == Event::Flush { address: base, len: 400 }),
        1
    );
    assert_eq!(
        bench.log.count(|e| *e == Event::Invalidate { address: base, len: 400 }),
        1
    );
}

// -- Timeout and recovery -------------------------------------------------

#[test]
fn stale_flags_are_cleared_after_timeout_and_reset() {
    let mut bench = Bench::boot(64, 1, |log| {
        MockEngine::new(log)
            .then(Completion::Stall {
                error_bits: status::SLAVE_ERROR,
            })
            .then(Completion::AfterPolls(6))
    });
    let config = CaptureConfig {
        poll_budget: 50,
        ..CaptureConfig::current_sensor()
    };

    let err = bench.cycle(&config).unwrap_err();
    let CycleError::Transfer(TransferError::Timeout { status: sr }) = err else {
        panic!("expected a timeout, got {err:?}");
    };
    assert_ne!(sr & status::SLAVE_ERROR, 0, "timeout reports the raw status");

    // End-of-cycle reset has run.
    assert_eq!(bench.engine.state(), EngineState::Idle);
    let sr = bench.engine.status(Direction::DeviceToMemory);
    assert_eq!(sr & (status::ERROR_MASK | status::IRQ_MASK), 0);

    // The next transfer runs its full course instead of completing on the
    // first poll from leftover flags.
    let report = bench.cycle(&config).unwrap();
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.transfer.polls, 7);
}

#[test]
fn stalled_engine_polls_exactly_the_budget() {
    for budget in [1_u32, 7, 300, 1_000] {
        let mut bench = Bench::boot(16, 1, |log| {
            MockEngine::new(log).with_default_completion(Completion::Stall { error_bits: 0 })
        });
        let config = CaptureConfig {
            poll_budget: budget,
            ..CaptureConfig::current_sensor()
        };
        bench.log.clear();
        let err = bench.cycle(&config).unwrap_err();
        assert!(matches!(err, CycleError::Transfer(TransferError::Timeout { .. })));
        assert_eq!(
            bench.log.count(|e| matches!(e, Event::BusyPoll(_))),
            budget as usize
        );
    }
}

#[test]
fn one_retry_recovers_a_stalled_transfer() {
    let mut bench = Bench::boot(32, 1, |log| {
        MockEngine::new(log).then(Completion::Stall {
            error_bits: status::DECODE_ERROR,
        })
    });
    let config = CaptureConfig {
        poll_budget: 10,
        timeout_retry: TimeoutRetry::OnceAfterReset,
        ..CaptureConfig::current_sensor()
    };
    bench.log.clear();

    let report = bench.cycle(&config).unwrap();
    assert_eq!(report.attempts.len(), 2);
    assert!(matches!(
        report.attempts[0],
        AttemptOutcome::Failed(TransferError::Timeout { .. })
    ));
    assert_eq!(report.attempts[1], AttemptOutcome::Completed { polls: 1 });

    // The retry resubmits the same range.
    let submits: Vec<_> = bench
        .log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Submit(d) => Some(d),
            _ => None,
        })
        .collect();
    assert_eq!(submits.len(), 2);
    assert_eq!(submits[0], submits[1]);

    // Reset between the two submissions, and one more at the end of the cycle.
    assert_eq!(bench.log.count(|e| *e == Event::ResetRequested), 2);
}

#[test]
fn rejected_descriptor_fails_without_retry() {
    let mut bench = Bench::boot(32, 1, |log| {
        MockEngine::new(log).rejecting(platform::SubmitRejected::ChannelBusy)
    });
    let config = CaptureConfig {
        timeout_retry: TimeoutRetry::OnceAfterReset,
        ..CaptureConfig::current_sensor()
    };
    let err = bench.cycle(&config).unwrap_err();
    assert_eq!(
        err,
        CycleError::Transfer(TransferError::SubmitFailed(
            platform::SubmitRejected::ChannelBusy
        ))
    );
    assert_eq!(bench.engine.hw().submissions(), 1);
    assert_eq!(bench.log.count(|e| matches!(e, Event::Invalidate { .. })), 0);
}

// -- Bootstrap ------------------------------------------------------------

#[test]
fn bootstrap_reports_missing_table_entry() {
    let err = initialize_transfer_engine(&HARDWARE, DeviceId(3), |_| {
        Ok(MockEngine::new(EventLog::new()))
    })
    .unwrap_err();
    assert_eq!(
        err,
        InitError::ConfigNotFound {
            id: DeviceId(3),
            kind: PeripheralKind::TransferEngine,
        }
    );
}

#[test]
fn bootstrap_reports_dead_register_bus() {
    let err = initialize_analog_front_end(&HARDWARE, board::SYSMON_DEVICE_ID, |_| {
        Err::<MockFrontEnd, _>(HandshakeFailed(0xFFFF_FFFF))
    })
    .unwrap_err();
    assert!(matches!(
        err,
        InitError::ConfigInitFailed {
            kind: PeripheralKind::AnalogFrontEnd,
            source: HandshakeFailed(0xFFFF_FFFF),
            ..
        }
    ));
    assert!(err.to_string().contains("analog front-end"));
}
