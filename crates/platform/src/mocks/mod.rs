//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit tests, integration tests and the host simulator.
//!
//! Mocks that take part in ordering checks share one [`EventLog`]; every
//! trait call they observe is appended in call order, so a test can assert
//! that a flush happened before a submission and an invalidate after the
//! last busy poll.

#![cfg(any(test, feature = "std"))]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::transfer::status;
use crate::*;

// ── Event log ─────────────────────────────────────────────────────────────────

/// One observed hardware interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `CacheMaintenance::flush_range`.
    Flush {
        /// Start address.
        address: usize,
        /// Length in bytes.
        len: usize,
    },
    /// `CacheMaintenance::invalidate_range`.
    Invalidate {
        /// Start address.
        address: usize,
        /// Length in bytes.
        len: usize,
    },
    /// `TransferEngine::start_reset`.
    ResetRequested,
    /// `TransferEngine::reset_done`.
    ResetPolled,
    /// `TransferEngine::write_status`.
    StatusWrite {
        /// Channel written.
        direction: Direction,
        /// Value written.
        value: u32,
    },
    /// `TransferEngine::submit`, accepted or not.
    Submit(TransferDescriptor),
    /// `TransferEngine::busy`.
    BusyPoll(Direction),
    /// `DutyCycleOutput::set_duty_cycle`.
    DutyCycle {
        /// Channel written.
        channel: PwmChannel,
        /// Compare value.
        value: u32,
    },
}

/// Shared, append-only record of [`Event`]s.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub fn record(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// Copy of every event so far.
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Number of events matching `pred`.
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }

    /// Index of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.0.borrow().iter().position(pred)
    }

    /// Index of the last event matching `pred`.
    pub fn last_position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.0.borrow().iter().rposition(pred)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

// ── Timer ─────────────────────────────────────────────────────────────────────

/// Simulated tick counter.
///
/// Clones share the same counter, so a [`MockFrontEnd`] can advance the
/// clock the sampling loop reads.
#[derive(Debug, Clone)]
pub struct SimClock {
    ticks: Rc<Cell<u32>>,
    tick_hz: u32,
    ticks_per_read: u32,
}

impl SimClock {
    /// Clock at tick 0 running at `tick_hz`.
    pub fn new(tick_hz: u32) -> Self {
        Self {
            ticks: Rc::new(Cell::new(0)),
            tick_hz,
            ticks_per_read: 0,
        }
    }

    /// Start the counter at `tick` (e.g. just below the wrap point).
    pub fn starting_at(self, tick: u32) -> Self {
        self.ticks.set(tick);
        self
    }

    /// Advance the counter by `ticks` on every `now()`.
    pub fn with_ticks_per_read(mut self, ticks: u32) -> Self {
        self.ticks_per_read = ticks;
        self
    }

    /// Advance the counter, wrapping at 2^32.
    pub fn advance(&self, ticks: u32) {
        self.ticks.set(self.ticks.get().wrapping_add(ticks));
    }

    /// Counter value without advancing it.
    pub fn peek(&self) -> u32 {
        self.ticks.get()
    }
}

impl MonotonicTimer for SimClock {
    fn now(&mut self) -> u32 {
        let now = self.ticks.get();
        self.advance(self.ticks_per_read);
        now
    }

    fn tick_hz(&self) -> u32 {
        self.tick_hz
    }
}

// ── Analog front-end ──────────────────────────────────────────────────────────

/// Mock system monitor.
///
/// Returns a fixed code per channel (default 0) and advances an optional
/// [`SimClock`] by a fixed cost on every read.
#[derive(Debug, Clone)]
pub struct MockFrontEnd {
    values: BTreeMap<u8, u16>,
    ramp: Option<u16>,
    clock: Option<SimClock>,
    ticks_per_read: u32,
    reads: u32,
}

impl MockFrontEnd {
    /// Front-end that reads 0 on every channel and takes no time.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            ramp: None,
            clock: None,
            ticks_per_read: 0,
            reads: 0,
        }
    }

    /// Each read advances `clock` by `ticks_per_read`.
    pub fn with_clock(mut self, clock: SimClock, ticks_per_read: u32) -> Self {
        self.clock = Some(clock);
        self.ticks_per_read = ticks_per_read;
        self
    }

    /// Fixed code returned for `channel`.
    pub fn with_value(mut self, channel: AdcChannel, code: u16) -> Self {
        self.values.insert(channel.number(), code);
        self
    }

    /// Return `start`, `start + 1`, ... on every channel (wrapping).
    pub fn with_ramp(mut self, start: u16) -> Self {
        self.ramp = Some(start);
        self
    }

    /// Number of reads served.
    pub fn reads(&self) -> u32 {
        self.reads
    }
}

impl Default for MockFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalogFrontEnd for MockFrontEnd {
    fn read_raw(&mut self, channel: AdcChannel) -> u16 {
        self.reads = self.reads.wrapping_add(1);
        if let Some(clock) = &self.clock {
            clock.advance(self.ticks_per_read);
        }
        if let Some(next) = self.ramp.as_mut() {
            let code = *next;
            *next = next.wrapping_add(1);
            return code;
        }
        self.values.get(&channel.number()).copied().unwrap_or(0)
    }
}

// ── Cache ─────────────────────────────────────────────────────────────────────

/// Cache that records every maintenance call in an [`EventLog`].
#[derive(Debug, Clone)]
pub struct RecordingCache {
    log: EventLog,
}

impl RecordingCache {
    /// Record into `log`.
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl CacheMaintenance for RecordingCache {
    fn flush_range(&mut self, address: usize, len: usize) {
        self.log.record(Event::Flush { address, len });
    }

    fn invalidate_range(&mut self, address: usize, len: usize) {
        self.log.record(Event::Invalidate { address, len });
    }
}

// ── Transfer engine ───────────────────────────────────────────────────────────

/// How a [`MockEngine`] resolves one accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Report busy for `n` polls, then idle.
    AfterPolls(u32),
    /// Stay busy forever, raising `error_bits` in the status register when
    /// the submission is accepted.
    Stall {
        /// Status bits the stalled channel reports.
        error_bits: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Inactive,
    Busy { remaining: u32 },
    Stalled,
}

/// Register-level model of a one-shot transfer engine.
///
/// Status registers follow the [`status`] bit layout: reset leaves both
/// channels halted, completion raises `IDLE | IOC_IRQ`, writing ones
/// clears the sticky interrupt bits, and error bits survive until the next
/// reset.
#[derive(Debug)]
pub struct MockEngine {
    log: EventLog,
    completions: VecDeque<Completion>,
    default_completion: Completion,
    reject: Option<SubmitRejected>,
    reset_polls: u32,
    reset_remaining: u32,
    s2mm_status: u32,
    mm2s_status: u32,
    activity: Activity,
    active_direction: Direction,
    resets: u32,
    submissions: u32,
}

impl MockEngine {
    /// Engine that completes every transfer on the first poll and finishes
    /// reset immediately.
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            completions: VecDeque::new(),
            default_completion: Completion::AfterPolls(0),
            reject: None,
            reset_polls: 0,
            reset_remaining: 0,
            s2mm_status: status::HALTED,
            mm2s_status: status::HALTED,
            activity: Activity::Inactive,
            active_direction: Direction::DeviceToMemory,
            resets: 0,
            submissions: 0,
        }
    }

    /// Completion used once the queued completions are exhausted.
    pub fn with_default_completion(mut self, completion: Completion) -> Self {
        self.default_completion = completion;
        self
    }

    /// Queue the completion for the next accepted submission.
    pub fn then(mut self, completion: Completion) -> Self {
        self.completions.push_back(completion);
        self
    }

    /// Reject every submission with `reason`.
    pub fn rejecting(mut self, reason: SubmitRejected) -> Self {
        self.reject = Some(reason);
        self
    }

    /// `reset_done` reports `false` this many times after each reset request.
    pub fn with_reset_polls(mut self, polls: u32) -> Self {
        self.reset_polls = polls;
        self
    }

    /// Force status bits on `direction`'s channel (stale flags from a
    /// previous run).
    pub fn inject_status(&mut self, direction: Direction, bits: u32) {
        *self.status_mut(direction) |= bits;
    }

    /// Reset requests seen.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Submissions seen, accepted or not.
    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    /// Status register without logging.
    pub fn peek_status(&self, direction: Direction) -> u32 {
        match direction {
            Direction::DeviceToMemory => self.s2mm_status,
            Direction::MemoryToDevice => self.mm2s_status,
        }
    }

    fn status_mut(&mut self, direction: Direction) -> &mut u32 {
        match direction {
            Direction::DeviceToMemory => &mut self.s2mm_status,
            Direction::MemoryToDevice => &mut self.mm2s_status,
        }
    }
}

impl TransferEngine for MockEngine {
    fn start_reset(&mut self) {
        self.log.record(Event::ResetRequested);
        self.resets = self.resets.wrapping_add(1);
        self.reset_remaining = self.reset_polls;
        self.s2mm_status = status::HALTED;
        self.mm2s_status = status::HALTED;
        self.activity = Activity::Inactive;
    }

    fn reset_done(&mut self) -> bool {
        self.log.record(Event::ResetPolled);
        if self.reset_remaining == 0 {
            true
        } else {
            self.reset_remaining = self.reset_remaining.saturating_sub(1);
            false
        }
    }

    fn read_status(&mut self, direction: Direction) -> u32 {
        self.peek_status(direction)
    }

    fn write_status(&mut self, direction: Direction, value: u32) {
        self.log.record(Event::StatusWrite { direction, value });
        *self.status_mut(direction) &= !(value & status::IRQ_MASK);
    }

    fn submit(&mut self, descriptor: &TransferDescriptor) -> Result<(), SubmitRejected> {
        self.log.record(Event::Submit(*descriptor));
        self.submissions = self.submissions.wrapping_add(1);
        if let Some(reason) = self.reject {
            return Err(reason);
        }
        if descriptor.length_bytes() == 0 {
            return Err(SubmitRejected::InvalidLength(0));
        }
        let completion = self
            .completions
            .pop_front()
            .unwrap_or(self.default_completion);
        self.activity = match completion {
            Completion::AfterPolls(n) => Activity::Busy { remaining: n },
            Completion::Stall { error_bits } => {
                *self.status_mut(descriptor.direction()) |= error_bits;
                Activity::Stalled
            }
        };
        self.active_direction = descriptor.direction();
        *self.status_mut(descriptor.direction()) &= !(status::HALTED | status::IDLE);
        Ok(())
    }

    fn busy(&mut self, direction: Direction) -> bool {
        self.log.record(Event::BusyPoll(direction));
        if direction != self.active_direction {
            return false;
        }
        match self.activity {
            Activity::Inactive => false,
            Activity::Stalled => true,
            Activity::Busy { remaining: 0 } => {
                self.activity = Activity::Inactive;
                *self.status_mut(direction) |= status::IDLE | status::IOC_IRQ;
                false
            }
            Activity::Busy { remaining } => {
                self.activity = Activity::Busy {
                    remaining: remaining.saturating_sub(1),
                };
                true
            }
        }
    }
}

// ── PWM ───────────────────────────────────────────────────────────────────────

/// PWM core that records compare writes.
#[derive(Debug, Clone)]
pub struct MockPwm {
    log: EventLog,
    pwm0: Option<u32>,
    pwm1: Option<u32>,
}

impl MockPwm {
    /// Record into `log`.
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            pwm0: None,
            pwm1: None,
        }
    }

    /// Last value written to `channel`.
    pub fn value(&self, channel: PwmChannel) -> Option<u32> {
        match channel {
            PwmChannel::Pwm0 => self.pwm0,
            PwmChannel::Pwm1 => self.pwm1,
        }
    }
}

impl DutyCycleOutput for MockPwm {
    fn set_duty_cycle(&mut self, channel: PwmChannel, value: u32) {
        self.log.record(Event::DutyCycle { channel, value });
        match channel {
            PwmChannel::Pwm0 => self.pwm0 = Some(value),
            PwmChannel::Pwm1 => self.pwm1 = Some(value),
        }
    }
}
