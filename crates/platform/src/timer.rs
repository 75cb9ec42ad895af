//! Monotonic tick source and the bounded capture window.
//!
//! The capture window is the only notion of time in the pipeline. It is
//! opened once per cycle from a single timer read and its deadline is never
//! recomputed. All tick arithmetic wraps, so a window that straddles the
//! 32-bit counter rollover still expires after exactly `length` ticks.
//!
//! # Example
//!
//! ```
//! use platform::timer::{ticks_for_duration, CaptureWindow};
//!
//! let length = ticks_for_duration(100, 10_000_000).unwrap();
//! assert_eq!(length, 1_000_000);
//!
//! // Window opened just before the counter wraps.
//! let window = CaptureWindow::open(u32::MAX - 10, length);
//! assert!(!window.expired(5));
//! assert!(window.expired(length.wrapping_sub(11)));
//! ```

/// Free-running 32-bit tick counter.
///
/// Implementations must be monotonic modulo 2^32: consecutive reads never
/// move backwards except when the counter wraps.
pub trait MonotonicTimer {
    /// Current counter value.
    fn now(&mut self) -> u32;

    /// Counter frequency in Hz.
    fn tick_hz(&self) -> u32;
}

/// A capture duration does not fit the 32-bit tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("{duration_ms} ms at {tick_hz} Hz overflows the 32-bit tick counter")]
pub struct WindowTooLong {
    /// Requested capture duration in milliseconds.
    pub duration_ms: u32,
    /// Counter frequency the duration was converted at.
    pub tick_hz: u32,
}

/// Convert a duration in milliseconds to counter ticks.
///
/// Computed in 64-bit as `ms * hz / 1000`, then narrowed.
pub fn ticks_for_duration(duration_ms: u32, tick_hz: u32) -> Result<u32, WindowTooLong> {
    let ticks = u64::from(duration_ms)
        .checked_mul(u64::from(tick_hz))
        .map(|t| t / 1000)
        .ok_or(WindowTooLong {
            duration_ms,
            tick_hz,
        })?;
    u32::try_from(ticks).map_err(|_| WindowTooLong {
        duration_ms,
        tick_hz,
    })
}

/// Fixed-length window measured on a [`MonotonicTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureWindow {
    start: u32,
    length: u32,
    deadline: u32,
}

impl CaptureWindow {
    /// Open a window starting at `start` that lasts `length` ticks.
    pub const fn open(start: u32, length: u32) -> Self {
        Self {
            start,
            length,
            deadline: start.wrapping_add(length),
        }
    }

    /// Counter value the window was opened at.
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Window length in ticks.
    pub const fn length(&self) -> u32 {
        self.length
    }

    /// Counter value at which the window closes (may have wrapped).
    pub const fn deadline(&self) -> u32 {
        self.deadline
    }

    /// Ticks elapsed since the window opened.
    pub const fn elapsed(&self, now: u32) -> u32 {
        now.wrapping_sub(self.start)
    }

    /// `true` once at least `length` ticks have elapsed.
    ///
    /// Compares elapsed time rather than `now >= deadline`, which would
    /// misfire when `deadline` has wrapped past zero.
    pub const fn expired(&self, now: u32) -> bool {
        self.elapsed(now) >= self.length
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hundred_ms_at_ten_mhz_is_one_million_ticks() {
        assert_eq!(ticks_for_duration(100, 10_000_000).unwrap(), 1_000_000);
    }

    #[test]
    fn sub_tick_durations_round_down() {
        assert_eq!(ticks_for_duration(1, 999).unwrap(), 0);
        assert_eq!(ticks_for_duration(3, 1_000).unwrap(), 3);
    }

    #[test]
    fn oversized_window_is_rejected() {
        let err = ticks_for_duration(u32::MAX, 400_000_000).unwrap_err();
        assert_eq!(err.duration_ms, u32::MAX);
        assert_eq!(err.tick_hz, 400_000_000);
    }

    #[test]
    fn largest_window_that_fits_is_accepted() {
        // 10_737 ms at 400 MHz = 4_294_800_000 ticks, just below 2^32.
        assert_eq!(
            ticks_for_duration(10_737, 400_000_000).unwrap(),
            4_294_800_000
        );
        assert!(ticks_for_duration(10_738, 400_000_000).is_err());
    }

    #[test]
    fn deadline_is_computed_at_open() {
        let w = CaptureWindow::open(1_000, 500);
        assert_eq!(w.deadline(), 1_500);
        assert!(!w.expired(1_499));
        assert!(w.expired(1_500));
    }

    #[test]
    fn window_across_rollover_expires_after_length() {
        let w = CaptureWindow::open(u32::MAX - 99, 200);
        assert_eq!(w.deadline(), 100);
        // Deadline numerically below start: a naive `now >= deadline`
        // comparison would fire immediately.
        assert!(!w.expired(u32::MAX));
        assert!(!w.expired(99));
        assert!(w.expired(100));
        assert_eq!(w.elapsed(100), 200);
    }
}
