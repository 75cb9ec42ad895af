//! Timed sampling loop.
//!
//! Reads one channel of the analog front-end as fast as the bus allows,
//! converts each code and appends it to the staging buffer until the capture
//! window closes or the buffer is full.
//!
//! # Deadline checks
//!
//! | Policy              | Timer read                | Overshoot past deadline  |
//! |---------------------|---------------------------|--------------------------|
//! | `PerSample`         | after every sample        | at most one sample       |
//! | `Batched { batch }` | after every `batch`-th    | at most `batch - 1` samples |
//!
//! The window is opened from a single timer read before the first sample.

use platform::{
    AnalogFrontEnd, CaptureSettings, CaptureWindow, DeadlinePolicy, MonotonicTimer,
    StagingBuffer,
};

/// Why the sampling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopReason {
    /// The capture window closed.
    Deadline,
    /// Every staging cell holds a sample.
    BufferFull,
}

/// Outcome of one sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureReport {
    /// Samples staged.
    pub sample_count: usize,
    /// Why the loop stopped.
    pub stop_reason: StopReason,
    /// Ticks from window open to the final timer read.
    pub elapsed_ticks: u32,
}

/// Run the sampling loop into `buffer`, which is appended to as is.
pub fn capture<A, T>(
    front_end: &mut A,
    timer: &mut T,
    buffer: &mut StagingBuffer<'_>,
    settings: &CaptureSettings,
) -> CaptureReport
where
    A: AnalogFrontEnd + ?Sized,
    T: MonotonicTimer + ?Sized,
{
    let check_every = match settings.deadline_policy {
        DeadlinePolicy::PerSample => 1,
        DeadlinePolicy::Batched { batch } => batch.get(),
    };
    let window = CaptureWindow::open(timer.now(), settings.window_ticks);
    let first = buffer.len();
    let mut since_check: usize = 0;

    let stop_reason = loop {
        if buffer.is_full() {
            break StopReason::BufferFull;
        }
        let raw = front_end.read_raw(settings.channel);
        let sample = settings.conversion.apply(raw);
        if buffer.push(sample).is_err() {
            break StopReason::BufferFull;
        }
        trace!("sample {}: {:#x}", buffer.len(), sample);

        since_check = since_check.saturating_add(1);
        if since_check >= check_every {
            since_check = 0;
            if window.expired(timer.now()) {
                break StopReason::Deadline;
            }
        }
    };

    let elapsed_ticks = window.elapsed(timer.now());
    let sample_count = buffer.len().saturating_sub(first);
    info!(
        "captured {} samples in {} ticks ({:?})",
        sample_count, elapsed_ticks, stop_reason
    );
    CaptureReport {
        sample_count,
        stop_reason,
        elapsed_ticks,
    }
}
