//! Cortex-M7 backends for the cache and timer traits.
//!
//! Only built with the `hardware` feature.

use cortex_m::peripheral::{DCB, DWT, SCB};
use platform::cache::line_span;
use platform::{CacheMaintenance, MonotonicTimer};

/// Data cache maintenance through the SCB's by-address operations.
pub struct ScbCache {
    scb: SCB,
}

impl ScbCache {
    /// Take ownership of the SCB. The data cache must already be enabled.
    pub fn new(scb: SCB) -> Self {
        Self { scb }
    }

    /// Release the SCB.
    pub fn release(self) -> SCB {
        self.scb
    }
}

impl CacheMaintenance for ScbCache {
    fn flush_range(&mut self, address: usize, len: usize) {
        if let Some((start, span)) = line_span(address, len) {
            self.scb.clean_dcache_by_address(start, span);
        }
    }

    #[allow(unsafe_code)]
    fn invalidate_range(&mut self, address: usize, len: usize) {
        if let Some((start, span)) = line_span(address, len) {
            // SAFETY: the span is widened to whole cache lines and only ever
            // covers the staging region, which nothing but the staging buffer
            // and the transfer engine touch. Discarding lines there cannot
            // lose CPU writes the buffer still needs: it was flushed before
            // submission and is not written while the engine owns it.
            unsafe { self.scb.invalidate_dcache_by_address(start, span) };
        }
    }
}

/// DWT cycle counter as the capture window clock.
pub struct DwtTimer {
    _dwt: DWT,
    tick_hz: u32,
}

impl DwtTimer {
    /// Enable tracing and start the cycle counter.
    ///
    /// `core_hz` is the core clock, which the counter runs at.
    pub fn new(dcb: &mut DCB, mut dwt: DWT, core_hz: u32) -> Self {
        dcb.enable_trace();
        DWT::unlock();
        dwt.enable_cycle_counter();
        Self {
            _dwt: dwt,
            tick_hz: core_hz,
        }
    }
}

impl MonotonicTimer for DwtTimer {
    fn now(&mut self) -> u32 {
        DWT::cycle_count()
    }

    fn tick_hz(&self) -> u32 {
        self.tick_hz
    }
}
