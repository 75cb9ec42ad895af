//! Hardware Abstraction Layer (HAL) for the ADC capture board
//!
//! This crate provides trait-based abstractions for every peripheral the
//! capture pipeline touches, plus the domain types shared between the
//! firmware and its host tests.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: bootstrap, capture, transfer, cycle)
//!         ↓
//! Platform HAL (this crate - traits, newtypes, memory map, config)
//!         ↓
//! Register drivers (firmware::drivers) + Cortex-M7 cache/timer backends
//! ```
//!
//! # Abstraction Levels
//!
//! ## Peripherals
//! - [`AnalogFrontEnd`] - System monitor conversion results
//! - [`TransferEngine`] - One-shot DMA engine registers
//! - [`CacheMaintenance`] - Data cache flush / invalidate by range
//! - [`MonotonicTimer`] - Free-running tick counter
//! - [`DutyCycleOutput`] - PWM compare registers
//!
//! ## Domain types
//! - [`staging`] - Append-only sample buffer over a fixed region
//! - [`memory_map`] - Physical staging regions
//! - [`timer`] - Wraparound-safe capture window
//! - [`config`] - Cycle configuration and presets
//! - [`calibration`] - Raw code conversions
//! - [`hw_description`] - Static peripheral table
//!
//! # Features
//!
//! - `std`: Enable standard library support and [`mocks`] (for testing)
//! - `defmt`: Enable defmt formatting of all public types
//!
//! # Example
//!
//! ```
//! use platform::{StagingBuffer, TransferDescriptor, Direction};
//!
//! let mut cells = [0u32; 16];
//! let mut buffer = StagingBuffer::new(0x0020_0000, &mut cells);
//! buffer.push(0x8000).unwrap();
//!
//! let d = TransferDescriptor::for_staging(&buffer, Direction::DeviceToMemory);
//! assert_eq!(d.length_bytes(), 4);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod actuator;
pub mod adc;
pub mod cache;
pub mod calibration;
pub mod config;
pub mod hw_description;
pub mod memory_map;
pub mod staging;
pub mod timer;
pub mod transfer;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-exports
pub use actuator::{ActuatorSetup, DutyCycle, DutyCycleOutput, PwmChannel};
pub use adc::{AdcChannel, AnalogFrontEnd, HealthSnapshot};
pub use cache::CacheMaintenance;
pub use calibration::SampleConversion;
pub use config::{
    CaptureConfig, CaptureSettings, ConfigError, DeadlinePolicy, ResetPolicy, TimeoutRetry,
};
pub use hw_description::{DeviceId, HardwareDescription, PeripheralDescriptor, PeripheralKind};
pub use memory_map::{RegionError, StagingRegion};
pub use staging::{BufferFull, StagingBuffer};
pub use timer::{CaptureWindow, MonotonicTimer, WindowTooLong};
pub use transfer::{Direction, EngineState, SubmitRejected, TransferDescriptor, TransferEngine};
