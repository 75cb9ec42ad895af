//! ADC capture firmware
//!
//! Bounded-time sampling of one analog channel into a fixed staging region,
//! followed by a one-shot, cache-coherent DMA offload of that region.
//!
//! # Architecture
//!
//! This firmware follows a layered architecture:
//!
//! ```text
//! Binaries (main.rs on hardware, capture-sim on the host)
//!         ↓
//! Cycle orchestration (cycle, bootstrap)
//!         ↓
//! Pipeline stages (capture, transfer, recovery)
//!         ↓
//! Register drivers (drivers, registers) + Cortex-M7 backends
//!         ↓
//! Platform HAL (platform crate traits)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the Cortex-M7 target (cortex-m-rt, defmt over RTT)
//! - `emulator` - Build the host simulator (tracing, platform mocks)
//! - `std` - Enable standard library (for emulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Host Simulator
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin capture-sim --features emulator -- --preset raw-batched
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]

#[macro_use]
mod log;

pub mod board;
pub mod bootstrap;
pub mod capture;
pub mod cycle;
pub mod drivers;
pub mod engine;
pub mod recovery;
pub mod registers;
pub mod transfer;

#[cfg(feature = "hardware")]
pub mod cortex_m7;

// Re-export key types
pub use bootstrap::{
    initialize_actuator, initialize_analog_front_end, initialize_transfer_engine, read_health,
    InitError,
};
pub use capture::{capture, CaptureReport, StopReason};
pub use cycle::{run_cycle, AttemptOutcome, CycleError, CyclePeripherals, CycleReport};
pub use drivers::{AxiDma, HandshakeFailed, PwmCore, SysMon};
pub use engine::Engine;
pub use registers::{Mmio, RegisterBus};
pub use transfer::{transfer, TransferError, TransferReport};

#[cfg(feature = "hardware")]
pub use cortex_m7::{DwtTimer, ScbCache};
