//! Transfer engine handle with lifecycle tracking.
//!
//! [`Engine`] wraps a register-level [`TransferEngine`] and records where it
//! is in its lifecycle. State only changes through [`crate::recovery::reset`]
//! and [`crate::transfer::transfer`]:
//!
//! ```text
//! Uninitialized ──reset──▶ Idle ──submit ok──▶ Transferring ──▶ Completed
//!       ▲                   ▲                         │
//!       │                   └──────────reset──────────┴──────▶ TimedOut
//!  power-on
//! ```
//!
//! A submission from `Uninitialized` or `TimedOut` is refused until the
//! engine has been reset.

use platform::{Direction, EngineState, TransferEngine};

/// Owned transfer engine plus its lifecycle state.
#[derive(Debug)]
pub struct Engine<E> {
    pub(crate) hw: E,
    pub(crate) state: EngineState,
}

impl<E: TransferEngine> Engine<E> {
    /// Wrap a freshly configured engine. It starts `Uninitialized`.
    pub fn new(hw: E) -> Self {
        Self {
            hw,
            state: EngineState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Raw status register of the channel serving `direction`.
    pub fn status(&mut self, direction: Direction) -> u32 {
        self.hw.read_status(direction)
    }

    /// Register-level engine, read only.
    pub fn hw(&self) -> &E {
        &self.hw
    }

    /// Release the register-level engine.
    pub fn into_inner(self) -> E {
        self.hw
    }
}
