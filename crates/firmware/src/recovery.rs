//! Transfer engine reset.
//!
//! # Fatal wait
//!
//! [`reset`] polls the engine's reset-done flag with no bound. An engine
//! that never finishes its own soft reset is a hardware fault the firmware
//! cannot recover from, and the cycle hangs here rather than continue with
//! an engine in an unknown state. A debugger attached to a hung board will
//! find the core spinning in this loop.

use platform::{EngineState, TransferEngine};

use crate::engine::Engine;

/// Reset the engine and wait until it reports done. Leaves it `Idle`.
///
/// Returns the number of reset-done polls that read "not yet".
pub fn reset<E: TransferEngine>(engine: &mut Engine<E>) -> u32 {
    let from = engine.state;
    engine.hw.start_reset();
    let mut pending_polls: u32 = 0;
    while !engine.hw.reset_done() {
        pending_polls = pending_polls.saturating_add(1);
        core::hint::spin_loop();
    }
    engine.state = EngineState::Idle;
    debug!(
        "transfer engine reset ({:?} -> Idle) after {} polls",
        from, pending_polls
    );
    pending_polls
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::mocks::{Event, EventLog, MockEngine};
    use platform::transfer::status;
    use platform::Direction;

    #[test]
    fn waits_for_reset_done() {
        let log = EventLog::new();
        let mut engine = Engine::new(MockEngine::new(log.clone()).with_reset_polls(3));
        assert_eq!(reset(&mut engine), 3);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(log.count(|e| *e == Event::ResetRequested), 1);
        assert_eq!(log.count(|e| *e == Event::ResetPolled), 4);
        assert_eq!(log.position(|e| *e == Event::ResetRequested), Some(0));
    }

    #[test]
    fn reset_clears_sticky_error_flags() {
        let mut engine = Engine::new(MockEngine::new(EventLog::new()));
        engine
            .hw
            .inject_status(Direction::DeviceToMemory, status::SLAVE_ERROR | status::ERROR_IRQ);
        reset(&mut engine);
        assert_eq!(
            engine.status(Direction::DeviceToMemory) & (status::ERROR_MASK | status::IRQ_MASK),
            0
        );
    }
}
