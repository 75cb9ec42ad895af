//! Cache-coherent one-shot transfer.
//!
//! [`transfer`] performs, in this exact order:
//!
//! 1. flush the descriptor's range from the data cache;
//! 2. write all-ones to the channel status register (clears stale flags);
//! 3. submit the descriptor; a rejection fails immediately;
//! 4. poll the busy flag at most `budget` times;
//! 5. invalidate the same range, whether the transfer completed or timed out.
//!
//! The range is taken from the descriptor, which is built from the staging
//! buffer's valid length and therefore never exceeds the staging region.

use platform::config::PROGRESS_INTERVAL_POLLS;
use platform::transfer::CLEAR_ALL_STATUS;
use platform::{CacheMaintenance, EngineState, SubmitRejected, TransferDescriptor, TransferEngine};

use crate::engine::Engine;

/// Why a transfer did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError {
    /// The engine is not in a state that accepts a submission.
    #[error("transfer engine not ready ({0:?})")]
    EngineNotReady(EngineState),
    /// The engine refused the descriptor.
    #[error("transfer submission rejected: {0}")]
    SubmitFailed(SubmitRejected),
    /// The engine was still busy after the whole poll budget.
    #[error("transfer timed out, status register {status:#x}")]
    Timeout {
        /// Raw status register at the time of the timeout.
        status: u32,
    },
}

/// A completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferReport {
    /// Busy polls issued, including the one that observed completion.
    pub polls: u32,
    /// Bytes transferred.
    pub length_bytes: usize,
    /// Status register after completion.
    pub status: u32,
}

/// Move `descriptor`'s range through the engine with cache maintenance on
/// both sides. See the module docs for the step order.
pub fn transfer<E, C>(
    engine: &mut Engine<E>,
    cache: &mut C,
    descriptor: &TransferDescriptor,
    budget: u32,
) -> Result<TransferReport, TransferError>
where
    E: TransferEngine,
    C: CacheMaintenance + ?Sized,
{
    if !engine.state.accepts_submission() {
        warn!("transfer refused: engine is {:?}", engine.state);
        return Err(TransferError::EngineNotReady(engine.state));
    }

    let address = descriptor.address();
    let len = descriptor.length_bytes();
    let direction = descriptor.direction();
    debug!(
        "transfer {} bytes at {:#x} ({:?})",
        len, address, direction
    );

    cache.flush_range(address, len);
    engine.hw.write_status(direction, CLEAR_ALL_STATUS);

    if let Err(reason) = engine.hw.submit(descriptor) {
        error!("transfer submission rejected: {}", reason);
        return Err(TransferError::SubmitFailed(reason));
    }
    engine.state = EngineState::Transferring;

    let mut completed_after = None;
    for poll in 1..=budget {
        if !engine.hw.busy(direction) {
            completed_after = Some(poll);
            break;
        }
        if poll % PROGRESS_INTERVAL_POLLS == 0 {
            info!("transfer still busy after {} polls", poll);
        }
    }

    let status = engine.hw.read_status(direction);
    cache.invalidate_range(address, len);

    match completed_after {
        Some(polls) => {
            engine.state = EngineState::Completed;
            info!("transfer complete: {} bytes, {} polls", len, polls);
            Ok(TransferReport {
                polls,
                length_bytes: len,
                status,
            })
        }
        None => {
            engine.state = EngineState::TimedOut;
            error!(
                "transfer timed out after {} polls, status {:#x}",
                budget, status
            );
            Err(TransferError::Timeout { status })
        }
    }
}
