use thiserror::Error;

use types::{nonstandard::Phase, primitives::Slot};

/// The taxonomy from `SPEC_FULL.md` §7. Every variant is deterministic and non-retryable: the
/// caller (block processor) treats the producing transition as failed and the state as unusable,
/// matching `transition_functions::unphased::Error` in the teacher crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("slot is not later (current: {current}, target: {target})")]
    SlotNotLater { current: Slot, target: Slot },

    #[error("state invariant violated: {0}")]
    InvariantViolation(String),

    #[error("fork mismatch: processor for {expected:?} invoked on a {actual:?} state")]
    ForkMismatch { expected: Phase, actual: Phase },

    #[error("arithmetic overflow while computing {0}")]
    ArithmeticOverflow(String),
}
