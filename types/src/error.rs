use thiserror::Error;

use crate::nonstandard::Phase;

/// Errors raised by the typed state/cache layer itself, as opposed to the epoch-transition
/// algorithms in `transition_functions` (whose own `unphased::Error` covers the rest of
/// `SPEC_FULL.md` §7's taxonomy).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("expected a {expected:?} state but got a {actual:?} state")]
    PhaseMismatch { expected: Phase, actual: Phase },

    #[error("epoch cache has not been built for this state")]
    CacheNotBuilt,
}
