use thiserror::Error;

use types::primitives::{Epoch, Slot, ValidatorIndex};

/// Conditions the epoch transition can hit that are not expressible as a `Result` from a tightly
/// typed leaf function (out-of-range slot/epoch lookups, malformed validator indices). Mirrors the
/// per-crate `thiserror::Error` split the teacher crate uses for `helper_functions` alongside
/// `ssz::Error` and `transition_functions::unphased::Error`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("slot {slot} is not within the historical root buffer reachable from slot {current_slot}")]
    SlotOutOfRange { slot: Slot, current_slot: Slot },

    #[error("epoch {epoch} is not the previous or current epoch of {current_epoch}")]
    EpochOutOfRange { epoch: Epoch, current_epoch: Epoch },

    #[error("validator index {index} is out of bounds for {validator_count} validators")]
    ValidatorIndexOutOfRange {
        index: ValidatorIndex,
        validator_count: usize,
    },

    #[error("cannot form a sync committee with zero active validators")]
    NoActiveValidators,
}
