use crate::{config::Config, preset::Preset, primitives::Slot};

/// Which fork a given slot's state belongs to. `transition_functions::combined` matches on this
/// to decide which sub-phase implementations to run; it is the Rust-side stand-in for "tagged
/// variants on `EpochSummary` inputs" from `SPEC_FULL.md` §9.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Phase0,
    Altair,
}

impl Phase {
    #[must_use]
    pub fn at_slot<P: Preset>(config: &Config, slot: Slot) -> Self {
        let epoch = slot / P::SLOTS_PER_EPOCH;

        if epoch >= config.altair_fork_epoch {
            Self::Altair
        } else {
            Self::Phase0
        }
    }
}

/// Distinguishes the previous epoch from the current one when a computation (shuffling, a
/// committee lookup) depends on which of the two is meant; used by the epoch cache's rotated
/// `previous`/`current`/`next` triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelativeEpoch {
    Previous,
    Current,
    Next,
}
