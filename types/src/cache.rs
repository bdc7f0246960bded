use crate::{
    error::Error,
    primitives::{Gwei, Slot, ValidatorIndex},
};

/// One epoch's worth of derived, rotatable state: a shuffled index ordering used to carve
/// committees out of, and the proposer chosen for each slot. `transition_functions::epoch_cache`
/// owns the algorithms that produce and rotate these (`SPEC_FULL.md` §4.2); this struct only
/// carries the resulting dense vectors so that `types` itself stays free of the shuffling
/// implementation it would otherwise have to depend on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochSeedData {
    pub shuffled_indices: Vec<ValidatorIndex>,
    pub proposer_indices: Vec<ValidatorIndex>,
}

/// The rotating `(previous, current, next)` cache attached to a state between epoch transitions.
/// `build` populates all three from scratch (used once, right after genesis or a fork upgrade);
/// `rotate` reuses `current`/`next` to avoid recomputing the shuffle twice per epoch, mirroring
/// the teacher crate's slot-head caching strategy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EpochCache {
    pub previous: EpochSeedData,
    pub current: EpochSeedData,
    pub next: EpochSeedData,

    /// Snapshot of every validator's effective balance as of cache construction, used by
    /// proposer-selection weighted sampling without re-reading the live balances tree per draw.
    pub effective_balances: Vec<Gwei>,

    /// Active validator indices in the current epoch, cached for `churn_limit()`.
    pub active_validator_count: usize,

    pub churn_limit: u64,
}

impl EpochCache {
    #[must_use]
    pub fn churn_limit(&self) -> u64 {
        self.churn_limit
    }

    pub fn proposer_index(&self, slot_in_epoch: Slot) -> Result<ValidatorIndex, Error> {
        self.current
            .proposer_indices
            .get(slot_in_epoch as usize)
            .copied()
            .ok_or(Error::CacheNotBuilt)
    }
}
