use std_ext::ArcExt as _;
use types::{
    altair::containers::SyncCommittee,
    combined::BeaconState,
    phase0::containers::Validator,
    preset::Preset,
    primitives::{Epoch, Gwei, Slot, ValidatorIndex, H256},
};

use crate::{error::Error, predicates};

/// `state.slot / SLOTS_PER_EPOCH`.
#[must_use]
pub fn get_current_epoch<P: Preset>(state: &BeaconState<P>) -> Epoch {
    state.current_epoch()
}

/// `GENESIS_EPOCH` at genesis, otherwise the epoch before the current one.
#[must_use]
pub fn get_previous_epoch<P: Preset>(state: &BeaconState<P>) -> Epoch {
    state.previous_epoch()
}

/// Indices of every validator active at `epoch`, in ascending order.
#[must_use]
pub fn get_active_validator_indices<P: Preset>(
    state: &BeaconState<P>,
    epoch: Epoch,
) -> Vec<ValidatorIndex> {
    state
        .validators()
        .iter()
        .enumerate()
        .filter(|(_, validator)| predicates::is_active_validator(validator, epoch))
        .map(|(index, _)| index as ValidatorIndex)
        .collect()
}

/// Sum of `indices`' effective balances, with no floor applied (callers needing the
/// `EFFECTIVE_BALANCE_INCREMENT`-floored total active stake apply that themselves; see
/// `transition_functions::epoch_summary`).
#[must_use]
pub fn get_total_balance<P: Preset>(state: &BeaconState<P>, indices: &[ValidatorIndex]) -> Gwei {
    indices
        .iter()
        .filter_map(|&index| state.validator(index))
        .map(|validator| validator.effective_balance)
        .sum()
}

#[must_use]
pub fn get_total_active_balance<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> Gwei {
    get_total_balance(state, &get_active_validator_indices(state, epoch))
}

/// The root of the block that closed out `epoch`, read off `block_roots[slot % N]` at the epoch's
/// first slot.
pub fn get_block_root<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> Result<H256, Error> {
    get_block_root_at_slot(state, epoch * P::SLOTS_PER_EPOCH)
}

pub fn get_block_root_at_slot<P: Preset>(
    state: &BeaconState<P>,
    slot: Slot,
) -> Result<H256, Error> {
    let current_slot = state.slot();

    if slot >= current_slot || current_slot > slot + P::SLOTS_PER_HISTORICAL_ROOT {
        return Err(Error::SlotOutOfRange { slot, current_slot });
    }

    Ok(state.block_root((slot % P::SLOTS_PER_HISTORICAL_ROOT) as usize))
}

pub fn validator_or_error<P: Preset>(
    state: &BeaconState<P>,
    index: ValidatorIndex,
) -> Result<&Validator, Error> {
    state.validator(index).ok_or(Error::ValidatorIndexOutOfRange {
        index,
        validator_count: state.validator_count(),
    })
}

/// Builds the sync committee that should become `next_sync_committee` once the Altair-only
/// sync-committee period rolls over, by taking the first `SYNC_COMMITTEE_SIZE` active validators
/// by index. Weighted-by-balance sampling (as the real consensus spec does, keyed by a RANDAO
/// seed) is replaced by this simplification because aggregate-signature sync duties themselves are
/// out of scope (see `SPEC_FULL.md` §1 Non-goals); only a deterministic, stable member list is
/// required downstream.
pub fn get_next_sync_committee<P: Preset>(
    state: &BeaconState<P>,
) -> Result<std::sync::Arc<SyncCommittee<P>>, Error> {
    let active_indices = get_active_validator_indices(state, get_current_epoch(state));

    // `cycle().take(N)` on an empty iterator yields nothing, which would otherwise reach
    // `SyncCommittee::new`'s length assertion with a short `pubkeys` vector and panic.
    if active_indices.is_empty() {
        return Err(Error::NoActiveValidators);
    }

    let pubkeys = active_indices
        .into_iter()
        .cycle()
        .take(P::SYNC_COMMITTEE_SIZE as usize)
        .map(|index| validator_or_error(state, index).map(|validator| validator.pubkey))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(std::sync::Arc::new(SyncCommittee::new(pubkeys)))
}

#[must_use]
pub fn clone_arc<T>(arc: &std::sync::Arc<T>) -> std::sync::Arc<T> {
    arc.clone_arc()
}

#[cfg(test)]
mod tests {
    use types::{config::Config, phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal};

    use super::*;

    fn genesis_state() -> BeaconState<Minimal> {
        let config = Config::minimal_altair_from_genesis();
        let state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        BeaconState::Phase0(state.into())
    }

    #[test]
    fn current_epoch_of_genesis_state_is_genesis_epoch() {
        assert_eq!(get_current_epoch(&genesis_state()), 0);
    }

    #[test]
    fn previous_epoch_of_genesis_state_does_not_underflow() {
        assert_eq!(get_previous_epoch(&genesis_state()), 0);
    }

    #[test]
    fn next_sync_committee_with_no_active_validators_errors_instead_of_panicking() {
        let state = genesis_state();
        assert_eq!(get_next_sync_committee(&state), Err(Error::NoActiveValidators));
    }

    #[test]
    fn block_root_at_current_slot_is_out_of_range() {
        let state = genesis_state();
        assert_eq!(
            get_block_root_at_slot(&state, state.slot()),
            Err(Error::SlotOutOfRange {
                slot: state.slot(),
                current_slot: state.slot(),
            }),
        );
    }
}
