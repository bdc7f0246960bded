use types::{combined::BeaconState, preset::Preset, primitives::{Epoch, Gwei, ValidatorIndex}};

use crate::{accessors, error::Error, misc};

pub fn increase_balance<P: Preset>(state: &mut BeaconState<P>, index: ValidatorIndex, delta: Gwei) {
    let mut balances = state.balances().iter().copied().collect::<Vec<_>>();

    if let Some(balance) = balances.get_mut(index as usize) {
        *balance = balance.saturating_add(delta);
    }

    state.set_balances_from_flat_buffer(balances);
}

/// Balances never go negative; this models the consensus spec's identical saturation
/// (`SPEC_FULL.md` §4.7).
pub fn decrease_balance<P: Preset>(state: &mut BeaconState<P>, index: ValidatorIndex, delta: Gwei) {
    let mut balances = state.balances().iter().copied().collect::<Vec<_>>();

    if let Some(balance) = balances.get_mut(index as usize) {
        *balance = balance.saturating_sub(delta);
    }

    state.set_balances_from_flat_buffer(balances);
}

/// Marks a validator for exit, advancing the exit queue's churn-limited epoch if another
/// validator already queued to exit this epoch (`SPEC_FULL.md` §4.4(d)).
pub fn initiate_validator_exit<P: Preset>(
    state: &mut BeaconState<P>,
    index: ValidatorIndex,
    exit_queue_epoch: &mut Epoch,
    exit_queue_churn: &mut u64,
    churn_limit: u64,
) -> Result<(), Error> {
    let current_epoch = accessors::get_current_epoch(state);
    let exit_epoch_floor = misc::compute_activation_exit_epoch(current_epoch);

    if *exit_queue_epoch < exit_epoch_floor {
        *exit_queue_epoch = exit_epoch_floor;
        *exit_queue_churn = 0;
    }

    if *exit_queue_churn >= churn_limit {
        *exit_queue_epoch += 1;
        *exit_queue_churn = 0;
    }

    let exit_epoch = *exit_queue_epoch;
    *exit_queue_churn += 1;

    let validator_count = state.validator_count();
    let validator = state
        .validator_mut(index)
        .ok_or(Error::ValidatorIndexOutOfRange {
            index,
            validator_count,
        })?;

    if validator.exit_epoch != types::primitives::FAR_FUTURE_EPOCH {
        return Ok(());
    }

    validator.exit_epoch = exit_epoch;
    validator.withdrawable_epoch = misc::compute_withdrawable_epoch(exit_epoch);

    Ok(())
}

#[cfg(test)]
mod tests {
    use types::{config::Config, phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal, primitives::H256};

    use super::*;

    fn state_with_one_validator() -> BeaconState<Minimal> {
        let config = Config::minimal_altair_from_genesis();
        let mut state =
            Phase0BeaconState::<Minimal>::genesis(config.min_genesis_time, H256::zero(), Default::default());
        state.validators.push(types::phase0::containers::Validator::default());
        state.balances.push(32_000_000_000);
        BeaconState::Phase0(state.into())
    }

    #[test]
    fn increase_balance_adds_delta() {
        let mut state = state_with_one_validator();
        increase_balance(&mut state, 0, 1_000_000_000);
        assert_eq!(*state.balances().get(0).unwrap(), 33_000_000_000);
    }

    #[test]
    fn decrease_balance_saturates_at_zero() {
        let mut state = state_with_one_validator();
        decrease_balance(&mut state, 0, 100_000_000_000);
        assert_eq!(*state.balances().get(0).unwrap(), 0);
    }
}
