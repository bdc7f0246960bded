use types::{
    combined::BeaconState,
    consts::{
        EFFECTIVE_BALANCE_INCREMENT, EPOCHS_PER_ETH1_VOTING_PERIOD, HYSTERESIS_DOWNWARD_MULTIPLIER,
        HYSTERESIS_QUOTIENT, HYSTERESIS_UPWARD_MULTIPLIER, MAX_EFFECTIVE_BALANCE,
        PROPORTIONAL_SLASHING_MULTIPLIER, PROPORTIONAL_SLASHING_MULTIPLIER_ALTAIR,
    },
    nonstandard::Phase,
    preset::Preset,
    primitives::{Gwei, ValidatorIndex, FAR_FUTURE_EPOCH},
};

use crate::epoch_summary::EpochSummary;
use helper_functions::{misc, mutators};

/// Per-slot bookkeeping shared identically by both forks: caches the state's own root into
/// `state_roots`, patches `latest_block_header.state_root` the first time it is read this slot,
/// caches the resulting header root into `block_roots`, and caches the new randao mix at slot
/// start (`SPEC_FULL.md` §4.6 steps 2 and 4). The randao mix "cache" is a same-slot copy rather
/// than a real reveal-driven update: per-block RANDAO processing is out of scope (no block
/// processing is modeled by this engine), so there is no reveal to mix in here.
pub fn process_slot<P: Preset>(state: &mut BeaconState<P>) {
    let previous_state_root = state.hash_tree_root();
    let index = (state.slot() % P::SLOTS_PER_HISTORICAL_ROOT) as usize;

    state.set_state_root(index, previous_state_root);

    if state.latest_block_header_state_root_is_zeroed() {
        state.set_latest_block_header_state_root(previous_state_root);
    }

    let previous_block_root = state.latest_block_header().hash_tree_root();
    state.set_block_root(index, previous_block_root);

    let mix_index = (state.current_epoch() % P::EPOCHS_PER_HISTORICAL_VECTOR) as usize;
    let mix = state.randao_mix(mix_index);
    state.set_randao_mix(mix_index, mix);
}

/// Applies the 4-bit justification rule and advances `finalized_checkpoint` accordingly
/// (`SPEC_FULL.md` §4.4(a)). A no-op before the second epoch exists, since there is no previous
/// epoch to justify yet.
pub fn process_justification_and_finalization<P: Preset>(
    state: &mut BeaconState<P>,
    summary: &EpochSummary,
) {
    if summary.current_epoch <= types::primitives::GENESIS_EPOCH + 1 {
        return;
    }

    let old_previous_justified = state.previous_justified_checkpoint();
    let old_current_justified = state.current_justified_checkpoint();

    state.set_previous_justified_checkpoint(old_current_justified);

    let mut bits = (state.justification_bits() << 1) & 0b1111;
    let total = summary.total_active_stake;
    let by_flag = summary.unslashed_stake_by_flag;

    if by_flag.prev_target * 3 >= total * 2 {
        bits |= 0b0010;
        state.set_current_justified_checkpoint(types::phase0::containers::Checkpoint {
            epoch: summary.previous_epoch,
            root: state.block_root((summary.previous_epoch * P::SLOTS_PER_EPOCH
                % P::SLOTS_PER_HISTORICAL_ROOT) as usize),
        });
    }

    if by_flag.curr_target * 3 >= total * 2 {
        bits |= 0b0001;
        state.set_current_justified_checkpoint(types::phase0::containers::Checkpoint {
            epoch: summary.current_epoch,
            root: state.block_root((summary.current_epoch * P::SLOTS_PER_EPOCH
                % P::SLOTS_PER_HISTORICAL_ROOT) as usize),
        });
    }

    state.set_justification_bits(bits);

    let current_epoch = summary.current_epoch;

    // The 2nd/3rd/4th most recent epochs are justified, the 2nd using the 4th as source.
    if bits & 0b1110 == 0b1110 && old_previous_justified.epoch + 3 == current_epoch {
        state.set_finalized_checkpoint(old_previous_justified);
    }
    // The 2nd/3rd most recent epochs are justified, the 2nd using the 3rd as source.
    else if bits & 0b0110 == 0b0110 && old_previous_justified.epoch + 2 == current_epoch {
        state.set_finalized_checkpoint(old_previous_justified);
    }

    // The 1st/2nd/3rd most recent epochs are justified, the 1st using the 3rd as source.
    if bits & 0b0111 == 0b0111 && old_current_justified.epoch + 2 == current_epoch {
        state.set_finalized_checkpoint(old_current_justified);
    }
    // The 1st/2nd most recent epochs are justified, the 1st using the 2nd as source.
    else if bits & 0b0011 == 0b0011 && old_current_justified.epoch + 1 == current_epoch {
        state.set_finalized_checkpoint(old_current_justified);
    }
}

/// Moves validators between activation queue, active set, and exit, in that order
/// (`SPEC_FULL.md` §4.4(d)). The exit-queue churn accounting is seeded fresh from the validator
/// set's current exit epochs rather than carried across calls, since voluntary exits from block
/// processing are out of this engine's scope and every ejection happens in this single pass.
pub fn process_registry_updates<P: Preset>(
    state: &mut BeaconState<P>,
    summary: &EpochSummary,
    churn_limit: u64,
) -> anyhow::Result<()> {
    let current_epoch = summary.current_epoch;

    for &index in &summary.indices_eligible_for_activation_queue {
        if let Some(validator) = state.validator_mut(index) {
            validator.activation_eligibility_epoch = current_epoch + 1;
        }
    }

    if !summary.indices_to_eject.is_empty() {
        let exit_epoch_floor = misc::compute_activation_exit_epoch(current_epoch);

        let mut exit_queue_epoch = state
            .validators()
            .iter()
            .map(|validator| validator.exit_epoch)
            .filter(|&epoch| epoch != FAR_FUTURE_EPOCH)
            .max()
            .unwrap_or(exit_epoch_floor)
            .max(exit_epoch_floor);

        let mut exit_queue_churn = state
            .validators()
            .iter()
            .filter(|validator| validator.exit_epoch == exit_queue_epoch)
            .count() as u64;

        for &index in &summary.indices_to_eject {
            mutators::initiate_validator_exit(
                state,
                index,
                &mut exit_queue_epoch,
                &mut exit_queue_churn,
                churn_limit,
            )?;
        }
    }

    let activation_exit_epoch = misc::compute_activation_exit_epoch(current_epoch);

    for &index in summary
        .indices_eligible_for_activation
        .iter()
        .take(churn_limit as usize)
    {
        if let Some(validator) = state.validator_mut(index) {
            validator.activation_epoch = activation_exit_epoch;
        }
    }

    Ok(())
}

/// Applies the proportional slashing penalty to every validator `epoch_summary` flagged as
/// slashed-this-period (`SPEC_FULL.md` §4.4(e)). The multiplier differs between forks because
/// Altair halves it to account for the inactivity leak already punishing offline validators.
pub fn process_slashings<P: Preset>(
    phase: Phase,
    state: &mut BeaconState<P>,
    summary: &EpochSummary,
) {
    if summary.indices_to_slash.is_empty() {
        return;
    }

    let multiplier = match phase {
        Phase::Phase0 => PROPORTIONAL_SLASHING_MULTIPLIER,
        Phase::Altair => PROPORTIONAL_SLASHING_MULTIPLIER_ALTAIR,
    };

    let total_slashings: Gwei = state.slashings().iter().sum();
    let adjusted_total_slashing_balance =
        total_slashings.saturating_mul(multiplier).min(summary.total_active_stake);

    for &index in &summary.indices_to_slash {
        let effective_balance = state
            .validator(index)
            .map(|validator| validator.effective_balance)
            .unwrap_or_default();

        let penalty_numerator =
            effective_balance / EFFECTIVE_BALANCE_INCREMENT * adjusted_total_slashing_balance;
        let penalty = penalty_numerator / summary.total_active_stake * EFFECTIVE_BALANCE_INCREMENT;

        mutators::decrease_balance(state, index, penalty);
    }
}

/// Applies a signed delta to `balances[index]`, saturating at zero, shared by both forks' reward
/// accumulation (`SPEC_FULL.md` §4.4(c), §4.7).
pub(crate) fn apply_balance_delta(balances: &mut [Gwei], index: usize, delta: i128) {
    let Some(balance) = balances.get_mut(index) else {
        return;
    };

    *balance = if delta >= 0 {
        balance.saturating_add(delta as u64)
    } else {
        balance.saturating_sub(delta.unsigned_abs() as u64)
    };
}

/// Clears `eth1_data_votes` once per `EPOCHS_PER_ETH1_VOTING_PERIOD` (`SPEC_FULL.md` §4.4(f)).
pub fn process_eth1_data_reset<P: Preset>(state: &mut BeaconState<P>) {
    let next_epoch = state.current_epoch() + 1;

    if next_epoch % EPOCHS_PER_ETH1_VOTING_PERIOD == 0 {
        state.clear_eth1_data_votes();
    }
}

/// Rounds each validator's effective balance toward its current balance, but only once the drift
/// clears the hysteresis band, so a validator hovering near a threshold does not flap every epoch
/// (`SPEC_FULL.md` §4.4(g)).
pub fn process_effective_balance_updates<P: Preset>(state: &mut BeaconState<P>) {
    let balances = state.balances().iter().copied().collect::<Vec<_>>();
    let hysteresis_increment = EFFECTIVE_BALANCE_INCREMENT / HYSTERESIS_QUOTIENT;
    let downward_threshold = hysteresis_increment * HYSTERESIS_DOWNWARD_MULTIPLIER;
    let upward_threshold = hysteresis_increment * HYSTERESIS_UPWARD_MULTIPLIER;

    for (index, &balance) in balances.iter().enumerate() {
        let Some(validator) = state.validator_mut(index as ValidatorIndex) else {
            continue;
        };

        if balance + downward_threshold < validator.effective_balance
            || validator.effective_balance + upward_threshold < balance
        {
            validator.effective_balance = balance
                .saturating_sub(balance % EFFECTIVE_BALANCE_INCREMENT)
                .min(MAX_EFFECTIVE_BALANCE);
        }
    }
}

/// Zeroes the slashings ring-buffer slot the next epoch is about to reuse (`SPEC_FULL.md`
/// §4.4(h)).
pub fn process_slashings_reset<P: Preset>(state: &mut BeaconState<P>) {
    let next_epoch = state.current_epoch() + 1;
    let index = (next_epoch % P::EPOCHS_PER_SLASHINGS_VECTOR) as usize;

    state.set_slashing(index, 0);
}

/// Carries the current epoch's mix forward into the next epoch's ring-buffer slot
/// (`SPEC_FULL.md` §4.4(i)). Real per-block RANDAO reveal mixing is out of scope (per-slot block
/// processing is not modeled by this engine); this keeps the mix at that slot deterministic
/// rather than leaving it stale from `EPOCHS_PER_HISTORICAL_VECTOR` epochs ago.
pub fn process_randao_mixes_reset<P: Preset>(state: &mut BeaconState<P>) {
    let current_epoch = state.current_epoch();
    let next_epoch = current_epoch + 1;

    let mix = state.randao_mix((current_epoch % P::EPOCHS_PER_HISTORICAL_VECTOR) as usize);
    state.set_randao_mix((next_epoch % P::EPOCHS_PER_HISTORICAL_VECTOR) as usize, mix);
}

/// Appends a historical-batch root every `SLOTS_PER_HISTORICAL_ROOT` slots, the point at which
/// `block_roots`/`state_roots` are about to wrap around and overwrite their oldest entries
/// (`SPEC_FULL.md` §4.4(j)).
pub fn process_historical_roots_update<P: Preset>(state: &mut BeaconState<P>) {
    let next_epoch = state.current_epoch() + 1;
    let epochs_per_historical_root = P::SLOTS_PER_HISTORICAL_ROOT / P::SLOTS_PER_EPOCH;

    if next_epoch % epochs_per_historical_root == 0 {
        let historical_batch_root = ssz::merkleize(
            &[
                state.block_roots_hash_tree_root(),
                state.state_roots_hash_tree_root(),
            ],
            0,
        );

        state.push_historical_root(historical_batch_root);
    }
}

#[cfg(test)]
mod tests {
    use types::{
        config::Config, phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal,
        primitives::H256,
    };

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
    fn process_slot_patches_zeroed_header_state_root() {
        let mut state = genesis_state();
        assert!(state.latest_block_header_state_root_is_zeroed());

        process_slot(&mut state);

        assert!(!state.latest_block_header_state_root_is_zeroed());
    }

    #[test]
    fn justification_and_finalization_is_a_no_op_before_epoch_two() {
        let mut state = genesis_state();
        let summary = EpochSummary {
            previous_epoch: 0,
            current_epoch: 0,
            total_active_stake: EFFECTIVE_BALANCE_INCREMENT,
            base_reward_per_increment: None,
            unslashed_stake_by_flag: Default::default(),
            indices_to_slash: Vec::new(),
            indices_eligible_for_activation_queue: Vec::new(),
            indices_eligible_for_activation: Vec::new(),
            indices_to_eject: Vec::new(),
            next_epoch_active_indices: Vec::new(),
            statuses: Vec::new(),
            balances: Vec::new(),
            inclusions: Vec::new(),
        };

        let bits_before = state.justification_bits();
        process_justification_and_finalization(&mut state, &summary);
        assert_eq!(state.justification_bits(), bits_before);
    }

    #[test]
    fn eth1_data_reset_clears_votes_on_period_boundary() {
        let mut state = genesis_state();
        state.set_slot(Minimal::SLOTS_PER_EPOCH * (EPOCHS_PER_ETH1_VOTING_PERIOD - 1));

        process_eth1_data_reset(&mut state);
        assert_eq!(state.eth1_data_votes().len(), 0);
    }
}
