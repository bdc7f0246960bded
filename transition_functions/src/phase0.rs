use arithmetic::U64Ext as _;
use types::{
    combined::BeaconState,
    consts::{
        BASE_REWARDS_PER_EPOCH, EFFECTIVE_BALANCE_INCREMENT, INACTIVITY_PENALTY_QUOTIENT,
        MIN_EPOCHS_TO_INACTIVITY_PENALTY, PROPOSER_REWARD_QUOTIENT,
    },
    phase0::containers::PendingAttestation,
    preset::Preset,
    primitives::Gwei,
};

use crate::{
    epoch_summary::{EpochSummary, ELIGIBLE_ATTESTER, PREV_HEAD, PREV_SOURCE, PREV_TARGET, UNSLASHED},
    unphased::apply_balance_delta,
};

/// `effective_balance * BASE_REWARD_FACTOR / isqrt(total_active_stake) / BASE_REWARDS_PER_EPOCH`,
/// the phase 0 base reward everything else in this module is a multiple of (`SPEC_FULL.md`
/// §4.4(c)).
fn base_reward(effective_balance: Gwei, total_active_stake: Gwei) -> Gwei {
    effective_balance * types::consts::BASE_REWARD_FACTOR / arithmetic::isqrt(total_active_stake)
        / BASE_REWARDS_PER_EPOCH
}

/// Whether the finality delay (epochs since the last finalized checkpoint) exceeds
/// `MIN_EPOCHS_TO_INACTIVITY_PENALTY`, the phase 0 condition for paying inactivity penalties
/// instead of ordinary non-participation penalties.
fn is_in_inactivity_leak(finality_delay: u64) -> bool {
    finality_delay > MIN_EPOCHS_TO_INACTIVITY_PENALTY
}

/// Rewards and penalizes every eligible attester for source/target/head participation, the
/// inclusion-delay proposer/attester split, and (during an inactivity leak) a leak penalty,
/// writing straight into the flat balances buffer the caller owns (`SPEC_FULL.md` §4.4(c)).
pub fn process_rewards_and_penalties<P: Preset>(
    state: &BeaconState<P>,
    summary: &EpochSummary,
    finality_delay: u64,
    balances: &mut [Gwei],
) {
    if summary.current_epoch == types::primitives::GENESIS_EPOCH {
        return;
    }

    let total_active_stake = summary.total_active_stake;
    let by_flag = summary.unslashed_stake_by_flag;
    let leaking = is_in_inactivity_leak(finality_delay);

    for (index, status) in summary.statuses.iter().enumerate() {
        if !status.has(ELIGIBLE_ATTESTER) {
            continue;
        }

        let effective_balance = state
            .validator(index as types::primitives::ValidatorIndex)
            .map(|validator| validator.effective_balance)
            .unwrap_or_default();

        let reward = base_reward(effective_balance, total_active_stake);

        for (flag, unslashed_stake) in [
            (PREV_SOURCE, by_flag.prev_source),
            (PREV_TARGET, by_flag.prev_target),
            (PREV_HEAD, by_flag.prev_head),
        ] {
            let matched = status.has(flag) && status.has(UNSLASHED);

            let delta = if matched {
                if leaking {
                    reward as i128
                } else {
                    reward.mul_div_floor(unslashed_stake, total_active_stake) as i128
                }
            } else {
                -(reward as i128)
            };

            apply_balance_delta(balances, index, delta);
        }

        if leaking && !(status.has(PREV_TARGET) && status.has(UNSLASHED)) {
            let penalty = effective_balance * finality_delay / INACTIVITY_PENALTY_QUOTIENT;
            apply_balance_delta(balances, index, -(penalty as i128));
        }

        // The inclusion-delay component: paid whenever the attester's minimum-delay attestation
        // matched source and is unslashed, independent of the inactivity leak (`SPEC_FULL.md`
        // §4.4(c), the worked scenario at §4.4 "every balance increased by one full base reward").
        let matched_source = status.has(PREV_SOURCE) && status.has(UNSLASHED);

        if matched_source {
            if let Some(inclusion) = summary.inclusions.get(index).copied().flatten() {
                if inclusion.delay > 0 {
                    let proposer_reward = reward / PROPOSER_REWARD_QUOTIENT;
                    let max_attester_reward = reward - proposer_reward;
                    let attester_reward = max_attester_reward / inclusion.delay;

                    apply_balance_delta(balances, inclusion.proposer_index as usize, proposer_reward as i128);
                    apply_balance_delta(balances, index, attester_reward as i128);
                }
            }
        }
    }
}

/// `previous_epoch_attestations ← current_epoch_attestations; current_epoch_attestations ← []`
/// (`SPEC_FULL.md` §4.4(k)).
pub fn process_participation_record_updates<P: Preset>(
    state: &mut BeaconState<P>,
) -> anyhow::Result<()> {
    let BeaconState::Phase0(inner) = state else {
        anyhow::bail!("process_participation_record_updates called on a non-phase0 state");
    };

    inner.previous_epoch_attestations = core::mem::take(&mut inner.current_epoch_attestations);

    Ok(())
}

/// Splits `state.{previous,current}_epoch_attestations` by which epoch they were recorded in,
/// the shape `epoch_summary::attribute_participation` and this module both need.
#[must_use]
pub fn attestations_by_epoch<P: Preset>(
    state: &BeaconState<P>,
) -> (Vec<PendingAttestation>, Vec<PendingAttestation>) {
    let BeaconState::Phase0(inner) = state else {
        return (Vec::new(), Vec::new());
    };

    (
        inner.previous_epoch_attestations.iter().cloned().collect(),
        inner.current_epoch_attestations.iter().cloned().collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_reward_scales_with_effective_balance() {
        let small = base_reward(EFFECTIVE_BALANCE_INCREMENT, 1_000 * EFFECTIVE_BALANCE_INCREMENT);
        let large =
            base_reward(32 * EFFECTIVE_BALANCE_INCREMENT, 1_000 * EFFECTIVE_BALANCE_INCREMENT);

        assert!(large > small);
    }

    #[test]
    fn inactivity_leak_is_detected_past_the_threshold() {
        assert!(!is_in_inactivity_leak(MIN_EPOCHS_TO_INACTIVITY_PENALTY));
        assert!(is_in_inactivity_leak(MIN_EPOCHS_TO_INACTIVITY_PENALTY + 1));
    }

    #[test]
    fn apply_balance_delta_rewards_and_penalizes() {
        let mut balances = vec![1_000u64];
        apply_balance_delta(&mut balances, 0, 500);
        assert_eq!(balances[0], 1_500);

        apply_balance_delta(&mut balances, 0, -2_000);
        assert_eq!(balances[0], 0);
    }

    #[test]
    fn inclusion_delay_component_pays_proposer_and_attester() {
        use types::{
            config::Config, consts::MAX_EFFECTIVE_BALANCE,
            phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal,
            primitives::H256,
        };

        use crate::epoch_summary::{AttesterStatus, Inclusion, UnslashedStakeByFlag};

        let config = Config::minimal_altair_from_genesis();
        let mut state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        for _ in 0..2 {
            state.validators.push(types::phase0::containers::Validator {
                effective_balance: MAX_EFFECTIVE_BALANCE,
                activation_epoch: 0,
                exit_epoch: types::primitives::FAR_FUTURE_EPOCH,
                withdrawable_epoch: types::primitives::FAR_FUTURE_EPOCH,
                ..Default::default()
            });
            state.balances.push(MAX_EFFECTIVE_BALANCE);
        }

        let state = BeaconState::Phase0(state.into());

        let total_active_stake = 2 * MAX_EFFECTIVE_BALANCE;
        let reward = base_reward(MAX_EFFECTIVE_BALANCE, total_active_stake);

        let mut attester_status = AttesterStatus::default();
        attester_status.flags = ELIGIBLE_ATTESTER | UNSLASHED | PREV_SOURCE | PREV_TARGET | PREV_HEAD;

        let mut proposer_status = AttesterStatus::default();
        proposer_status.flags = ELIGIBLE_ATTESTER | UNSLASHED;

        let summary = EpochSummary {
            previous_epoch: 0,
            current_epoch: 1,
            total_active_stake,
            base_reward_per_increment: None,
            unslashed_stake_by_flag: UnslashedStakeByFlag {
                prev_source: total_active_stake,
                prev_target: total_active_stake,
                prev_head: total_active_stake,
                curr_target: 0,
            },
            indices_to_slash: Vec::new(),
            indices_eligible_for_activation_queue: Vec::new(),
            indices_eligible_for_activation: Vec::new(),
            indices_to_eject: Vec::new(),
            next_epoch_active_indices: Vec::new(),
            statuses: vec![attester_status, proposer_status],
            balances: vec![MAX_EFFECTIVE_BALANCE, MAX_EFFECTIVE_BALANCE],
            inclusions: vec![Some(Inclusion { proposer_index: 1, delay: 1 }), None],
        };

        let mut balances = summary.balances.clone();
        process_rewards_and_penalties(&state, &summary, 0, &mut balances);

        let proposer_reward = reward / PROPOSER_REWARD_QUOTIENT;
        let attester_share = reward - proposer_reward;

        assert_eq!(balances[0], MAX_EFFECTIVE_BALANCE + 3 * reward + attester_share);
        assert_eq!(balances[1], MAX_EFFECTIVE_BALANCE + proposer_reward);
    }
}
