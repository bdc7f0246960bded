use arithmetic::U64Ext as _;
use ssz::PersistentList;
use types::{
    combined::BeaconState,
    config::Config,
    consts::{
        EFFECTIVE_BALANCE_INCREMENT, EPOCHS_PER_SYNC_COMMITTEE_PERIOD,
        INACTIVITY_PENALTY_QUOTIENT_ALTAIR, MIN_EPOCHS_TO_INACTIVITY_PENALTY,
        TIMELY_HEAD_WEIGHT, TIMELY_SOURCE_WEIGHT, TIMELY_TARGET_WEIGHT, WEIGHT_DENOMINATOR,
    },
    preset::Preset,
    primitives::{Gwei, ValidatorIndex, GENESIS_EPOCH},
};

use crate::{
    epoch_summary::{EpochSummary, ELIGIBLE_ATTESTER, PREV_HEAD, PREV_SOURCE, PREV_TARGET, UNSLASHED},
    unphased::apply_balance_delta,
};

fn is_in_inactivity_leak(finality_delay: u64) -> bool {
    finality_delay > MIN_EPOCHS_TO_INACTIVITY_PENALTY
}

/// Decays or grows every eligible validator's `inactivity_score`, the Altair replacement for
/// phase 0's flat leak penalty (`SPEC_FULL.md` §4.4(b)). The spec text describing when the
/// recovery term applies is stated in terms of the finality delay rather than the per-epoch
/// target-participation test, matching `is_in_inactivity_leak` in the upstream consensus spec;
/// see `DESIGN.md` for this reading of an ambiguous paragraph.
pub fn process_inactivity_updates<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    summary: &EpochSummary,
    finality_delay: u64,
) -> anyhow::Result<()> {
    if summary.current_epoch == GENESIS_EPOCH {
        return Ok(());
    }

    let BeaconState::Altair(inner) = state else {
        anyhow::bail!("process_inactivity_updates called on a non-altair state");
    };

    let leaking = is_in_inactivity_leak(finality_delay);
    let mut scores = inner.inactivity_scores.iter().copied().collect::<Vec<_>>();

    for (index, status) in summary.statuses.iter().enumerate() {
        if !status.has(ELIGIBLE_ATTESTER) {
            continue;
        }

        let Some(score) = scores.get_mut(index) else {
            continue;
        };

        if status.has(PREV_TARGET) && status.has(UNSLASHED) {
            *score -= (*score).min(1);
        } else {
            *score += config.inactivity_score_bias;
        }

        if !leaking {
            *score -= (*score).min(config.inactivity_score_recovery_rate);
        }
    }

    inner.inactivity_scores = PersistentList::from_iter(scores);

    Ok(())
}

/// The Altair weighted-flag reward/penalty formula plus the inactivity-score-driven penalty,
/// written straight into the caller's flat balances buffer (`SPEC_FULL.md` §4.4(c)).
pub fn process_rewards_and_penalties<P: Preset>(
    config: &Config,
    state: &BeaconState<P>,
    summary: &EpochSummary,
    balances: &mut [Gwei],
) -> anyhow::Result<()> {
    if summary.current_epoch == GENESIS_EPOCH {
        return Ok(());
    }

    let BeaconState::Altair(inner) = state else {
        anyhow::bail!("process_rewards_and_penalties called on a non-altair state");
    };

    let Some(base_reward_per_increment) = summary.base_reward_per_increment else {
        anyhow::bail!("missing base_reward_per_increment for an altair epoch summary");
    };

    let by_flag = summary.unslashed_stake_by_flag;
    let total_active_increments = summary.total_active_stake / EFFECTIVE_BALANCE_INCREMENT;

    for (index, status) in summary.statuses.iter().enumerate() {
        if !status.has(ELIGIBLE_ATTESTER) {
            continue;
        }

        let effective_balance = state
            .validator(index as ValidatorIndex)
            .map(|validator| validator.effective_balance)
            .unwrap_or_default();

        let base_reward = base_reward_per_increment * (effective_balance / EFFECTIVE_BALANCE_INCREMENT);

        for (flag, weight, unslashed_stake, is_head) in [
            (PREV_SOURCE, TIMELY_SOURCE_WEIGHT, by_flag.prev_source, false),
            (PREV_TARGET, TIMELY_TARGET_WEIGHT, by_flag.prev_target, false),
            (PREV_HEAD, TIMELY_HEAD_WEIGHT, by_flag.prev_head, true),
        ] {
            let participating = status.has(flag) && status.has(UNSLASHED);

            if participating {
                let increments = unslashed_stake / EFFECTIVE_BALANCE_INCREMENT;
                let reward = (base_reward as u128 * weight as u128 * increments as u128
                    / (total_active_increments.max(1) as u128 * WEIGHT_DENOMINATOR as u128))
                    as u64;
                apply_balance_delta(balances, index, reward as i128);
            } else if !is_head {
                let penalty = base_reward * weight / WEIGHT_DENOMINATOR;
                apply_balance_delta(balances, index, -(penalty as i128));
            }
        }

        let inactivity_score = inner.inactivity_scores.get(index).copied().unwrap_or_default();
        let penalty_denominator =
            config.inactivity_score_bias * INACTIVITY_PENALTY_QUOTIENT_ALTAIR;
        let penalty = effective_balance.mul_div_floor(inactivity_score, penalty_denominator);

        apply_balance_delta(balances, index, -(penalty as i128));
    }

    Ok(())
}

/// `previous_epoch_participation ← current_epoch_participation; current_epoch_participation ←
/// zeros` (`SPEC_FULL.md` §4.4(k)).
pub fn process_participation_record_updates<P: Preset>(
    state: &mut BeaconState<P>,
) -> anyhow::Result<()> {
    let BeaconState::Altair(inner) = state else {
        anyhow::bail!("process_participation_record_updates called on a non-altair state");
    };

    let validator_count = inner.validators.len();

    inner.previous_epoch_participation = core::mem::replace(
        &mut inner.current_epoch_participation,
        PersistentList::from_iter(core::iter::repeat(0u8).take(validator_count)),
    );

    Ok(())
}

/// Clones `state.{previous,current}_epoch_participation` out as plain byte slices, the shape
/// `epoch_summary::attribute_participation` needs.
#[must_use]
pub fn participation_by_epoch<P: Preset>(state: &BeaconState<P>) -> (Vec<u8>, Vec<u8>) {
    let BeaconState::Altair(inner) = state else {
        return (Vec::new(), Vec::new());
    };

    (
        inner.previous_epoch_participation.iter().copied().collect(),
        inner.current_epoch_participation.iter().copied().collect(),
    )
}

/// Rotates the sync committees once per `EPOCHS_PER_SYNC_COMMITTEE_PERIOD` (`SPEC_FULL.md`
/// §4.4(l)).
pub fn process_sync_committee_updates<P: Preset>(
    state: &mut BeaconState<P>,
) -> anyhow::Result<()> {
    let next_epoch = state.current_epoch() + 1;

    if next_epoch % EPOCHS_PER_SYNC_COMMITTEE_PERIOD != 0 {
        return Ok(());
    }

    let next_sync_committee = helper_functions::accessors::get_next_sync_committee(state)?;

    let BeaconState::Altair(inner) = state else {
        anyhow::bail!("process_sync_committee_updates called on a non-altair state");
    };

    inner.current_sync_committee = std::mem::replace(&mut inner.next_sync_committee, next_sync_committee);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactivity_leak_threshold_matches_phase0() {
        assert!(!is_in_inactivity_leak(MIN_EPOCHS_TO_INACTIVITY_PENALTY));
        assert!(is_in_inactivity_leak(MIN_EPOCHS_TO_INACTIVITY_PENALTY + 1));
    }
}
