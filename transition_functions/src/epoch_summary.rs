use helper_functions::{accessors, predicates};
use types::{
    combined::BeaconState,
    config::Config,
    consts::{BASE_REWARD_FACTOR, EFFECTIVE_BALANCE_INCREMENT},
    nonstandard::Phase,
    phase0::containers::PendingAttestation,
    preset::Preset,
    primitives::{Epoch, Gwei, Slot, ValidatorIndex},
};

pub const UNSLASHED: u8 = 1 << 0;
pub const ELIGIBLE_ATTESTER: u8 = 1 << 1;
pub const PREV_SOURCE: u8 = 1 << 2;
pub const PREV_TARGET: u8 = 1 << 3;
pub const PREV_HEAD: u8 = 1 << 4;
pub const CURR_SOURCE: u8 = 1 << 5;
pub const CURR_TARGET: u8 = 1 << 6;
pub const CURR_HEAD: u8 = 1 << 7;

/// Per-validator derived data for one epoch transition, disposed of at the end of
/// `combined::process_epoch` (`SPEC_FULL.md` §3, "Attester Status").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttesterStatus {
    pub flags: u8,
    pub active: bool,
}

impl AttesterStatus {
    #[must_use]
    pub fn has(self, flag: u8) -> bool {
        self.flags & flag == flag
    }
}

/// The minimum-inclusion-delay attestation crediting a previous-epoch attester, the pairing the
/// fourth phase 0 reward component (proposer share plus delay-scaled attester share) is keyed on
/// (`SPEC_FULL.md` §4.4(c)).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inclusion {
    pub proposer_index: ValidatorIndex,
    pub delay: Slot,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnslashedStakeByFlag {
    pub prev_source: Gwei,
    pub prev_target: Gwei,
    pub prev_head: Gwei,
    pub curr_target: Gwei,
}

/// The disposable per-epoch scan result consumed by every sub-phase processor (`SPEC_FULL.md`
/// §4.3). Built once per transition by a single pass over `state.validators`, replacing what the
/// consensus spec expresses as many independent re-scanning helper functions.
#[derive(Clone, Debug)]
pub struct EpochSummary {
    pub previous_epoch: Epoch,
    pub current_epoch: Epoch,
    pub total_active_stake: Gwei,
    pub base_reward_per_increment: Option<Gwei>,
    pub unslashed_stake_by_flag: UnslashedStakeByFlag,
    pub indices_to_slash: Vec<ValidatorIndex>,
    pub indices_eligible_for_activation_queue: Vec<ValidatorIndex>,
    pub indices_eligible_for_activation: Vec<ValidatorIndex>,
    pub indices_to_eject: Vec<ValidatorIndex>,
    pub next_epoch_active_indices: Vec<ValidatorIndex>,
    pub statuses: Vec<AttesterStatus>,
    pub balances: Vec<Gwei>,
    pub inclusions: Vec<Option<Inclusion>>,
}

fn matches_target<P: Preset>(
    state: &BeaconState<P>,
    attestation: &PendingAttestation,
    target_epoch: Epoch,
) -> bool {
    accessors::get_block_root(state, target_epoch)
        .map(|root| root == attestation.data.target.root)
        .unwrap_or(false)
}

fn matches_head<P: Preset>(state: &BeaconState<P>, attestation: &PendingAttestation) -> bool {
    accessors::get_block_root_at_slot(state, attestation.data.slot)
        .map(|root| root == attestation.data.beacon_block_root)
        .unwrap_or(false)
}

/// Phase 0 attaches PREV_*/CURR_* flags by replaying `previous_epoch_attestations`/
/// `current_epoch_attestations`. Matching target and head are checked against the state's own
/// block-root history; matching source is not independently re-verified here because
/// block-level attestation validity (the check that would normally reject a wrongly-sourced
/// attestation before it ever reaches `previous_epoch_attestations`) is out of scope for this
/// engine (`SPEC_FULL.md` §1 Non-goals) — an attestation present in the list is trusted to have
/// already matched its source.
fn attribute_phase0_participation<P: Preset>(
    state: &BeaconState<P>,
    previous_epoch: Epoch,
    current_epoch: Epoch,
    previous_epoch_attestations: &[PendingAttestation],
    current_epoch_attestations: &[PendingAttestation],
    statuses: &mut [AttesterStatus],
    inclusions: &mut [Option<Inclusion>],
) {
    for attestation in previous_epoch_attestations {
        let target = matches_target(state, attestation, previous_epoch);
        let head = target && matches_head(state, attestation);

        for &index in &attestation.attesting_indices {
            if let Some(status) = statuses.get_mut(index as usize) {
                status.flags |= PREV_SOURCE;

                if target {
                    status.flags |= PREV_TARGET;
                }

                if head {
                    status.flags |= PREV_HEAD;
                }
            }

            if let Some(slot) = inclusions.get_mut(index as usize) {
                let candidate = Inclusion {
                    proposer_index: attestation.proposer_index,
                    delay: attestation.inclusion_delay,
                };

                *slot = Some(match *slot {
                    Some(current) if current.delay <= candidate.delay => current,
                    _ => candidate,
                });
            }
        }
    }

    for attestation in current_epoch_attestations {
        let target = matches_target(state, attestation, current_epoch);

        for &index in &attestation.attesting_indices {
            if let Some(status) = statuses.get_mut(index as usize) {
                status.flags |= CURR_SOURCE;

                if target {
                    status.flags |= CURR_TARGET;
                }
            }
        }
    }
}

fn attribute_altair_participation<P: Preset>(
    previous_epoch_participation: &[u8],
    current_epoch_participation: &[u8],
    statuses: &mut [AttesterStatus],
) {
    for (index, status) in statuses.iter_mut().enumerate() {
        if let Some(&byte) = previous_epoch_participation.get(index) {
            if byte & (1 << types::consts::TIMELY_SOURCE_FLAG_INDEX) != 0 {
                status.flags |= PREV_SOURCE;
            }
            if byte & (1 << types::consts::TIMELY_TARGET_FLAG_INDEX) != 0 {
                status.flags |= PREV_TARGET;
            }
            if byte & (1 << types::consts::TIMELY_HEAD_FLAG_INDEX) != 0 {
                status.flags |= PREV_HEAD;
            }
        }

        if let Some(&byte) = current_epoch_participation.get(index) {
            if byte & (1 << types::consts::TIMELY_SOURCE_FLAG_INDEX) != 0 {
                status.flags |= CURR_SOURCE;
            }
            if byte & (1 << types::consts::TIMELY_TARGET_FLAG_INDEX) != 0 {
                status.flags |= CURR_TARGET;
            }
            if byte & (1 << types::consts::TIMELY_HEAD_FLAG_INDEX) != 0 {
                status.flags |= CURR_HEAD;
            }
        }
    }
}

/// Implements `SPEC_FULL.md` §4.3 exactly: one pass over `state.validators` producing every
/// per-validator derived value the sub-phase processors need, followed by participation
/// attribution and the unslashed-stake folds.
///
/// Open Question (i) from `SPEC_FULL.md` §9: the buckets filled by steps 3-6 are mutually
/// exclusive at scan time, evaluated as a single if/else-if ladder. A validator already counted
/// active in step 3 is therefore never simultaneously added to `indices_to_eject` in the same
/// scan, even though it meets the balance/exit_epoch test — that bucket only catches validators
/// the earlier branches skipped. This is the literal ladder semantics the specification asks to
/// preserve; see DESIGN.md for the resolution record.
pub fn build_epoch_summary<P: Preset>(
    phase: Phase,
    config: &Config,
    state: &BeaconState<P>,
) -> EpochSummary {
    let current_epoch = accessors::get_current_epoch(state);
    let previous_epoch = accessors::get_previous_epoch(state);
    let finalized_epoch = state.finalized_checkpoint().epoch;

    let validator_count = state.validator_count();
    let mut statuses = vec![AttesterStatus::default(); validator_count];
    let mut inclusions = vec![None; validator_count];
    let mut indices_to_slash = Vec::new();
    let mut indices_eligible_for_activation_queue = Vec::new();
    let mut indices_eligible_for_activation = Vec::new();
    let mut indices_to_eject = Vec::new();
    let mut next_epoch_active_indices = Vec::new();
    let mut total_active_stake: Gwei = 0;
    let mut balances = Vec::with_capacity(validator_count);

    for (index, validator) in state.validators().iter().enumerate() {
        let index = index as ValidatorIndex;
        balances.push(*state.balances().get(index as usize).expect("validators and balances are parallel"));

        let mut status = AttesterStatus::default();

        // (1)
        let slashed_this_period = validator.slashed
            && validator.withdrawable_epoch == current_epoch + P::EPOCHS_PER_SLASHINGS_VECTOR / 2;

        if slashed_this_period {
            indices_to_slash.push(index);
        } else {
            status.flags |= UNSLASHED;
        }

        // (2)
        let eligible_attester = validator.is_active(previous_epoch)
            || (validator.slashed && previous_epoch + 1 < validator.withdrawable_epoch);

        if eligible_attester {
            status.flags |= ELIGIBLE_ATTESTER;
        }

        // (3)-(6): mutually exclusive by construction, evaluated as an if/else ladder.
        if validator.is_active(current_epoch) {
            status.active = true;
            total_active_stake += validator.effective_balance;
        } else if predicates::is_eligible_for_activation_queue(validator) {
            indices_eligible_for_activation_queue.push(index);
        } else if predicates::is_eligible_for_activation(validator, finalized_epoch) {
            indices_eligible_for_activation.push(index);
        } else if validator.exit_epoch == types::primitives::FAR_FUTURE_EPOCH
            && validator.effective_balance <= config.ejection_balance
        {
            indices_to_eject.push(index);
        }

        statuses[index as usize] = status;

        if validator.is_active(current_epoch + 1) {
            next_epoch_active_indices.push(index);
        }
    }

    let total_active_stake = total_active_stake.max(EFFECTIVE_BALANCE_INCREMENT);

    let base_reward_per_increment = match phase {
        Phase::Altair => Some(
            EFFECTIVE_BALANCE_INCREMENT * BASE_REWARD_FACTOR / arithmetic::isqrt(total_active_stake),
        ),
        Phase::Phase0 => None,
    };

    indices_eligible_for_activation.sort_by_key(|&index| {
        let validator = state.validator(index).expect("index came from this state");
        (validator.activation_eligibility_epoch, index)
    });

    EpochSummary {
        previous_epoch,
        current_epoch,
        total_active_stake,
        base_reward_per_increment,
        unslashed_stake_by_flag: UnslashedStakeByFlag::default(),
        indices_to_slash,
        indices_eligible_for_activation_queue,
        indices_eligible_for_activation,
        indices_to_eject,
        next_epoch_active_indices,
        statuses,
        balances,
        inclusions,
    }
}

/// Folds attester statuses into the four unslashed-stake buckets the justification and rewards
/// sub-phases need, applying the `UNSLASHED & FLAG` mask from `SPEC_FULL.md` §4.3.
pub fn fold_unslashed_stake<P: Preset>(
    state: &BeaconState<P>,
    summary: &mut EpochSummary,
) {
    let mut by_flag = UnslashedStakeByFlag::default();

    for (index, status) in summary.statuses.iter().enumerate() {
        if status.flags & UNSLASHED == 0 {
            continue;
        }

        let effective_balance = state
            .validator(index as ValidatorIndex)
            .map(|validator| validator.effective_balance)
            .unwrap_or_default();

        if status.has(PREV_SOURCE) {
            by_flag.prev_source += effective_balance;
        }
        if status.has(PREV_TARGET) {
            by_flag.prev_target += effective_balance;
        }
        if status.has(PREV_HEAD) {
            by_flag.prev_head += effective_balance;
        }
        if status.has(CURR_TARGET) {
            by_flag.curr_target += effective_balance;
        }
    }

    by_flag.prev_source = by_flag.prev_source.max(EFFECTIVE_BALANCE_INCREMENT);
    by_flag.prev_target = by_flag.prev_target.max(EFFECTIVE_BALANCE_INCREMENT);
    by_flag.prev_head = by_flag.prev_head.max(EFFECTIVE_BALANCE_INCREMENT);
    by_flag.curr_target = by_flag.curr_target.max(EFFECTIVE_BALANCE_INCREMENT);

    summary.unslashed_stake_by_flag = by_flag;
}

pub fn attribute_participation<P: Preset>(
    phase: Phase,
    state: &BeaconState<P>,
    previous_epoch_attestations: &[PendingAttestation],
    current_epoch_attestations: &[PendingAttestation],
    previous_epoch_participation: &[u8],
    current_epoch_participation: &[u8],
    summary: &mut EpochSummary,
) {
    match phase {
        Phase::Phase0 => attribute_phase0_participation(
            state,
            summary.previous_epoch,
            summary.current_epoch,
            previous_epoch_attestations,
            current_epoch_attestations,
            &mut summary.statuses,
            &mut summary.inclusions,
        ),
        Phase::Altair => attribute_altair_participation::<P>(
            previous_epoch_participation,
            current_epoch_participation,
            &mut summary.statuses,
        ),
    }

    fold_unslashed_stake(state, summary);
}

#[cfg(test)]
mod tests {
    use types::{
        config::Config, consts::MAX_EFFECTIVE_BALANCE,
        phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal, primitives::H256,
    };

    use super::*;

    fn state_with_validators(n: usize) -> BeaconState<Minimal> {
        let config = Config::minimal_altair_from_genesis();
        let mut state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        for _ in 0..n {
            state.validators.push(types::phase0::containers::Validator {
                effective_balance: MAX_EFFECTIVE_BALANCE,
                activation_epoch: 0,
                exit_epoch: types::primitives::FAR_FUTURE_EPOCH,
                withdrawable_epoch: types::primitives::FAR_FUTURE_EPOCH,
                ..Default::default()
            });
            state.balances.push(MAX_EFFECTIVE_BALANCE);
        }

        BeaconState::Phase0(state.into())
    }

    #[test]
    fn total_active_stake_sums_active_validators() {
        let config = Config::minimal_altair_from_genesis();
        let state = state_with_validators(4);
        let summary = build_epoch_summary(Phase::Phase0, &config, &state);

        assert_eq!(summary.total_active_stake, 4 * MAX_EFFECTIVE_BALANCE);
    }

    #[test]
    fn zero_validators_floors_total_active_stake_at_one_increment() {
        let config = Config::minimal_altair_from_genesis();
        let state = state_with_validators(0);
        let summary = build_epoch_summary(Phase::Phase0, &config, &state);

        assert_eq!(summary.total_active_stake, EFFECTIVE_BALANCE_INCREMENT);
    }

    #[test]
    fn balances_mirror_validator_order() {
        let config = Config::minimal_altair_from_genesis();
        let state = state_with_validators(3);
        let summary = build_epoch_summary(Phase::Phase0, &config, &state);

        assert_eq!(summary.balances, vec![MAX_EFFECTIVE_BALANCE; 3]);
    }
}
