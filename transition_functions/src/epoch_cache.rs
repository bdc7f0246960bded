use helper_functions::accessors;
use types::{
    cache::{EpochCache, EpochSeedData},
    combined::BeaconState,
    config::Config,
    consts::{MAX_EFFECTIVE_BALANCE, MIN_PER_EPOCH_CHURN_LIMIT, MIN_SEED_LOOKAHEAD},
    preset::Preset,
    primitives::{Epoch, Gwei, ValidatorIndex, H256},
};

/// The consensus spec's `MAX_RANDOM_BYTE`: a single random byte's range, used as the denominator
/// of `compute_proposer_index`'s rejection-sampling acceptance test.
const MAX_RANDOM_BYTE: u64 = u8::MAX as u64;

/// Effective-balance-weighted rejection sampling over `indices`, seeded by `seed` (`SPEC_FULL.md`
/// §4.2): repeatedly draw a shuffled candidate and accept it with probability proportional to its
/// effective balance, using a fresh hash-derived random byte each round. Returns `None` only when
/// `indices` is empty.
fn compute_proposer_index(
    effective_balances: &[Gwei],
    indices: &[ValidatorIndex],
    seed: H256,
) -> Option<ValidatorIndex> {
    if indices.is_empty() {
        return None;
    }

    let total = indices.len() as u64;
    let mut round: u64 = 0;

    loop {
        let shuffled_position = shuffling::compute_shuffled_index(round % total, total, seed).ok()?;
        let candidate_index = indices[shuffled_position as usize];

        let random_byte = hashing::hash_256_1(seed, (round % 256) as u8).as_bytes()[0] as u64;
        let effective_balance = effective_balances
            .get(candidate_index as usize)
            .copied()
            .unwrap_or(0);

        if effective_balance * MAX_RANDOM_BYTE >= MAX_EFFECTIVE_BALANCE * random_byte {
            return Some(candidate_index);
        }

        round += 1;
    }
}

fn randao_mix_index_for_epoch<P: Preset>(epoch: Epoch) -> usize {
    (epoch % P::EPOCHS_PER_HISTORICAL_VECTOR) as usize
}

/// The seed mix used to shuffle `epoch`: the RANDAO mix from `MIN_SEED_LOOKAHEAD + 1` epochs
/// before it, the same lookahead `EpochCache::rotate` uses (`SPEC_FULL.md` §4.2).
fn seed_mix_for_epoch<P: Preset>(state: &BeaconState<P>, epoch: Epoch) -> H256 {
    let lookback_epoch = epoch + P::EPOCHS_PER_HISTORICAL_VECTOR - MIN_SEED_LOOKAHEAD - 1;
    state.randao_mix(randao_mix_index_for_epoch::<P>(lookback_epoch))
}

fn build_seed_data<P: Preset>(
    state: &BeaconState<P>,
    epoch: Epoch,
    effective_balances: &[Gwei],
) -> EpochSeedData {
    let active_indices = accessors::get_active_validator_indices(state, epoch);
    let seed = shuffling::compute_seed(seed_mix_for_epoch(state, epoch), epoch);

    let shuffled_positions =
        shuffling::shuffle_indices(active_indices.len() as u64, seed).unwrap_or_default();

    let shuffled_indices = shuffled_positions
        .into_iter()
        .map(|position| active_indices[position as usize])
        .collect::<Vec<_>>();

    let proposer_indices = (0..P::SLOTS_PER_EPOCH)
        .filter_map(|slot_in_epoch| {
            let slot_seed =
                hashing::hash_256_4(seed, u32::try_from(slot_in_epoch).unwrap_or(0).to_le_bytes());
            compute_proposer_index(effective_balances, &active_indices, slot_seed)
        })
        .collect();

    EpochSeedData {
        shuffled_indices,
        proposer_indices,
    }
}

fn effective_balances_snapshot<P: Preset>(state: &BeaconState<P>) -> Vec<Gwei> {
    state
        .validators()
        .iter()
        .map(|validator| validator.effective_balance)
        .collect()
}

/// Computes shufflings for `(previous, current, next)` from scratch. Used once per state, right
/// after genesis or a fork upgrade (`SPEC_FULL.md` §4.2).
#[must_use]
pub fn build<P: Preset>(config: &Config, state: &BeaconState<P>) -> EpochCache {
    let current_epoch = accessors::get_current_epoch(state);
    let previous_epoch = accessors::get_previous_epoch(state);
    let next_epoch = current_epoch + 1;

    let effective_balances = effective_balances_snapshot(state);

    let current = build_seed_data(state, current_epoch, &effective_balances);
    let previous = if previous_epoch == current_epoch {
        current.clone()
    } else {
        build_seed_data(state, previous_epoch, &effective_balances)
    };
    let next = build_seed_data(state, next_epoch, &effective_balances);

    let active_validator_count = accessors::get_active_validator_indices(state, current_epoch).len();

    EpochCache {
        previous,
        current,
        next,
        effective_balances,
        active_validator_count,
        churn_limit: churn_limit_for(config, active_validator_count),
    }
}

/// Shifts `previous ← current`, `current ← next`, and recomputes `next` for the epoch that is
/// about to start, avoiding recomputation of the shuffle the cache already has cached twice per
/// epoch (`SPEC_FULL.md` §4.2).
pub fn rotate<P: Preset>(config: &Config, state: &BeaconState<P>, cache: &mut EpochCache) {
    let next_epoch = accessors::get_current_epoch(state) + 1;

    cache.effective_balances = effective_balances_snapshot(state);

    cache.previous = std::mem::take(&mut cache.current);
    cache.current = std::mem::take(&mut cache.next);
    cache.next = build_seed_data(state, next_epoch + 1, &cache.effective_balances);

    cache.active_validator_count =
        accessors::get_active_validator_indices(state, accessors::get_current_epoch(state)).len();
    cache.churn_limit = churn_limit_for(config, cache.active_validator_count);
}

#[must_use]
pub fn churn_limit_for(config: &Config, active_validator_count: usize) -> u64 {
    MIN_PER_EPOCH_CHURN_LIMIT.max(active_validator_count as u64 / config.churn_limit_quotient)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;
    use types::{phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal};

    use super::*;

    #[test_case(0 => MIN_PER_EPOCH_CHURN_LIMIT; "floors at the minimum with no active validators")]
    #[test_case(10 => MIN_PER_EPOCH_CHURN_LIMIT; "floors at the minimum below one quotient's worth")]
    #[test_case(10 * 65536 => 10; "scales linearly above the floor")]
    fn churn_limit_matches(active_validator_count: usize) -> u64 {
        churn_limit_for(&Config::mainnet(), active_validator_count)
    }

    #[test]
    fn compute_proposer_index_returns_none_for_no_active_validators() {
        assert_eq!(compute_proposer_index(&[], &[], H256::zero()), None);
    }

    #[test]
    fn compute_proposer_index_is_deterministic_for_the_same_seed() {
        let indices = vec![0, 1, 2, 3];
        let effective_balances = vec![32_000_000_000; 4];
        let seed = H256::repeat_byte(0x11);

        assert_eq!(
            compute_proposer_index(&effective_balances, &indices, seed),
            compute_proposer_index(&effective_balances, &indices, seed),
        );
    }

    #[test]
    fn compute_proposer_index_never_selects_a_zero_balance_validator_among_nonzero_peers() {
        let indices = vec![0, 1];
        let effective_balances = vec![0, 32_000_000_000];

        for round in 0..20u8 {
            let seed = H256::repeat_byte(round);
            let chosen = compute_proposer_index(&effective_balances, &indices, seed)
                .expect("nonzero-balance validator is always eventually accepted");
            assert_eq!(chosen, 1);
        }
    }

    #[test]
    fn build_on_empty_state_does_not_panic() {
        let config = Config::minimal_altair_from_genesis();
        let state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );
        let state = BeaconState::Phase0(state.into());

        let cache = build(&config, &state);
        assert_eq!(cache.active_validator_count, 0);
    }
}
