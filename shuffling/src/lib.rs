//! The swap-or-not shuffle used to turn a RANDAO-derived seed into the per-epoch committee/
//! proposer ordering the epoch cache snapshots (`SPEC_FULL.md` §4.2).

use anyhow::{ensure, Result};
use bit_field::BitField as _;
use hashing::hash;
use types::primitives::{Epoch, ValidatorIndex, H256};

/// Matches the consensus spec's `SHUFFLE_ROUND_COUNT`; not network-configurable.
const SHUFFLE_ROUND_COUNT: u8 = 90;

/// `get_seed`: combines an epoch-indexed RANDAO mix with the epoch number so that the seed used
/// for proposer/committee selection in epoch `e` only becomes knowable `MIN_SEED_LOOKAHEAD` epochs
/// in advance, exactly as described for `EpochCache::build` (`SPEC_FULL.md` §4.2). Domain
/// separation beyond the epoch (the real spec also mixes in a 4-byte domain type) is omitted: this
/// engine only ever derives one seed kind (shuffling), so there is nothing to separate from.
#[must_use]
pub fn compute_seed(randao_mix: H256, epoch: Epoch) -> H256 {
    let mut bytes = [0; 40];
    bytes[..32].copy_from_slice(randao_mix.as_bytes());
    bytes[32..].copy_from_slice(&epoch.to_le_bytes());
    hash(bytes)
}

/// Applies the swap-or-not permutation to a single index. `index_count` must be nonzero.
pub fn compute_shuffled_index(
    mut index: u64,
    index_count: u64,
    seed: H256,
) -> Result<u64> {
    ensure!(index < index_count, "index {index} out of range for {index_count} entries");

    for round in 0..SHUFFLE_ROUND_COUNT {
        let pivot = pivot_for_round(seed, round, index_count);
        let flip = (pivot + index_count - index % index_count) % index_count;
        let position = index.max(flip);

        let source = hash_round_source(seed, round, position);
        let byte = source.as_bytes()[(position % 256 / 8) as usize];
        let bit = byte.get_bit((position % 8) as usize);

        index = if bit { flip } else { index };
    }

    Ok(index)
}

/// Builds the full shuffled ordering of `0..index_count` in one pass, which is what
/// `EpochCache::build`/`rotate` actually need rather than one-off single-index lookups.
pub fn shuffle_indices(index_count: u64, seed: H256) -> Result<Vec<ValidatorIndex>> {
    (0..index_count)
        .map(|index| compute_shuffled_index(index, index_count, seed))
        .collect()
}

fn pivot_for_round(seed: H256, round: u8, index_count: u64) -> u64 {
    let mut bytes = [0; 33];
    bytes[..32].copy_from_slice(seed.as_bytes());
    bytes[32] = round;

    let digest = hash(bytes);
    let mut pivot_bytes = [0; 8];
    pivot_bytes.copy_from_slice(&digest.as_bytes()[..8]);

    u64::from_le_bytes(pivot_bytes) % index_count
}

fn hash_round_source(seed: H256, round: u8, position: u64) -> H256 {
    let mut bytes = [0; 37];
    bytes[..32].copy_from_slice(seed.as_bytes());
    bytes[32] = round;
    bytes[33..].copy_from_slice(&(position / 256).to_le_bytes());

    hash(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let seed = H256::repeat_byte(0x42);
        let shuffled = shuffle_indices(100, seed).expect("100 indices shuffle cleanly");

        let mut sorted = shuffled.clone();
        sorted.sort_unstable();

        assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_is_deterministic_for_same_seed() {
        let seed = H256::repeat_byte(0x7);

        assert_eq!(
            shuffle_indices(50, seed).unwrap(),
            shuffle_indices(50, seed).unwrap(),
        );
    }

    #[test]
    fn different_seeds_produce_different_shuffles() {
        let a = shuffle_indices(64, H256::repeat_byte(1)).unwrap();
        let b = shuffle_indices(64, H256::repeat_byte(2)).unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(compute_shuffled_index(10, 10, H256::zero()).is_err());
    }

    #[test]
    fn single_element_shuffle_is_identity() {
        assert_eq!(
            compute_shuffled_index(0, 1, H256::repeat_byte(9)).unwrap(),
            0,
        );
    }
}
