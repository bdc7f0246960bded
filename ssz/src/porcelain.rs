use ethereum_types::H256;
use hashing::hash_256_256;

/// Implemented by every type that appears in the Merkleized beacon state. Mirrors the `SszHash`
/// trait in the teacher crate's `ssz` but without the const-generic Merkle-tree-depth machinery:
/// this engine only needs the root, not wire-format encode/decode, so the trait is reduced to the
/// single method that actually matters here.
pub trait SszHash {
    fn hash_tree_root(&self) -> H256;
}

macro_rules! impl_ssz_hash_for_uint {
    ($($t:ty),+ $(,)?) => {
        $(
            impl SszHash for $t {
                fn hash_tree_root(&self) -> H256 {
                    let mut chunk = [0; 32];
                    chunk[..core::mem::size_of::<$t>()].copy_from_slice(&self.to_le_bytes());
                    H256(chunk)
                }
            }
        )+
    };
}

impl_ssz_hash_for_uint!(u8, u16, u32, u64);

impl SszHash for bool {
    fn hash_tree_root(&self) -> H256 {
        u8::from(*self).hash_tree_root()
    }
}

impl SszHash for H256 {
    fn hash_tree_root(&self) -> H256 {
        *self
    }
}

/// Binary Merkle root over `leaves`, virtually zero-padded to the next power of two (or to
/// `minimum_depth` if that implies a bigger tree). This is the shared fold used by
/// [`crate::PersistentList::hash_tree_root`] and by the historical-roots accumulator in
/// `process_historical_roots_update`.
#[must_use]
pub fn merkleize(leaves: &[H256], minimum_depth: u32) -> H256 {
    let depth = tree_depth(leaves.len()).max(minimum_depth);
    merkleize_at_depth(leaves, depth)
}

fn merkleize_at_depth(leaves: &[H256], depth: u32) -> H256 {
    if depth == 0 {
        return leaves.first().copied().unwrap_or_else(H256::zero);
    }

    let width = 1_usize << (depth - 1);
    let (left, right) = leaves.split_at(leaves.len().min(width));

    hash_256_256(
        merkleize_at_depth(left, depth - 1),
        merkleize_at_depth(right, depth - 1),
    )
}

fn tree_depth(length: usize) -> u32 {
    if length <= 1 {
        return 0;
    }

    (length - 1).ilog2() + 1
}

/// `mix_in_length` from the SSZ spec: binds the merkle root of a variable-length sequence to its
/// actual length, so that truncating or extending the backing list changes the root even when the
/// extra/missing leaves happen to be zero.
#[must_use]
pub fn mix_in_length(root: H256, length: usize) -> H256 {
    let mut length_chunk = [0; 32];
    length_chunk[..8].copy_from_slice(&(length as u64).to_le_bytes());

    hash_256_256(root, H256(length_chunk))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0 => 0)]
    #[test_case(1 => 0)]
    #[test_case(2 => 1)]
    #[test_case(3 => 2)]
    #[test_case(4 => 2)]
    #[test_case(5 => 3)]
    #[test_case(8 => 3)]
    fn tree_depth_rounds_up_to_power_of_two(length: usize) -> u32 {
        tree_depth(length)
    }

    #[test]
    fn merkleize_of_single_leaf_is_the_leaf() {
        let leaf = H256::repeat_byte(7);
        assert_eq!(merkleize(&[leaf], 0), leaf);
    }

    #[test]
    fn merkleize_is_deterministic_and_order_sensitive() {
        let a = H256::repeat_byte(1);
        let b = H256::repeat_byte(2);

        assert_eq!(merkleize(&[a, b], 1), merkleize(&[a, b], 1));
        assert_ne!(merkleize(&[a, b], 1), merkleize(&[b, a], 1));
    }

    #[test]
    fn mix_in_length_changes_with_length() {
        let root = H256::repeat_byte(1);
        assert_ne!(mix_in_length(root, 1), mix_in_length(root, 2));
    }
}
