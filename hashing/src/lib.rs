//! SHA-256 wrappers used for Merkleization and for every seeded-randomness computation (RANDAO
//! mixing, shuffling, proposer selection).

use ethereum_types::H256;
use sha2::{Digest as _, Sha256};

/// Hashes an arbitrary byte string.
#[must_use]
pub fn hash(bytes: impl AsRef<[u8]>) -> H256 {
    H256(Sha256::digest(bytes.as_ref()).into())
}

/// Hashes the concatenation of two 32-byte chunks. This is the Merkle-tree parent-hash function
/// and is also used as the general-purpose "combine a seed with some bytes" primitive.
#[must_use]
pub fn hash_256_256(left: H256, right: H256) -> H256 {
    let mut bytes = [0; 64];
    bytes[..32].copy_from_slice(left.as_bytes());
    bytes[32..].copy_from_slice(right.as_bytes());
    hash(bytes)
}

/// Hashes a 32-byte seed together with a single trailing byte, as used by the swap-or-not
/// shuffle's round function and by `compute_proposer_index`'s rejection sampling.
#[must_use]
pub fn hash_256_4(seed: H256, suffix: [u8; 4]) -> H256 {
    let mut bytes = [0; 36];
    bytes[..32].copy_from_slice(seed.as_bytes());
    bytes[32..].copy_from_slice(&suffix);
    hash(bytes)
}

/// Hashes a 32-byte seed together with a single trailing byte.
#[must_use]
pub fn hash_256_1(seed: H256, suffix: u8) -> H256 {
    let mut bytes = [0; 33];
    bytes[..32].copy_from_slice(seed.as_bytes());
    bytes[32] = suffix;
    hash(bytes)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn hash_of_empty_matches_known_sha256() {
        let expected: [u8; 32] =
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85");

        assert_eq!(hash([]).as_bytes(), &expected);
    }

    #[test]
    fn hash_256_256_is_order_sensitive() {
        let a = H256::repeat_byte(0xaa);
        let b = H256::repeat_byte(0xbb);

        assert_ne!(hash_256_256(a, b), hash_256_256(b, a));
    }
}
