pub use ethereum_types::H256;

pub type Slot = u64;
pub type Epoch = u64;
pub type CommitteeIndex = u64;
pub type SubnetId = u64;
pub type SubcommitteeIndex = u64;
pub type ValidatorIndex = u64;
pub type Gwei = u64;
pub type DepositIndex = u64;
pub type Version = [u8; 4];
pub type DepositContractAddress = [u8; 20];

/// A validator's signing key. Block and attestation signature verification is out of scope for
/// this engine (see `SPEC_FULL.md` §1 Non-goals), so this is a plain opaque byte array rather
/// than a real BLS public key: it is compared, stored and hashed, never used to verify anything.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::AsRef, derive_more::From)]
pub struct PublicKeyBytes(#[as_ref] pub [u8; 48]);

impl core::fmt::Debug for PublicKeyBytes {
    fn fmt(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(formatter, "0x{}", hex::encode(self.0))
    }
}

impl ssz::SszHash for PublicKeyBytes {
    fn hash_tree_root(&self) -> H256 {
        hashing::hash(self.0)
    }
}

pub const GENESIS_SLOT: Slot = 0;
pub const GENESIS_EPOCH: Epoch = 0;
pub const FAR_FUTURE_EPOCH: Epoch = Epoch::MAX;
