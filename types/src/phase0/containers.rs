use ssz::{merkleize, SszHash};

use crate::primitives::{
    CommitteeIndex, Epoch, Gwei, PublicKeyBytes, Slot, ValidatorIndex, Version, H256,
};

fn container_root(field_roots: &[H256]) -> H256 {
    merkleize(field_roots, 0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Fork {
    pub previous_version: Version,
    pub current_version: Version,
    pub epoch: Epoch,
}

impl SszHash for Fork {
    fn hash_tree_root(&self) -> H256 {
        container_root(&[
            H256::from_slice(&[self.previous_version.as_slice(), &[0; 28]].concat()),
            H256::from_slice(&[self.current_version.as_slice(), &[0; 28]].concat()),
            self.epoch.hash_tree_root(),
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: H256,
}

impl SszHash for Checkpoint {
    fn hash_tree_root(&self) -> H256 {
        container_root(&[self.epoch.hash_tree_root(), self.root.hash_tree_root()])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Eth1Data {
    pub deposit_root: H256,
    pub deposit_count: u64,
    pub block_hash: H256,
}

impl SszHash for Eth1Data {
    fn hash_tree_root(&self) -> H256 {
        container_root(&[
            self.deposit_root.hash_tree_root(),
            self.deposit_count.hash_tree_root(),
            self.block_hash.hash_tree_root(),
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: H256,
    pub state_root: H256,
    pub body_root: H256,
}

impl SszHash for BeaconBlockHeader {
    fn hash_tree_root(&self) -> H256 {
        container_root(&[
            self.slot.hash_tree_root(),
            self.proposer_index.hash_tree_root(),
            self.parent_root.hash_tree_root(),
            self.state_root.hash_tree_root(),
            self.body_root.hash_tree_root(),
        ])
    }
}

/// A registered validator. Entries are never removed from `BeaconState::validators`, only
/// mutated in place (`SPEC_FULL.md` §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: H256,
    pub effective_balance: Gwei,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    #[must_use]
    pub fn is_active(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }

    #[must_use]
    pub fn is_eligible_for_activation_queue(&self) -> bool {
        self.activation_eligibility_epoch == crate::primitives::FAR_FUTURE_EPOCH
            && self.effective_balance == crate::consts::MAX_EFFECTIVE_BALANCE
    }

    #[must_use]
    pub fn is_eligible_for_activation(&self, finalized_epoch: Epoch) -> bool {
        self.activation_eligibility_epoch <= finalized_epoch
            && self.activation_epoch == crate::primitives::FAR_FUTURE_EPOCH
    }
}

impl SszHash for Validator {
    fn hash_tree_root(&self) -> H256 {
        container_root(&[
            self.pubkey.hash_tree_root(),
            self.withdrawal_credentials.hash_tree_root(),
            self.effective_balance.hash_tree_root(),
            self.slashed.hash_tree_root(),
            self.activation_eligibility_epoch.hash_tree_root(),
            self.activation_epoch.hash_tree_root(),
            self.exit_epoch.hash_tree_root(),
            self.withdrawable_epoch.hash_tree_root(),
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: CommitteeIndex,
    pub beacon_block_root: H256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

impl SszHash for AttestationData {
    fn hash_tree_root(&self) -> H256 {
        container_root(&[
            self.slot.hash_tree_root(),
            self.index.hash_tree_root(),
            self.beacon_block_root.hash_tree_root(),
            self.source.hash_tree_root(),
            self.target.hash_tree_root(),
        ])
    }
}

/// A phase-0 attestation as recorded in `previous_epoch_attestations`/`current_epoch_attestations`
/// after inclusion in a block. `aggregation_bits` records which members of the attesting
/// committee (identified by `attesting_indices`) actually signed; block-level aggregation-bit
/// verification is out of scope here, so the bits are carried as plain validator indices rather
/// than a real SSZ bitlist.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PendingAttestation {
    pub attesting_indices: Vec<ValidatorIndex>,
    pub data: AttestationData,
    pub inclusion_delay: Slot,
    pub proposer_index: ValidatorIndex,
}

impl SszHash for PendingAttestation {
    fn hash_tree_root(&self) -> H256 {
        let indices_root = merkleize(
            &self
                .attesting_indices
                .iter()
                .map(SszHash::hash_tree_root)
                .collect::<Vec<_>>(),
            0,
        );

        container_root(&[
            indices_root,
            self.data.hash_tree_root(),
            self.inclusion_delay.hash_tree_root(),
            self.proposer_index.hash_tree_root(),
        ])
    }
}
