use core::marker::PhantomData;
use std::sync::Arc;

use ssz::{merkleize, PersistentList, SszHash, H256};

use crate::{
    altair::containers::{ParticipationFlags, SyncCommittee},
    phase0::containers::{BeaconBlockHeader, Checkpoint, Eth1Data, Fork, Validator},
    preset::Preset,
    primitives::{DepositIndex, Gwei, Slot},
};

/// The Altair beacon state. Differs from phase 0 by replacing `{previous,current}_epoch_attestations`
/// with byte-per-validator participation flags, adding `inactivity_scores`, and adding the two
/// sync committees (`SPEC_FULL.md` §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeaconState<P> {
    // > Versioning
    pub genesis_time: u64,
    pub genesis_validators_root: H256,
    pub slot: Slot,
    pub fork: Fork,

    // > History
    pub latest_block_header: BeaconBlockHeader,
    pub block_roots: PersistentList<H256>,
    pub state_roots: PersistentList<H256>,
    pub historical_roots: PersistentList<H256>,

    // > Eth1
    pub eth1_data: Eth1Data,
    pub eth1_data_votes: PersistentList<Eth1Data>,
    pub eth1_deposit_index: DepositIndex,

    // > Registry
    pub validators: PersistentList<Validator>,
    pub balances: PersistentList<Gwei>,

    // > Randomness
    pub randao_mixes: PersistentList<H256>,

    // > Slashings
    pub slashings: PersistentList<Gwei>,

    // > Participation
    pub previous_epoch_participation: PersistentList<ParticipationFlags>,
    pub current_epoch_participation: PersistentList<ParticipationFlags>,

    // > Finality
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // > Inactivity
    pub inactivity_scores: PersistentList<u64>,

    // > Sync
    pub current_sync_committee: Arc<SyncCommittee<P>>,
    pub next_sync_committee: Arc<SyncCommittee<P>>,

    pub phantom: PhantomData<P>,
}

impl<P> SszHash for BeaconState<P> {
    fn hash_tree_root(&self) -> H256 {
        merkleize(
            &[
                self.genesis_time.hash_tree_root(),
                self.genesis_validators_root.hash_tree_root(),
                self.slot.hash_tree_root(),
                self.fork.hash_tree_root(),
                self.latest_block_header.hash_tree_root(),
                self.block_roots.hash_tree_root(),
                self.state_roots.hash_tree_root(),
                self.historical_roots.hash_tree_root(),
                self.eth1_data.hash_tree_root(),
                self.eth1_data_votes.hash_tree_root(),
                self.eth1_deposit_index.hash_tree_root(),
                self.validators.hash_tree_root(),
                self.balances.hash_tree_root(),
                self.randao_mixes.hash_tree_root(),
                self.slashings.hash_tree_root(),
                self.previous_epoch_participation.hash_tree_root(),
                self.current_epoch_participation.hash_tree_root(),
                self.justification_bits.hash_tree_root(),
                self.previous_justified_checkpoint.hash_tree_root(),
                self.current_justified_checkpoint.hash_tree_root(),
                self.finalized_checkpoint.hash_tree_root(),
                self.inactivity_scores.hash_tree_root(),
                self.current_sync_committee.hash_tree_root(),
                self.next_sync_committee.hash_tree_root(),
            ],
            0,
        )
    }
}

impl<P: Preset> BeaconState<P> {
    #[must_use]
    pub fn phase(&self) -> crate::nonstandard::Phase {
        crate::nonstandard::Phase::Altair
    }
}
