use core::marker::PhantomData;

use ssz::{merkleize, PersistentList, SszHash, H256};

use crate::{
    phase0::containers::{
        BeaconBlockHeader, Checkpoint, Eth1Data, Fork, PendingAttestation, Validator,
    },
    preset::Preset,
    primitives::{DepositIndex, Gwei, Slot},
};

/// The phase-0 beacon state, as described in `SPEC_FULL.md` §3. Field order matches the spec
/// prose exactly; `P: Preset` fixes the ring-buffer and vector lengths the way the teacher
/// crate's `BeaconState<P>` does.
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

    // > Attestations
    pub previous_epoch_attestations: PersistentList<PendingAttestation>,
    pub current_epoch_attestations: PersistentList<PendingAttestation>,

    // > Finality
    pub justification_bits: u8,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    pub phantom: PhantomData<P>,
}

impl<P: Preset> BeaconState<P> {
    #[must_use]
    pub fn genesis(config_genesis_time: u64, genesis_validators_root: H256, fork: Fork) -> Self {
        Self {
            genesis_time: config_genesis_time,
            genesis_validators_root,
            slot: 0,
            fork,
            latest_block_header: BeaconBlockHeader::default(),
            block_roots: PersistentList::with_minimum_depth(
                P::SLOTS_PER_HISTORICAL_ROOT.ilog2(),
            ),
            state_roots: PersistentList::with_minimum_depth(P::SLOTS_PER_HISTORICAL_ROOT.ilog2()),
            historical_roots: PersistentList::new(),
            eth1_data: Eth1Data::default(),
            eth1_data_votes: PersistentList::new(),
            eth1_deposit_index: 0,
            validators: PersistentList::new(),
            balances: PersistentList::new(),
            randao_mixes: PersistentList::from_iter(
                core::iter::repeat(H256::zero()).take(P::EPOCHS_PER_HISTORICAL_VECTOR as usize),
            ),
            slashings: PersistentList::from_iter(
                core::iter::repeat(0).take(P::EPOCHS_PER_SLASHINGS_VECTOR as usize),
            ),
            previous_epoch_attestations: PersistentList::new(),
            current_epoch_attestations: PersistentList::new(),
            justification_bits: 0,
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),
            phantom: PhantomData,
        }
    }
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
                self.previous_epoch_attestations.hash_tree_root(),
                self.current_epoch_attestations.hash_tree_root(),
                self.justification_bits.hash_tree_root(),
                self.previous_justified_checkpoint.hash_tree_root(),
                self.current_justified_checkpoint.hash_tree_root(),
                self.finalized_checkpoint.hash_tree_root(),
            ],
            0,
        )
    }
}
