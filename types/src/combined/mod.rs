use ssz::{Hc, PersistentList, SszHash, H256};

use crate::{
    altair,
    nonstandard::Phase,
    phase0,
    phase0::containers::{BeaconBlockHeader, Checkpoint, Eth1Data, Validator},
    preset::Preset,
    primitives::{DepositIndex, Epoch, Gwei, Slot, ValidatorIndex},
};

/// A beacon state of either fork this engine supports. The state-transition façade
/// (`transition_functions::unphased::process_slots`) and the fork-upgrade dispatcher operate on
/// this enum; the per-fork sub-phase processors in `transition_functions::{phase0,altair}` work
/// directly on the concrete `phase0::BeaconState<P>` / `altair::BeaconState<P>` they are given
/// after the caller has matched on the variant, the same split the teacher crate draws between
/// `combined` and the per-fork processing modules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BeaconState<P: Preset> {
    Phase0(Hc<phase0::beacon_state::BeaconState<P>>),
    Altair(Hc<altair::beacon_state::BeaconState<P>>),
}

impl<P: Preset> BeaconState<P> {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Phase0(_) => Phase::Phase0,
            Self::Altair(_) => Phase::Altair,
        }
    }

    #[must_use]
    pub fn slot(&self) -> Slot {
        match self {
            Self::Phase0(state) => state.slot,
            Self::Altair(state) => state.slot,
        }
    }

    pub fn set_slot(&mut self, slot: Slot) {
        match self {
            Self::Phase0(state) => state.slot = slot,
            Self::Altair(state) => state.slot = slot,
        }
    }

    #[must_use]
    pub fn hash_tree_root(&self) -> H256 {
        match self {
            Self::Phase0(state) => state.hash_tree_root(),
            Self::Altair(state) => state.hash_tree_root(),
        }
    }

    #[must_use]
    pub fn genesis_validators_root(&self) -> H256 {
        match self {
            Self::Phase0(state) => state.genesis_validators_root,
            Self::Altair(state) => state.genesis_validators_root,
        }
    }

    #[must_use]
    pub fn validator_count(&self) -> usize {
        match self {
            Self::Phase0(state) => state.validators.len(),
            Self::Altair(state) => state.validators.len(),
        }
    }

    /// The state's root as last written into `latest_block_header.state_root`, i.e. with the
    /// zero placeholder `unphased::process_slot` has not yet patched in for the current slot.
    #[must_use]
    pub fn latest_block_header_state_root_is_zeroed(&self) -> bool {
        match self {
            Self::Phase0(state) => state.latest_block_header.state_root.is_zero(),
            Self::Altair(state) => state.latest_block_header.state_root.is_zero(),
        }
    }

    pub fn set_latest_block_header_state_root(&mut self, state_root: H256) {
        match self {
            Self::Phase0(state) => state.latest_block_header.state_root = state_root,
            Self::Altair(state) => state.latest_block_header.state_root = state_root,
        }
    }

    #[must_use]
    pub fn latest_block_header(&self) -> BeaconBlockHeader {
        match self {
            Self::Phase0(state) => state.latest_block_header,
            Self::Altair(state) => state.latest_block_header,
        }
    }

    pub fn set_block_root(&mut self, index: usize, block_root: H256) {
        match self {
            Self::Phase0(state) => state.block_roots.set(index, block_root),
            Self::Altair(state) => state.block_roots.set(index, block_root),
        }
        .expect("index is taken modulo the vector's fixed capacity");
    }

    pub fn set_state_root(&mut self, index: usize, state_root: H256) {
        match self {
            Self::Phase0(state) => state.state_roots.set(index, state_root),
            Self::Altair(state) => state.state_roots.set(index, state_root),
        }
        .expect("index is taken modulo the vector's fixed capacity");
    }

    #[must_use]
    pub fn block_root(&self, index: usize) -> H256 {
        match self {
            Self::Phase0(state) => *state.block_roots.get(index).expect("index in bounds"),
            Self::Altair(state) => *state.block_roots.get(index).expect("index in bounds"),
        }
    }

    #[must_use]
    pub fn block_roots_len(&self) -> usize {
        match self {
            Self::Phase0(state) => state.block_roots.len(),
            Self::Altair(state) => state.block_roots.len(),
        }
    }

    #[must_use]
    pub fn state_root(&self, index: usize) -> H256 {
        match self {
            Self::Phase0(state) => *state.state_roots.get(index).expect("index in bounds"),
            Self::Altair(state) => *state.state_roots.get(index).expect("index in bounds"),
        }
    }

    #[must_use]
    pub fn block_roots_hash_tree_root(&self) -> H256 {
        match self {
            Self::Phase0(state) => state.block_roots.hash_tree_root(),
            Self::Altair(state) => state.block_roots.hash_tree_root(),
        }
    }

    #[must_use]
    pub fn state_roots_hash_tree_root(&self) -> H256 {
        match self {
            Self::Phase0(state) => state.state_roots.hash_tree_root(),
            Self::Altair(state) => state.state_roots.hash_tree_root(),
        }
    }

    pub fn push_historical_root(&mut self, root: H256) {
        match self {
            Self::Phase0(state) => state.historical_roots.push(root),
            Self::Altair(state) => state.historical_roots.push(root),
        }
    }

    #[must_use]
    pub fn validators(&self) -> &PersistentList<Validator> {
        match self {
            Self::Phase0(state) => &state.validators,
            Self::Altair(state) => &state.validators,
        }
    }

    #[must_use]
    pub fn validator(&self, index: ValidatorIndex) -> Option<&Validator> {
        self.validators().get(index as usize).ok()
    }

    pub fn validator_mut(&mut self, index: ValidatorIndex) -> Option<&mut Validator> {
        match self {
            Self::Phase0(state) => state.validators.get_mut(index as usize).ok(),
            Self::Altair(state) => state.validators.get_mut(index as usize).ok(),
        }
    }

    #[must_use]
    pub fn balances(&self) -> &PersistentList<Gwei> {
        match self {
            Self::Phase0(state) => &state.balances,
            Self::Altair(state) => &state.balances,
        }
    }

    /// Overwrites every balance from a flat buffer computed off the tree, rebuilding the balances
    /// sub-tree in one step rather than mutating it per validator (`SPEC_FULL.md` §9).
    pub fn set_balances_from_flat_buffer(&mut self, balances: Vec<Gwei>) {
        let balances = PersistentList::from_iter(balances);

        match self {
            Self::Phase0(state) => state.balances = balances,
            Self::Altair(state) => state.balances = balances,
        }
    }

    #[must_use]
    pub fn randao_mix(&self, index: usize) -> H256 {
        match self {
            Self::Phase0(state) => *state.randao_mixes.get(index).expect("index in bounds"),
            Self::Altair(state) => *state.randao_mixes.get(index).expect("index in bounds"),
        }
    }

    pub fn set_randao_mix(&mut self, index: usize, mix: H256) {
        match self {
            Self::Phase0(state) => state.randao_mixes.set(index, mix),
            Self::Altair(state) => state.randao_mixes.set(index, mix),
        }
        .expect("index is taken modulo the vector's fixed capacity");
    }

    #[must_use]
    pub fn slashings(&self) -> &PersistentList<Gwei> {
        match self {
            Self::Phase0(state) => &state.slashings,
            Self::Altair(state) => &state.slashings,
        }
    }

    pub fn set_slashing(&mut self, index: usize, amount: Gwei) {
        match self {
            Self::Phase0(state) => state.slashings.set(index, amount),
            Self::Altair(state) => state.slashings.set(index, amount),
        }
        .expect("index is taken modulo the vector's fixed capacity");
    }

    #[must_use]
    pub fn justification_bits(&self) -> u8 {
        match self {
            Self::Phase0(state) => state.justification_bits,
            Self::Altair(state) => state.justification_bits,
        }
    }

    pub fn set_justification_bits(&mut self, bits: u8) {
        match self {
            Self::Phase0(state) => state.justification_bits = bits,
            Self::Altair(state) => state.justification_bits = bits,
        }
    }

    #[must_use]
    pub fn previous_justified_checkpoint(&self) -> Checkpoint {
        match self {
            Self::Phase0(state) => state.previous_justified_checkpoint,
            Self::Altair(state) => state.previous_justified_checkpoint,
        }
    }

    pub fn set_previous_justified_checkpoint(&mut self, checkpoint: Checkpoint) {
        match self {
            Self::Phase0(state) => state.previous_justified_checkpoint = checkpoint,
            Self::Altair(state) => state.previous_justified_checkpoint = checkpoint,
        }
    }

    #[must_use]
    pub fn current_justified_checkpoint(&self) -> Checkpoint {
        match self {
            Self::Phase0(state) => state.current_justified_checkpoint,
            Self::Altair(state) => state.current_justified_checkpoint,
        }
    }

    pub fn set_current_justified_checkpoint(&mut self, checkpoint: Checkpoint) {
        match self {
            Self::Phase0(state) => state.current_justified_checkpoint = checkpoint,
            Self::Altair(state) => state.current_justified_checkpoint = checkpoint,
        }
    }

    #[must_use]
    pub fn finalized_checkpoint(&self) -> Checkpoint {
        match self {
            Self::Phase0(state) => state.finalized_checkpoint,
            Self::Altair(state) => state.finalized_checkpoint,
        }
    }

    pub fn set_finalized_checkpoint(&mut self, checkpoint: Checkpoint) {
        match self {
            Self::Phase0(state) => state.finalized_checkpoint = checkpoint,
            Self::Altair(state) => state.finalized_checkpoint = checkpoint,
        }
    }

    #[must_use]
    pub fn eth1_deposit_index(&self) -> DepositIndex {
        match self {
            Self::Phase0(state) => state.eth1_deposit_index,
            Self::Altair(state) => state.eth1_deposit_index,
        }
    }

    pub fn clear_eth1_data_votes(&mut self) {
        match self {
            Self::Phase0(state) => state.eth1_data_votes = PersistentList::new(),
            Self::Altair(state) => state.eth1_data_votes = PersistentList::new(),
        }
    }

    #[must_use]
    pub fn eth1_data_votes(&self) -> &PersistentList<Eth1Data> {
        match self {
            Self::Phase0(state) => &state.eth1_data_votes,
            Self::Altair(state) => &state.eth1_data_votes,
        }
    }

    /// The epoch implied by `slot / SLOTS_PER_EPOCH`. Defined identically for every fork.
    #[must_use]
    pub fn current_epoch(&self) -> Epoch {
        self.slot() / P::SLOTS_PER_EPOCH
    }

    #[must_use]
    pub fn previous_epoch(&self) -> Epoch {
        let current_epoch = self.current_epoch();

        if current_epoch > crate::primitives::GENESIS_EPOCH {
            current_epoch - 1
        } else {
            crate::primitives::GENESIS_EPOCH
        }
    }
}

impl<P: Preset> From<Hc<phase0::beacon_state::BeaconState<P>>> for BeaconState<P> {
    fn from(state: Hc<phase0::beacon_state::BeaconState<P>>) -> Self {
        Self::Phase0(state)
    }
}

impl<P: Preset> From<Hc<altair::beacon_state::BeaconState<P>>> for BeaconState<P> {
    fn from(state: Hc<altair::beacon_state::BeaconState<P>>) -> Self {
        Self::Altair(state)
    }
}
