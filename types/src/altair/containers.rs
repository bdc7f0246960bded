use ssz::{merkleize, PersistentList, SszHash, H256};

use crate::{preset::Preset, primitives::PublicKeyBytes};

/// The committee of validators responsible for light-client sync-committee signatures during one
/// `EPOCHS_PER_SYNC_COMMITTEE_PERIOD` window. Real aggregate-pubkey bookkeeping and sync-committee
/// signature verification are out of scope (no block processing here), so this only carries the
/// member list, which is everything `compute_sync_committee`/`get_next_sync_committee` and the
/// epoch cache's indexed view need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncCommittee<P> {
    pub pubkeys: PersistentList<PublicKeyBytes>,
    phantom: core::marker::PhantomData<P>,
}

impl<P: Preset> SyncCommittee<P> {
    #[must_use]
    pub fn new(pubkeys: Vec<PublicKeyBytes>) -> Self {
        assert_eq!(pubkeys.len(), P::SYNC_COMMITTEE_SIZE as usize);

        Self {
            pubkeys: pubkeys.into_iter().collect(),
            phantom: core::marker::PhantomData,
        }
    }
}

impl<P> Default for SyncCommittee<P> {
    fn default() -> Self {
        Self {
            pubkeys: PersistentList::new(),
            phantom: core::marker::PhantomData,
        }
    }
}

impl<P> SszHash for SyncCommittee<P> {
    fn hash_tree_root(&self) -> H256 {
        merkleize(&[self.pubkeys.hash_tree_root()], 0)
    }
}

/// A single validator's participation byte for one epoch. Only the low 3 bits are ever set
/// (`TIMELY_SOURCE`/`TARGET`/`HEAD`); kept as a bare `u8` rather than a bitflags type because it
/// is read directly off `previous_epoch_participation`/`current_epoch_participation`, which the
/// consensus spec itself defines as a byte list.
pub type ParticipationFlags = u8;
