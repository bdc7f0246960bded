use core::fmt::Debug;

/// Compile-time family of vector-length constants a [`crate::phase0::beacon_state::BeaconState`]
/// (and its later-fork variants) is generic over. Mirrors the teacher crate's
/// `types::preset::Preset`, minus the `typenum` type-level integers: those exist upstream so SSZ
/// vector/list bounds can be checked at compile time, which this simplified `ssz` crate does not
/// attempt (see `DESIGN.md`). Plain `usize`/`u64` associated constants give every sub-phase the
/// same capacity numbers without that machinery.
pub trait Preset: Copy + Clone + Debug + Default + Eq + Send + Sync + 'static {
    const SLOTS_PER_EPOCH: u64;
    const SLOTS_PER_HISTORICAL_ROOT: u64;
    const EPOCHS_PER_HISTORICAL_VECTOR: u64;
    const EPOCHS_PER_SLASHINGS_VECTOR: u64;
    const SYNC_COMMITTEE_SIZE: u64;
    const MAX_VALIDATORS_PER_COMMITTEE: u64;
    const TARGET_COMMITTEE_SIZE: u64;

    const NAME: &'static str;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mainnet;

impl Preset for Mainnet {
    const SLOTS_PER_EPOCH: u64 = 32;
    const SLOTS_PER_HISTORICAL_ROOT: u64 = 8192;
    const EPOCHS_PER_HISTORICAL_VECTOR: u64 = 65536;
    const EPOCHS_PER_SLASHINGS_VECTOR: u64 = 8192;
    const SYNC_COMMITTEE_SIZE: u64 = 512;
    const MAX_VALIDATORS_PER_COMMITTEE: u64 = 2048;
    const TARGET_COMMITTEE_SIZE: u64 = 128;

    const NAME: &'static str = "mainnet";
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Minimal;

impl Preset for Minimal {
    const SLOTS_PER_EPOCH: u64 = 8;
    const SLOTS_PER_HISTORICAL_ROOT: u64 = 64;
    const EPOCHS_PER_HISTORICAL_VECTOR: u64 = 64;
    const EPOCHS_PER_SLASHINGS_VECTOR: u64 = 64;
    const SYNC_COMMITTEE_SIZE: u64 = 32;
    const MAX_VALIDATORS_PER_COMMITTEE: u64 = 2048;
    const TARGET_COMMITTEE_SIZE: u64 = 4;

    const NAME: &'static str = "minimal";
}
