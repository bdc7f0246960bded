use types::{cache::EpochCache, combined::BeaconState, config::Config, preset::Preset, primitives::Slot};

use crate::{combined::process_epoch, error::Error, unphased};
use helper_functions::misc;

/// The state-transition façade: advances `state` slot by slot up to (and including) `target_slot`,
/// running a full epoch transition whenever a slot boundary crosses into a new epoch
/// (`SPEC_FULL.md` §4.6). Grounded directly on the teacher crate's per-fork `slot_processing`
/// modules, generalized to drive the combined (fork-dispatching) state instead of one concrete
/// fork's state.
pub fn process_slots<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    cache: &mut EpochCache,
    target_slot: Slot,
) -> anyhow::Result<()> {
    let start_slot = state.slot();

    anyhow::ensure!(
        start_slot < target_slot,
        Error::SlotNotLater {
            current: start_slot,
            target: target_slot,
        },
    );

    if target_slot - start_slot > P::SLOTS_PER_EPOCH {
        log::warn!("process_slots spans more than one epoch boundary ({start_slot} -> {target_slot})");
    }

    while state.slot() < target_slot {
        unphased::process_slot(state);

        if misc::is_epoch_start::<P>(state.slot() + 1) {
            process_epoch(config, state, cache)?;
        }

        state.set_slot(state.slot() + 1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use types::{
        phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal, primitives::H256,
    };

    use super::*;

    #[test]
    fn process_slots_rejects_a_target_at_or_behind_the_current_slot() {
        let config = Config::minimal_altair_from_genesis();
        let state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        let mut state = BeaconState::Phase0(state.into());
        let mut cache = crate::epoch_cache::build(&config, &state);

        assert!(process_slots(&config, &mut state, &mut cache, 0).is_err());
    }

    #[test]
    fn process_slots_advances_slot_by_slot() {
        let config = Config::minimal_altair_from_genesis();
        let state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        let mut state = BeaconState::Phase0(state.into());
        let mut cache = crate::epoch_cache::build(&config, &state);

        process_slots(&config, &mut state, &mut cache, 3).expect("advancing within one epoch should succeed");
        assert_eq!(state.slot(), 3);
    }

    #[test]
    fn process_slots_upgrades_the_state_when_it_crosses_the_fork_epoch() {
        use types::nonstandard::Phase;

        let config = Config {
            altair_fork_epoch: 1,
            ..Config::minimal_altair_from_genesis()
        };

        let state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        let mut state = BeaconState::Phase0(state.into());
        let mut cache = crate::epoch_cache::build(&config, &state);

        process_slots(&config, &mut state, &mut cache, Minimal::SLOTS_PER_EPOCH + 1)
            .expect("advancing across the fork epoch should succeed");

        assert_eq!(state.phase(), Phase::Altair);
    }
}
