use types::{
    cache::EpochCache, combined::BeaconState, config::Config,
    consts::MIN_EPOCHS_TO_INACTIVITY_PENALTY, nonstandard::Phase, preset::Preset,
};

use crate::{altair, epoch_cache, epoch_summary, phase0, unphased};

/// Upgrades `state` in place from phase 0 to Altair if the slot it is currently at belongs to an
/// epoch on or after `config.altair_fork_epoch` and it has not been upgraded yet (`SPEC_FULL.md`
/// §4.1, "`Phase` tag derived from `config.fork_at(state.slot)`"). A no-op once the state is
/// already Altair, or while it is still before the fork epoch. Cloning the inner phase 0 state is
/// cheap: `im`-backed `PersistentList` clones are structural-sharing, and `Phase0BeaconState`
/// carries no `Default` impl that would let this be a cheaper in-place swap.
fn maybe_upgrade_to_altair<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
) -> anyhow::Result<()> {
    // `process_epoch` runs on the last slot of the epoch that is closing, one slot before
    // `process_slots` advances into the next one, so the phase check looks one slot ahead.
    if Phase::at_slot::<P>(config, state.slot() + 1) != Phase::Altair {
        return Ok(());
    }

    let BeaconState::Phase0(inner) = state else {
        return Ok(());
    };

    let pre = inner.clone().into_inner();
    let post = helper_functions::fork::upgrade_to_altair(config, pre)?;

    log::info!("upgraded state to altair at slot {}", state.slot());

    *state = BeaconState::Altair(post.into());

    Ok(())
}

/// Runs one full epoch transition: upgrades the state across the Altair fork boundary if it just
/// crossed it, builds the epoch summary once, then drives every sub-phase processor from
/// `SPEC_FULL.md` §4.4 in the order §4.5 fixes, dispatching the fork-specific steps ((b), (c),
/// (k), (l)) on `state.phase()`. Mirrors the teacher crate's split between a fork-agnostic
/// `unphased` module and small per-fork modules, generalized from three forks to two.
pub fn process_epoch<P: Preset>(
    config: &Config,
    state: &mut BeaconState<P>,
    cache: &mut EpochCache,
) -> anyhow::Result<()> {
    maybe_upgrade_to_altair(config, state)?;

    let phase = state.phase();
    let current_epoch = state.current_epoch();

    log::debug!("processing epoch {current_epoch} ({phase:?})");

    let mut summary = epoch_summary::build_epoch_summary(phase, config, state);

    let (previous_attestations, current_attestations) = match phase {
        Phase::Phase0 => phase0::attestations_by_epoch(state),
        Phase::Altair => (Vec::new(), Vec::new()),
    };

    let (previous_participation, current_participation) = match phase {
        Phase::Phase0 => (Vec::new(), Vec::new()),
        Phase::Altair => altair::participation_by_epoch(state),
    };

    epoch_summary::attribute_participation(
        phase,
        state,
        &previous_attestations,
        &current_attestations,
        &previous_participation,
        &current_participation,
        &mut summary,
    );

    let finality_delay = summary
        .previous_epoch
        .saturating_sub(state.finalized_checkpoint().epoch);

    if finality_delay > MIN_EPOCHS_TO_INACTIVITY_PENALTY {
        log::warn!("inactivity leak active at epoch {current_epoch} (finality delay {finality_delay})");
    }

    unphased::process_justification_and_finalization(state, &summary);

    if phase == Phase::Altair {
        altair::process_inactivity_updates(config, state, &summary, finality_delay)?;
    }

    let mut balances = summary.balances.clone();

    match phase {
        Phase::Phase0 => {
            phase0::process_rewards_and_penalties(state, &summary, finality_delay, &mut balances);
        }
        Phase::Altair => {
            altair::process_rewards_and_penalties(config, state, &summary, &mut balances)?;
        }
    }

    state.set_balances_from_flat_buffer(balances);

    unphased::process_registry_updates(state, &summary, cache.churn_limit())?;
    unphased::process_slashings(phase, state, &summary);
    unphased::process_eth1_data_reset(state);
    unphased::process_effective_balance_updates(state);
    unphased::process_slashings_reset(state);
    unphased::process_randao_mixes_reset(state);
    unphased::process_historical_roots_update(state);

    match phase {
        Phase::Phase0 => phase0::process_participation_record_updates(state)?,
        Phase::Altair => altair::process_participation_record_updates(state)?,
    }

    if phase == Phase::Altair {
        altair::process_sync_committee_updates(state)?;
    }

    epoch_cache::rotate(config, state, cache);

    log::debug!("finished processing epoch {current_epoch}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use types::{
        phase0::beacon_state::BeaconState as Phase0BeaconState, preset::Minimal, primitives::H256,
    };

    use super::*;

    #[test]
    fn process_epoch_upgrades_to_altair_once_the_fork_epoch_is_reached() {
        let config = Config {
            altair_fork_epoch: 1,
            ..Config::minimal_altair_from_genesis()
        };

        let mut state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        for _ in 0..8 {
            state.validators.push(types::phase0::containers::Validator {
                effective_balance: types::consts::MAX_EFFECTIVE_BALANCE,
                activation_epoch: 0,
                exit_epoch: types::primitives::FAR_FUTURE_EPOCH,
                withdrawable_epoch: types::primitives::FAR_FUTURE_EPOCH,
                ..Default::default()
            });
            state.balances.push(types::consts::MAX_EFFECTIVE_BALANCE);
        }

        state.slot = Minimal::SLOTS_PER_EPOCH - 1;

        let mut state = BeaconState::Phase0(state.into());
        let mut cache = epoch_cache::build(&config, &state);

        assert_eq!(state.phase(), Phase::Phase0);

        process_epoch(&config, &mut state, &mut cache).expect("epoch transition across the fork boundary succeeds");

        assert_eq!(state.phase(), Phase::Altair);
    }

    #[test]
    fn process_epoch_advances_without_erroring_on_a_tiny_validator_set() {
        let config = Config::minimal_altair_from_genesis();
        let mut state = Phase0BeaconState::<Minimal>::genesis(
            config.min_genesis_time,
            H256::zero(),
            Default::default(),
        );

        for _ in 0..8 {
            state.validators.push(types::phase0::containers::Validator {
                effective_balance: types::consts::MAX_EFFECTIVE_BALANCE,
                activation_epoch: 0,
                exit_epoch: types::primitives::FAR_FUTURE_EPOCH,
                withdrawable_epoch: types::primitives::FAR_FUTURE_EPOCH,
                ..Default::default()
            });
            state.balances.push(types::consts::MAX_EFFECTIVE_BALANCE);
        }

        state.slot = Minimal::SLOTS_PER_EPOCH * 2 - 1;

        let mut state = BeaconState::Phase0(state.into());
        let mut cache = epoch_cache::build(&config, &state);

        assert!(process_epoch(&config, &mut state, &mut cache).is_ok());
    }
}
