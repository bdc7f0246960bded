use types::{
    consts::MIN_VALIDATOR_WITHDRAWABILITY_DELAY,
    preset::Preset,
    primitives::Epoch,
};

/// The first epoch at which a validator queued for exit or activation this epoch may actually
/// transition, staying `MAX_SEED_LOOKAHEAD` ahead of `current_epoch` so that the shuffling seed for
/// that epoch is already fixed by the time the change takes effect.
#[must_use]
pub fn compute_activation_exit_epoch(current_epoch: Epoch) -> Epoch {
    current_epoch + 1 + types::consts::MAX_SEED_LOOKAHEAD
}

/// Whether `slot` is the first slot of its epoch.
#[must_use]
pub fn is_epoch_start<P: Preset>(slot: types::primitives::Slot) -> bool {
    slot % P::SLOTS_PER_EPOCH == 0
}

/// The withdrawable epoch `MIN_VALIDATOR_WITHDRAWABILITY_DELAY` epochs after `exit_epoch`.
#[must_use]
pub fn compute_withdrawable_epoch(exit_epoch: Epoch) -> Epoch {
    exit_epoch + MIN_VALIDATOR_WITHDRAWABILITY_DELAY
}

#[cfg(test)]
mod tests {
    use types::preset::Mainnet;

    use super::*;

    #[test]
    fn activation_exit_epoch_is_lookahead_ahead_of_current() {
        assert_eq!(compute_activation_exit_epoch(10), 15);
    }

    #[test]
    fn epoch_start_detects_first_slot_only() {
        assert!(is_epoch_start::<Mainnet>(0));
        assert!(is_epoch_start::<Mainnet>(32));
        assert!(!is_epoch_start::<Mainnet>(1));
    }

    #[test]
    fn withdrawable_epoch_adds_delay() {
        assert_eq!(
            compute_withdrawable_epoch(100),
            100 + MIN_VALIDATOR_WITHDRAWABILITY_DELAY,
        );
    }
}
