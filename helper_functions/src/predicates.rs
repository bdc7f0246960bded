use types::{phase0::containers::Validator, primitives::Epoch};

#[must_use]
pub fn is_active_validator(validator: &Validator, epoch: Epoch) -> bool {
    validator.is_active(epoch)
}

#[must_use]
pub fn is_eligible_for_activation_queue(validator: &Validator) -> bool {
    validator.is_eligible_for_activation_queue()
}

#[must_use]
pub fn is_eligible_for_activation(validator: &Validator, finalized_epoch: Epoch) -> bool {
    validator.is_eligible_for_activation(finalized_epoch)
}

#[cfg(test)]
mod tests {
    use types::primitives::FAR_FUTURE_EPOCH;

    use super::*;

    fn validator_at(activation_epoch: Epoch, exit_epoch: Epoch) -> Validator {
        Validator {
            activation_epoch,
            exit_epoch,
            ..Validator::default()
        }
    }

    #[test]
    fn active_validator_window_is_half_open() {
        let validator = validator_at(10, 20);

        assert!(!is_active_validator(&validator, 9));
        assert!(is_active_validator(&validator, 10));
        assert!(is_active_validator(&validator, 19));
        assert!(!is_active_validator(&validator, 20));
    }

    #[test]
    fn validator_never_activated_is_not_active() {
        let validator = validator_at(FAR_FUTURE_EPOCH, FAR_FUTURE_EPOCH);

        assert!(!is_active_validator(&validator, 0));
    }
}
