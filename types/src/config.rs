use serde::{Deserialize, Serialize};

use crate::primitives::{DepositContractAddress, Epoch, Gwei, Version};

/// Network-parameterized configuration, loaded once per process and shared via `Arc<Config>` the
/// way the teacher crate threads `Arc<Config>` through `fork_choice_control`, `validator`, and
/// `transition_functions`. Field list matches `SPEC_FULL.md` §6 exactly; everything else a real
/// network config would also carry (deposit chain follow distance, networking ports, …) belongs
/// to the out-of-scope surrounding subsystems.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    pub min_genesis_time: u64,
    pub min_genesis_active_validator_count: u64,
    pub genesis_delay: u64,

    #[serde(with = "serde_utils::prefixed_hex_fixed_size_array")]
    pub genesis_fork_version: Version,
    #[serde(with = "serde_utils::prefixed_hex_fixed_size_array")]
    pub altair_fork_version: Version,

    pub altair_fork_epoch: Epoch,

    pub seconds_per_slot: u64,

    pub ejection_balance: Gwei,
    pub churn_limit_quotient: u64,

    pub inactivity_score_bias: u64,
    pub inactivity_score_recovery_rate: u64,

    #[serde(with = "serde_utils::prefixed_hex_fixed_size_array")]
    pub deposit_contract_address: DepositContractAddress,
    pub deposit_network_id: u64,
}

impl Config {
    /// Mainnet defaults, matching the public consensus-layer mainnet config as of the Altair
    /// fork. Equivalent in spirit to `predefined_chains::mainnet` in the teacher's workspace.
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            min_genesis_time: 1_606_824_000,
            min_genesis_active_validator_count: 16384,
            genesis_delay: 604_800,
            genesis_fork_version: [0x00, 0x00, 0x00, 0x00],
            altair_fork_version: [0x01, 0x00, 0x00, 0x00],
            altair_fork_epoch: 74_240,
            seconds_per_slot: 12,
            ejection_balance: 16_000_000_000,
            churn_limit_quotient: 65536,
            inactivity_score_bias: 4,
            inactivity_score_recovery_rate: 16,
            deposit_contract_address: [0; 20],
            deposit_network_id: 1,
        }
    }

    /// A config whose Altair fork is active from genesis, useful for tests that only care about
    /// Altair behavior and would otherwise need to drive a state through the upgrade first.
    #[must_use]
    pub fn minimal_altair_from_genesis() -> Self {
        Self {
            altair_fork_epoch: 0,
            min_genesis_active_validator_count: 64,
            churn_limit_quotient: 32,
            ..Self::mainnet()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_config_round_trips_through_json() {
        let config = Config::mainnet();
        let json = serde_json::to_string(&config).expect("serialization cannot fail");
        let decoded: Config = serde_json::from_str(&json).expect("round-trip should succeed");

        assert_eq!(decoded, config);
    }
}
