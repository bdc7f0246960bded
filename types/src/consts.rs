//! Consensus constants that are fixed across every network (as opposed to [`crate::config::Config`],
//! which holds the handful that are network-parameterized per `SPEC_FULL.md` §6).

use crate::primitives::Gwei;

pub const EFFECTIVE_BALANCE_INCREMENT: Gwei = 1_000_000_000;
pub const MAX_EFFECTIVE_BALANCE: Gwei = 32_000_000_000;

pub const BASE_REWARD_FACTOR: u64 = 64;
pub const BASE_REWARDS_PER_EPOCH: u64 = 4;
pub const PROPOSER_REWARD_QUOTIENT: u64 = 8;

pub const MIN_PER_EPOCH_CHURN_LIMIT: u64 = 4;
pub const MIN_SEED_LOOKAHEAD: u64 = 1;
pub const MIN_VALIDATOR_WITHDRAWABILITY_DELAY: u64 = 256;
pub const MAX_SEED_LOOKAHEAD: u64 = 4;

pub const EPOCHS_PER_ETH1_VOTING_PERIOD: u64 = 64;

pub const HYSTERESIS_QUOTIENT: u64 = 4;
pub const HYSTERESIS_DOWNWARD_MULTIPLIER: u64 = 1;
pub const HYSTERESIS_UPWARD_MULTIPLIER: u64 = 5;

pub const PROPORTIONAL_SLASHING_MULTIPLIER: u64 = 3;
pub const PROPORTIONAL_SLASHING_MULTIPLIER_ALTAIR: u64 = 2;

// Phase 0 only; Altair replaces this with `INACTIVITY_PENALTY_QUOTIENT_ALTAIR` driven off
// `inactivity_scores` instead of the finality delay.
pub const INACTIVITY_PENALTY_QUOTIENT: u64 = 1 << 26;
pub const MIN_EPOCHS_TO_INACTIVITY_PENALTY: u64 = 4;

// Altair-only weighting of participation flags, used by `process_rewards_and_penalties` and the
// participation-flag bit positions read from `previous/current_epoch_participation`.
pub const TIMELY_SOURCE_FLAG_INDEX: u32 = 0;
pub const TIMELY_TARGET_FLAG_INDEX: u32 = 1;
pub const TIMELY_HEAD_FLAG_INDEX: u32 = 2;

pub const TIMELY_SOURCE_WEIGHT: u64 = 14;
pub const TIMELY_TARGET_WEIGHT: u64 = 26;
pub const TIMELY_HEAD_WEIGHT: u64 = 14;
pub const SYNC_REWARD_WEIGHT: u64 = 2;
pub const PROPOSER_WEIGHT: u64 = 8;
pub const WEIGHT_DENOMINATOR: u64 = 64;

pub const INACTIVITY_PENALTY_QUOTIENT_ALTAIR: u64 = 3 * (1 << 24);

pub const EPOCHS_PER_SYNC_COMMITTEE_PERIOD: u64 = 256;

pub const DOMAIN_SYNC_COMMITTEE: [u8; 4] = [0x07, 0x00, 0x00, 0x00];
