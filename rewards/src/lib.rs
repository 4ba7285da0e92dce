//! Reward distributor: proportional revenue sharing in O(1) per deposit.
//!
//! Revenue deposited with `notify` advances a single reward-per-weight
//! accumulator; each participant's entitlement is
//! `credited + weight * (acc - reward_debt) / SCALE` and is settled before
//! every change to their weight. The same engine backs both the stake
//! pool (weight = locked principal, with a minimum lock and early-exit
//! penalty) and the membership pool (weight = 1 per privileged holder).

pub mod config;
pub mod distributor;
pub mod error;
pub mod pool;
pub mod shares;
pub mod stake;

pub use config::{DistributorConfig, LockTransferPolicy, WeightSource};
pub use distributor::{PoolTotals, RewardAccount, RewardDistributor};
pub use error::RewardsError;
pub use pool::{DepositOutcome, PoolState};
pub use shares::ShareToken;
pub use stake::{Stake, UnstakeReceipt};
