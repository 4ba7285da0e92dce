//! Locked stakes.

use revshare_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// An active stake. At most one exists per address; the amount never
/// changes except through a stake-claim transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    pub address: Address,
    pub amount: u128,
    pub lock_ends_at: Timestamp,
}

impl Stake {
    /// Whether the lock is still running at `now`. The lock ends exactly at
    /// `lock_ends_at`.
    pub fn is_locked(&self, now: Timestamp) -> bool {
        now < self.lock_ends_at
    }
}

/// What `unstake` paid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakeReceipt {
    /// Principal returned; always the full staked amount.
    pub principal: u128,
    /// Reward paid after any early-exit penalty.
    pub reward: u128,
    /// Reward forfeited to the remaining participants.
    pub forfeited: u128,
}
