//! Distributor configuration.

use crate::error::RewardsError;
use revshare_types::Address;
use serde::{Deserialize, Serialize};

/// What a participant's weight is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightSource {
    /// Weight equals locked stake principal.
    Stake,
    /// Weight is 1 per member, driven by the privilege registry.
    Membership,
}

impl WeightSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stake => "stake",
            Self::Membership => "membership",
        }
    }
}

/// Whether a stake claim may change hands while its lock is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTransferPolicy {
    /// Transfers fail with `LockNotEnded` until the sender's lock ends.
    #[default]
    RejectWhileLocked,
    /// Transfers are allowed; the recipient's stake takes the later of the
    /// two lock ends.
    InheritLock,
}

pub const DEFAULT_EARLY_EXIT_PENALTY_PCT: u32 = 15;
pub const DEFAULT_MINIMUM_LOCK_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorConfig {
    pub source: WeightSource,
    /// Ledger account holding the pool's revenue and staked principal.
    pub pool_account: Address,
    /// May change the minimum lock period.
    pub owner: Address,
    /// Accounts allowed to call `notify` besides `pool_account`.
    pub depositors: Vec<Address>,
    /// The only caller allowed to change membership weights.
    pub registry_authority: Option<Address>,
    pub minimum_lock_secs: u64,
    pub early_exit_penalty_pct: u32,
    pub lock_transfer_policy: LockTransferPolicy,
}

impl DistributorConfig {
    /// A stake-weighted pool with default lock and penalty.
    pub fn staking(pool_account: Address, owner: Address) -> Self {
        Self {
            source: WeightSource::Stake,
            pool_account,
            owner,
            depositors: Vec::new(),
            registry_authority: None,
            minimum_lock_secs: DEFAULT_MINIMUM_LOCK_SECS,
            early_exit_penalty_pct: DEFAULT_EARLY_EXIT_PENALTY_PCT,
            lock_transfer_policy: LockTransferPolicy::default(),
        }
    }

    /// A membership pool whose weights are set by `authority`.
    pub fn membership(pool_account: Address, owner: Address, authority: Address) -> Self {
        Self {
            source: WeightSource::Membership,
            registry_authority: Some(authority),
            minimum_lock_secs: 0,
            ..Self::staking(pool_account, owner)
        }
    }

    pub fn with_depositor(mut self, depositor: Address) -> Self {
        self.depositors.push(depositor);
        self
    }

    pub fn validate(&self) -> Result<(), RewardsError> {
        if self.early_exit_penalty_pct > 100 {
            return Err(RewardsError::InvalidConfig(format!(
                "early exit penalty {}% exceeds 100%",
                self.early_exit_penalty_pct
            )));
        }
        if self.source == WeightSource::Membership && self.registry_authority.is_none() {
            return Err(RewardsError::InvalidConfig(
                "membership pool requires a registry authority".into(),
            ));
        }
        Ok(())
    }

    pub fn is_depositor(&self, caller: &Address) -> bool {
        *caller == self.pool_account || self.depositors.contains(caller)
    }
}
