//! Host configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use revshare_governance::GovernanceParams;
use revshare_ledger::FeeSchedule;
use revshare_rewards::config::{DEFAULT_EARLY_EXIT_PENALTY_PCT, DEFAULT_MINIMUM_LOCK_SECS};
use revshare_rewards::LockTransferPolicy;
use revshare_types::Address;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a revshare host.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every section and field has a
/// default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Transfer fee and its split.
    #[serde(default)]
    pub fees: FeeSchedule,

    #[serde(default)]
    pub staking: StakingConfig,

    /// Proposal duration bounds.
    #[serde(default)]
    pub governance: GovernanceParams,

    #[serde(default)]
    pub accounts: AccountsConfig,

    #[serde(default)]
    pub genesis: GenesisConfig,
}

/// Stake pool parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    #[serde(default = "default_minimum_lock_secs")]
    pub minimum_lock_secs: u64,

    /// Share of accrued reward forfeited on exit before the lock ends.
    #[serde(default = "default_early_exit_penalty_pct")]
    pub early_exit_penalty_pct: u32,

    #[serde(default)]
    pub lock_transfer_policy: LockTransferPolicy,
}

/// Well-known ledger accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// May change the fee and the minimum lock period.
    #[serde(default = "default_owner")]
    pub owner: Address,

    /// Identity that notifies pools of routed fee revenue.
    #[serde(default = "default_fee_router")]
    pub fee_router: Address,

    #[serde(default = "default_staking_pool")]
    pub staking_pool: Address,

    #[serde(default = "default_membership_pool")]
    pub membership_pool: Address,

    /// Vote escrow; also the only caller allowed to change privileged
    /// status and membership weights.
    #[serde(default = "default_governance")]
    pub governance: Address,

    /// Initial recipient of the non-reward part of every fee.
    #[serde(default = "default_beneficiary")]
    pub beneficiary: Address,
}

/// State installed when the host starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Initial privileged holders; the first bootstraps the registry.
    #[serde(default)]
    pub privileged: Vec<Address>,

    /// Opening balances.
    #[serde(default)]
    pub balances: BTreeMap<Address, u64>,

    /// Accounts excluded from transfer fees.
    #[serde(default)]
    pub fee_exempt: Vec<Address>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_minimum_lock_secs() -> u64 {
    DEFAULT_MINIMUM_LOCK_SECS
}

fn default_early_exit_penalty_pct() -> u32 {
    DEFAULT_EARLY_EXIT_PENALTY_PCT
}

fn default_owner() -> Address {
    Address::new("owner")
}

fn default_fee_router() -> Address {
    Address::new("fee_router")
}

fn default_staking_pool() -> Address {
    Address::new("staking_pool")
}

fn default_membership_pool() -> Address {
    Address::new("membership_pool")
}

fn default_governance() -> Address {
    Address::new("governance")
}

fn default_beneficiary() -> Address {
    Address::new("beneficiary")
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// Reject configurations the host cannot run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        self.fees
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        self.governance
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        self.log_format()?;
        if self.staking.early_exit_penalty_pct > 100 {
            return Err(NodeError::Config(format!(
                "early_exit_penalty_pct {} exceeds 100",
                self.staking.early_exit_penalty_pct
            )));
        }

        let a = &self.accounts;
        let distinct: HashSet<&Address> = [
            &a.fee_router,
            &a.staking_pool,
            &a.membership_pool,
            &a.governance,
            &a.beneficiary,
        ]
        .into_iter()
        .collect();
        if distinct.len() != 5 {
            return Err(NodeError::Config(
                "fee_router, pools, governance and beneficiary must be distinct accounts".into(),
            ));
        }

        let mut seen = HashSet::new();
        for holder in &self.genesis.privileged {
            if !seen.insert(holder) {
                return Err(NodeError::Config(format!(
                    "privileged holder {holder} listed twice"
                )));
            }
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            fees: FeeSchedule::default(),
            staking: StakingConfig::default(),
            governance: GovernanceParams::default(),
            accounts: AccountsConfig::default(),
            genesis: GenesisConfig::default(),
        }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            minimum_lock_secs: default_minimum_lock_secs(),
            early_exit_penalty_pct: default_early_exit_penalty_pct(),
            lock_transfer_policy: LockTransferPolicy::default(),
        }
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            fee_router: default_fee_router(),
            staking_pool: default_staking_pool(),
            membership_pool: default_membership_pool(),
            governance: default_governance(),
            beneficiary: default_beneficiary(),
        }
    }
}
