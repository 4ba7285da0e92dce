//! Revshare host: wires the value ledger, the two reward pools, the
//! privilege registry and governance into one deterministic state machine.
//!
//! The host:
//! - Routes the pool portions of every transfer fee into the staking and
//!   membership distributors
//! - Exposes staking, claiming and stake-claim transfers
//! - Runs proposals and applies passed ones to the registry, the
//!   membership pool and the fee beneficiary
//! - Emits [`HostEvent`]s to subscribers after each committed operation

pub mod config;
pub mod enactor;
pub mod error;
pub mod event;
pub mod logging;
pub mod node;

pub use config::{AccountsConfig, GenesisConfig, NodeConfig, StakingConfig};
pub use enactor::Enactor;
pub use error::NodeError;
pub use event::{EventBus, HostEvent};
pub use logging::{init_logging, LogFormat};
pub use node::{NodeSummary, PoolSummary, RevshareNode};
