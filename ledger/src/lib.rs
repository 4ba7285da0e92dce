//! Value-transfer ledger.
//!
//! The reward and governance engines move value only through the
//! [`ValueLedger`] trait. [`MemoryLedger`] is the in-process implementation
//! used by the host: plain balances, a fee-exemption list, and a fee hook
//! that withholds a per-mille fee on ordinary transfers and queues the
//! pool portions as revenue for the reward distributors.

pub mod error;
pub mod fees;
pub mod ledger;
pub mod memory;

pub use error::LedgerError;
pub use fees::{FeeSchedule, FeeSplit, PoolId, RevenueEvent};
pub use ledger::{TransferReceipt, ValueLedger};
pub use memory::{FeeRoutes, MemoryLedger};
