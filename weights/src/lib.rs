//! Weight ledger: who holds how much of a reward pool.
//!
//! Weights are non-negative integers: stake size for the staking pool, a flat
//! 1 per member for the membership pool. The ledger is pure bookkeeping; it
//! knows nothing about rewards. Whoever mutates it is responsible for
//! settling accrued reward at the old weight first.

pub mod error;
pub mod ledger;

pub use error::WeightError;
pub use ledger::{WeightChange, WeightLedger};
