//! Fundamental types for the revshare engines.
//!
//! Everything the weight ledger, reward distributor, value ledger and
//! governance engine have in common lives here: account addresses,
//! timestamps, description hashes, the fixed-point helpers used by every
//! settlement path, and the shared error taxonomy.

pub mod address;
pub mod error;
pub mod hash;
pub mod math;
pub mod time;

pub use address::Address;
pub use error::ErrorKind;
pub use hash::DescriptionHash;
pub use math::SCALE;
pub use time::Timestamp;
