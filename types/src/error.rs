//! Error taxonomy shared across crates.
//!
//! Each crate keeps its own `thiserror` enum with precise variants; every
//! such enum maps onto one of these kinds so a host can decide uniformly
//! which failures are benign.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category an engine error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller lacks the required role or privilege.
    Unauthorized,
    /// Operation attempted outside its valid lifecycle phase.
    InvalidState,
    /// Caller-supplied values out of the allowed range.
    InvalidParameters,
    /// The value ledger rejected a required transfer.
    InsufficientFunds,
    /// Benign zero result: nothing to claim or withdraw.
    NothingToClaim,
    /// Checked integer arithmetic overflowed or underflowed.
    ArithmeticFault,
}

impl ErrorKind {
    /// Whether callers may treat this kind as a successful no-op.
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NothingToClaim)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidState => "invalid_state",
            Self::InvalidParameters => "invalid_parameters",
            Self::InsufficientFunds => "insufficient_funds",
            Self::NothingToClaim => "nothing_to_claim",
            Self::ArithmeticFault => "arithmetic_fault",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
