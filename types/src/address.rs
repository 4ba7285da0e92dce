//! Account address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account known to the value ledger.
///
/// Participants, pool accounts, the vote escrow and the fee router are all
/// plain addresses; the engines never interpret the contents.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string is empty.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(!s.is_empty(), "address must not be empty");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_raw() {
        let a = Address::new("alice");
        assert_eq!(a.to_string(), "alice");
        assert_eq!(a.as_str(), "alice");
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn empty_address_panics() {
        let _ = Address::new("");
    }
}
