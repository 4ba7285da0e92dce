//! Timestamp type used by every time-locked transition.
//!
//! Timestamps are Unix epoch seconds supplied by the host. The engines never
//! read a clock themselves, so replaying the same calls with the same
//! timestamps reproduces the same state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward, or `None` on overflow.
    pub fn checked_add_secs(&self, secs: u64) -> Option<Self> {
        self.0.checked_add(secs).map(Self)
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_expired_is_inclusive() {
        let t = Timestamp::new(100);
        assert!(!t.has_expired(50, Timestamp::new(149)));
        assert!(t.has_expired(50, Timestamp::new(150)));
    }

    #[test]
    fn checked_add_overflows_to_none() {
        assert!(Timestamp::new(u64::MAX).checked_add_secs(1).is_none());
        assert_eq!(Timestamp::new(1).checked_add_secs(2), Some(Timestamp::new(3)));
    }
}
