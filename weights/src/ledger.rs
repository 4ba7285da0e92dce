//! Per-participant weights and the pool total.

use crate::error::WeightError;
use revshare_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of a weight update: the old and new value for one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightChange {
    pub old: u128,
    pub new: u128,
}

/// Authoritative record of each participant's weight.
///
/// Zero weights are not stored, so `len()` is the number of participants
/// that currently share in deposits. `total` is maintained incrementally
/// with checked arithmetic and can be re-derived with [`verify`].
///
/// [`verify`]: WeightLedger::verify
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WeightLedger {
    weights: HashMap<Address, u128>,
    total: u128,
}

impl WeightLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current weight of `addr` (0 if absent).
    pub fn weight(&self, addr: &Address) -> u128 {
        self.weights.get(addr).copied().unwrap_or(0)
    }

    /// Sum of all weights.
    pub fn total(&self) -> u128 {
        self.total
    }

    /// Number of participants with non-zero weight.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Compute the total that would result from setting `addr` to
    /// `new_weight`, without mutating anything.
    pub fn total_after(&self, addr: &Address, new_weight: u128) -> Result<u128, WeightError> {
        let old = self.weight(addr);
        self.total
            .checked_sub(old)
            .and_then(|t| t.checked_add(new_weight))
            .ok_or(WeightError::ArithmeticFault)
    }

    /// Replace the weight of `addr`.
    ///
    /// Fails without touching state if the new total would not fit.
    pub fn set_weight(
        &mut self,
        addr: &Address,
        new_weight: u128,
    ) -> Result<WeightChange, WeightError> {
        let old = self.weight(addr);
        let total = self.total_after(addr, new_weight)?;
        if new_weight == 0 {
            self.weights.remove(addr);
        } else {
            self.weights.insert(addr.clone(), new_weight);
        }
        self.total = total;
        Ok(WeightChange {
            old,
            new: new_weight,
        })
    }

    /// Recompute the sum of all weights and compare it against `total`.
    pub fn verify(&self) -> Result<(), WeightError> {
        let sum = self
            .weights
            .values()
            .try_fold(0u128, |acc, w| acc.checked_add(*w))
            .ok_or(WeightError::ArithmeticFault)?;
        if sum != self.total {
            return Err(WeightError::InvariantViolated {
                total: self.total,
                sum,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    #[test]
    fn set_weight_tracks_total() {
        let mut ledger = WeightLedger::new();
        ledger.set_weight(&addr("a"), 600).unwrap();
        ledger.set_weight(&addr("b"), 400).unwrap();
        assert_eq!(ledger.total(), 1000);
        assert_eq!(ledger.len(), 2);

        let change = ledger.set_weight(&addr("a"), 100).unwrap();
        assert_eq!(change, WeightChange { old: 600, new: 100 });
        assert_eq!(ledger.total(), 500);
        ledger.verify().unwrap();
    }

    #[test]
    fn zero_weight_removes_entry() {
        let mut ledger = WeightLedger::new();
        ledger.set_weight(&addr("a"), 5).unwrap();
        ledger.set_weight(&addr("a"), 0).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0);
        assert_eq!(ledger.weight(&addr("a")), 0);
    }

    #[test]
    fn overflow_leaves_state_untouched() {
        let mut ledger = WeightLedger::new();
        ledger.set_weight(&addr("a"), u128::MAX).unwrap();
        let err = ledger.set_weight(&addr("b"), 1).unwrap_err();
        assert_eq!(err, WeightError::ArithmeticFault);
        assert_eq!(ledger.weight(&addr("b")), 0);
        assert_eq!(ledger.total(), u128::MAX);
        ledger.verify().unwrap();
    }

    #[test]
    fn total_after_is_pure() {
        let mut ledger = WeightLedger::new();
        ledger.set_weight(&addr("a"), 10).unwrap();
        assert_eq!(ledger.total_after(&addr("a"), 3).unwrap(), 3);
        assert_eq!(ledger.total_after(&addr("b"), 3).unwrap(), 13);
        assert_eq!(ledger.total(), 10);
    }
}
