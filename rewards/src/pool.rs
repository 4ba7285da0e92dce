//! Pool accumulator state.
//!
//! A deposit of `amount` over `total_weight` raises the reward-per-weight
//! accumulator by `amount * SCALE / total_weight`. The division remainder is
//! kept in `carry` (in `SCALE` units) and added to the next deposit, so the
//! only value ever lost to rounding is the per-participant floor in
//! `earned`.

use crate::error::RewardsError;
use revshare_types::math::{mul_add_div_rem, mul_div};
use revshare_types::{Timestamp, SCALE};
use serde::{Deserialize, Serialize};

/// What a deposit did to the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepositOutcome {
    /// Zero amount; nothing changed.
    Noop,
    /// No weight in the pool; the amount was set aside.
    Retained { amount: u128, undistributed: u128 },
    /// The accumulator advanced. `amount` includes any previously retained
    /// revenue released by this deposit.
    Distributed { amount: u128, acc_reward_per_weight: u128 },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Reward per unit of weight ever deposited, scaled by `SCALE`.
    pub acc_reward_per_weight: u128,
    /// Sub-unit remainder of past deposits, scaled by `SCALE`.
    pub carry: u128,
    /// Revenue deposited while the pool had no weight.
    pub undistributed: u128,
    pub last_deposit: Option<Timestamp>,
}

impl PoolState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the state after depositing `amount` over `total_weight`,
    /// without mutating `self`.
    ///
    /// Retained revenue is released together with the first deposit that
    /// meets a non-zero total weight.
    pub fn deposit(
        &self,
        amount: u128,
        total_weight: u128,
    ) -> Result<(PoolState, DepositOutcome), RewardsError> {
        if amount == 0 {
            return Ok((self.clone(), DepositOutcome::Noop));
        }

        let mut next = self.clone();
        if total_weight == 0 {
            next.undistributed = self
                .undistributed
                .checked_add(amount)
                .ok_or(RewardsError::ArithmeticFault)?;
            let undistributed = next.undistributed;
            return Ok((next, DepositOutcome::Retained { amount, undistributed }));
        }

        let released = amount
            .checked_add(self.undistributed)
            .ok_or(RewardsError::ArithmeticFault)?;
        let (increment, carry) = mul_add_div_rem(released, SCALE, self.carry, total_weight)
            .ok_or(RewardsError::ArithmeticFault)?;
        next.carry = carry;
        next.undistributed = 0;
        next.acc_reward_per_weight = self
            .acc_reward_per_weight
            .checked_add(increment)
            .ok_or(RewardsError::ArithmeticFault)?;

        let acc_reward_per_weight = next.acc_reward_per_weight;
        Ok((
            next,
            DepositOutcome::Distributed {
                amount: released,
                acc_reward_per_weight,
            },
        ))
    }

    /// Reward owed to `weight` for the accumulator growth since `debt`.
    pub fn pending(&self, weight: u128, debt: u128) -> Result<u128, RewardsError> {
        let delta = self
            .acc_reward_per_weight
            .checked_sub(debt)
            .ok_or(RewardsError::ArithmeticFault)?;
        if weight == 0 || delta == 0 {
            return Ok(0);
        }
        mul_div(weight, delta, SCALE).ok_or(RewardsError::ArithmeticFault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_advances_accumulator() {
        let pool = PoolState::new();
        let (pool, outcome) = pool.deposit(1_000, 1_000).unwrap();
        assert_eq!(pool.acc_reward_per_weight, SCALE);
        assert_eq!(
            outcome,
            DepositOutcome::Distributed {
                amount: 1_000,
                acc_reward_per_weight: SCALE
            }
        );
        assert_eq!(pool.pending(600, 0).unwrap(), 600);
    }

    #[test]
    fn test_zero_weight_retains_then_releases() {
        let pool = PoolState::new();
        let (pool, outcome) = pool.deposit(500, 0).unwrap();
        assert_eq!(
            outcome,
            DepositOutcome::Retained {
                amount: 500,
                undistributed: 500
            }
        );
        assert_eq!(pool.acc_reward_per_weight, 0);

        let (pool, outcome) = pool.deposit(500, 10).unwrap();
        assert!(matches!(outcome, DepositOutcome::Distributed { amount: 1_000, .. }));
        assert_eq!(pool.undistributed, 0);
        assert_eq!(pool.pending(10, 0).unwrap(), 1_000);
    }

    #[test]
    fn test_remainder_is_carried() {
        let pool = PoolState::new();
        // 1 unit over 3 weight: each third is lost by itself, but three such
        // deposits add up to exactly one unit per weight.
        let (pool, _) = pool.deposit(1, 3).unwrap();
        let (pool, _) = pool.deposit(1, 3).unwrap();
        let (pool, _) = pool.deposit(1, 3).unwrap();
        assert_eq!(pool.carry, 0);
        assert_eq!(pool.pending(3, 0).unwrap(), 3);
    }

    #[test]
    fn test_zero_deposit_is_noop() {
        let pool = PoolState::new();
        let (next, outcome) = pool.deposit(0, 5).unwrap();
        assert_eq!(outcome, DepositOutcome::Noop);
        assert_eq!(next, pool);
    }

    #[test]
    fn test_token_scale_amounts() {
        // 18-decimal amounts: 5 000 tokens over 1 000 staked tokens, twice.
        let pool = PoolState::new();
        let (pool, _) = pool.deposit(5_000 * SCALE, 1_000 * SCALE).unwrap();
        let (pool, _) = pool.deposit(5_000 * SCALE, 1_000 * SCALE).unwrap();
        assert_eq!(pool.acc_reward_per_weight, 10 * SCALE);
        assert_eq!(pool.pending(1_000 * SCALE, 0).unwrap(), 10_000 * SCALE);
        assert_eq!(pool.pending(1, 0).unwrap(), 10);
    }

    #[test]
    fn test_overflow_is_reported() {
        let pool = PoolState::new();
        assert!(matches!(
            pool.deposit(u128::MAX, 1),
            Err(RewardsError::ArithmeticFault)
        ));
    }
}
