//! Transfer fee schedule and its split between reward pools and beneficiary.

use crate::error::LedgerError;
use revshare_types::math::{per_mille_of, percent_of};
use serde::{Deserialize, Serialize};

/// Reward pools that receive a cut of every fee.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolId {
    /// The stake-weighted pool.
    Staking,
    /// The membership-weighted pool (one weight per privileged holder).
    Membership,
}

/// Revenue routed to a pool by the fee hook, waiting to be notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevenueEvent {
    pub pool: PoolId,
    pub amount: u128,
}

/// How one fee is divided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub staking: u128,
    pub membership: u128,
    pub beneficiary: u128,
}

impl FeeSplit {
    pub fn total(&self) -> u128 {
        self.staking + self.membership + self.beneficiary
    }
}

/// Fee parameters.
///
/// `fee_per_mille` of each ordinary transfer is withheld. `reward_share_pct`
/// of the fee goes to the reward pools, of which `staking_split_pct` goes to
/// the staking pool and the rest to the membership pool. Everything else
/// goes to the beneficiary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub fee_per_mille: u32,
    pub reward_share_pct: u32,
    pub staking_split_pct: u32,
}

impl FeeSchedule {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.fee_per_mille > 1000 {
            return Err(LedgerError::InvalidFeeSchedule(format!(
                "fee_per_mille {} exceeds 1000",
                self.fee_per_mille
            )));
        }
        if self.reward_share_pct > 100 || self.staking_split_pct > 100 {
            return Err(LedgerError::InvalidFeeSchedule(
                "percentages must be within 0..=100".into(),
            ));
        }
        Ok(())
    }

    /// Fee withheld from a transfer of `amount`.
    pub fn fee_for(&self, amount: u128) -> Result<u128, LedgerError> {
        per_mille_of(amount, self.fee_per_mille).ok_or(LedgerError::ArithmeticFault)
    }

    /// Divide a withheld fee. The parts always sum to `fee`.
    pub fn split(&self, fee: u128) -> Result<FeeSplit, LedgerError> {
        let rewards = percent_of(fee, self.reward_share_pct).ok_or(LedgerError::ArithmeticFault)?;
        let staking =
            percent_of(rewards, self.staking_split_pct).ok_or(LedgerError::ArithmeticFault)?;
        Ok(FeeSplit {
            staking,
            membership: rewards - staking,
            beneficiary: fee - rewards,
        })
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            fee_per_mille: 40,
            reward_share_pct: 50,
            staking_split_pct: 85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_split_of_a_billion_unit_transfer() {
        let schedule = FeeSchedule::default();
        let fee = schedule.fee_for(1_000_000_000).unwrap();
        assert_eq!(fee, 40_000_000);
        let split = schedule.split(fee).unwrap();
        assert_eq!(split.staking, 17_000_000);
        assert_eq!(split.membership, 3_000_000);
        assert_eq!(split.beneficiary, 20_000_000);
        assert_eq!(split.total(), fee);
    }

    #[test]
    fn ten_percent_fee() {
        let schedule = FeeSchedule {
            fee_per_mille: 100,
            ..FeeSchedule::default()
        };
        let fee = schedule.fee_for(1_000_000_000).unwrap();
        assert_eq!(schedule.split(fee).unwrap().staking, 42_500_000);
    }

    #[test]
    fn small_fees_round_toward_beneficiary_and_membership() {
        let schedule = FeeSchedule::default();
        // 600 * 4% = 24 -> 12 to pools -> 10 staking / 2 membership.
        let split = schedule.split(schedule.fee_for(600).unwrap()).unwrap();
        assert_eq!(split, FeeSplit { staking: 10, membership: 2, beneficiary: 12 });
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let bad = FeeSchedule {
            fee_per_mille: 1001,
            ..FeeSchedule::default()
        };
        assert!(bad.validate().is_err());
        let bad = FeeSchedule {
            staking_split_pct: 101,
            ..FeeSchedule::default()
        };
        assert!(bad.validate().is_err());
        assert!(FeeSchedule::default().validate().is_ok());
    }
}
