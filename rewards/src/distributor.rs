//! The reward distributor.

use std::collections::HashMap;

use crate::config::{DistributorConfig, LockTransferPolicy, WeightSource};
use crate::error::RewardsError;
use crate::pool::{DepositOutcome, PoolState};
use crate::shares::ShareToken;
use crate::stake::{Stake, UnstakeReceipt};
use revshare_ledger::ValueLedger;
use revshare_types::math::{mul_div, percent_of};
use revshare_types::{Address, Timestamp};
use revshare_weights::WeightLedger;
use serde::{Deserialize, Serialize};

/// Per-participant settlement record.
///
/// `credited` holds reward settled at an earlier weight and not yet paid;
/// `reward_debt` is the accumulator value at the last settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardAccount {
    pub reward_debt: u128,
    pub credited: u128,
}

/// Lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTotals {
    pub notified: u128,
    pub paid: u128,
    pub forfeited: u128,
}

/// Streams deposited revenue to weighted participants.
///
/// Deposits are O(1): they only advance the pool accumulator. Each
/// participant's share is settled lazily, and always before their weight
/// changes, so nobody can collect reward for a window in which they did
/// not hold weight.
///
/// Every operation validates and computes its full effect first, moves
/// value through the ledger second, and commits its own state last. A
/// rejected call leaves the distributor untouched.
pub struct RewardDistributor {
    config: DistributorConfig,
    weights: WeightLedger,
    pool: PoolState,
    accounts: HashMap<Address, RewardAccount>,
    stakes: HashMap<Address, Stake>,
    shares: ShareToken,
    totals: PoolTotals,
}

impl RewardDistributor {
    pub fn new(config: DistributorConfig) -> Result<Self, RewardsError> {
        config.validate()?;
        Ok(Self {
            config,
            weights: WeightLedger::new(),
            pool: PoolState::new(),
            accounts: HashMap::new(),
            stakes: HashMap::new(),
            shares: ShareToken::new(),
            totals: PoolTotals::default(),
        })
    }

    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    pub fn weight(&self, addr: &Address) -> u128 {
        self.weights.weight(addr)
    }

    pub fn total_weight(&self) -> u128 {
        self.weights.total()
    }

    pub fn participants(&self) -> usize {
        self.weights.len()
    }

    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn totals(&self) -> PoolTotals {
        self.totals
    }

    /// Revenue held back because it arrived while the pool had no weight.
    pub fn undistributed(&self) -> u128 {
        self.pool.undistributed
    }

    pub fn stake_of(&self, addr: &Address) -> Option<&Stake> {
        self.stakes.get(addr)
    }

    pub fn shares(&self) -> &ShareToken {
        &self.shares
    }

    pub fn account(&self, addr: &Address) -> RewardAccount {
        self.accounts.get(addr).copied().unwrap_or_default()
    }

    /// Re-derive the total weight from the per-participant table.
    pub fn verify(&self) -> Result<(), RewardsError> {
        self.weights.verify()?;
        Ok(())
    }

    /// Reward `addr` could claim right now.
    pub fn earned(&self, addr: &Address) -> Result<u128, RewardsError> {
        Ok(self.settled(addr)?.credited)
    }

    /// Deposit revenue. Only the pool account and configured depositors
    /// may call this.
    pub fn notify(
        &mut self,
        caller: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<DepositOutcome, RewardsError> {
        if !self.config.is_depositor(caller) {
            return Err(RewardsError::Unauthorized(caller.to_string()));
        }
        if amount == 0 {
            return Ok(DepositOutcome::Noop);
        }
        let notified = self
            .totals
            .notified
            .checked_add(amount)
            .ok_or(RewardsError::ArithmeticFault)?;
        let (mut pool, outcome) = self.pool.deposit(amount, self.weights.total())?;
        pool.last_deposit = Some(now);

        self.pool = pool;
        self.totals.notified = notified;
        match outcome {
            DepositOutcome::Retained { undistributed, .. } => {
                tracing::info!(
                    source = self.config.source.as_str(),
                    amount,
                    undistributed,
                    "revenue retained: pool has no weight"
                );
            }
            DepositOutcome::Distributed {
                acc_reward_per_weight,
                ..
            } => {
                tracing::debug!(
                    source = self.config.source.as_str(),
                    amount,
                    acc_reward_per_weight,
                    "revenue distributed"
                );
            }
            DepositOutcome::Noop => {}
        }
        Ok(outcome)
    }

    /// Pay out everything `caller` has earned. Returns the amount paid;
    /// zero is a successful no-op.
    pub fn claim<L: ValueLedger>(
        &mut self,
        caller: &Address,
        now: Timestamp,
        ledger: &mut L,
    ) -> Result<u128, RewardsError> {
        if let Some(stake) = self.stakes.get(caller) {
            if stake.is_locked(now) {
                return Err(RewardsError::LockNotEnded {
                    ends_at: stake.lock_ends_at,
                });
            }
        }
        let mut account = self.settled(caller)?;
        let reward = account.credited;
        if reward == 0 {
            return Ok(0);
        }
        let paid = self
            .totals
            .paid
            .checked_add(reward)
            .ok_or(RewardsError::ArithmeticFault)?;

        ledger.transfer(&self.config.pool_account, caller, reward)?;

        account.credited = 0;
        self.store_account(caller, account);
        self.totals.paid = paid;
        tracing::info!(%caller, reward, "reward claimed");
        Ok(reward)
    }

    /// Lock `amount` from `caller` into the pool.
    pub fn stake<L: ValueLedger>(
        &mut self,
        caller: &Address,
        amount: u128,
        now: Timestamp,
        ledger: &mut L,
    ) -> Result<Stake, RewardsError> {
        self.require_source(WeightSource::Stake)?;
        if amount == 0 {
            return Err(RewardsError::ZeroAmount);
        }
        if self.stakes.contains_key(caller) {
            return Err(RewardsError::AlreadyStaked(caller.to_string()));
        }
        let lock_ends_at = now
            .checked_add_secs(self.config.minimum_lock_secs)
            .ok_or(RewardsError::ArithmeticFault)?;
        self.weights.total_after(caller, amount)?;
        let account = self.settled(caller)?;

        let receipt = ledger.transfer(caller, &self.config.pool_account, amount)?;
        let principal = receipt.received;

        self.weights.set_weight(caller, principal)?;
        self.shares.mint(caller, principal)?;
        self.store_account(caller, account);
        let stake = Stake {
            address: caller.clone(),
            amount: principal,
            lock_ends_at,
        };
        self.stakes.insert(caller.clone(), stake.clone());
        tracing::info!(
            %caller,
            amount = principal,
            lock_ends_at = %lock_ends_at,
            total_weight = self.weights.total(),
            "stake locked"
        );
        Ok(stake)
    }

    /// Return `caller`'s principal together with earned reward.
    ///
    /// Before the lock ends, the configured share of the reward is forfeited
    /// and redeposited for the remaining participants. Principal is always
    /// returned in full.
    pub fn unstake<L: ValueLedger>(
        &mut self,
        caller: &Address,
        now: Timestamp,
        ledger: &mut L,
    ) -> Result<UnstakeReceipt, RewardsError> {
        self.require_source(WeightSource::Stake)?;
        let stake = self
            .stakes
            .get(caller)
            .cloned()
            .ok_or_else(|| RewardsError::NothingStaked(caller.to_string()))?;

        let reward = self.settled(caller)?.credited;
        let forfeited = if stake.is_locked(now) {
            percent_of(reward, self.config.early_exit_penalty_pct)
                .ok_or(RewardsError::ArithmeticFault)?
        } else {
            0
        };
        let reward_paid = reward - forfeited;
        let remaining_weight = self.weights.total_after(caller, 0)?;
        let (pool, _) = self.pool.deposit(forfeited, remaining_weight)?;
        let payout = stake
            .amount
            .checked_add(reward_paid)
            .ok_or(RewardsError::ArithmeticFault)?;
        let totals = PoolTotals {
            paid: self
                .totals
                .paid
                .checked_add(reward_paid)
                .ok_or(RewardsError::ArithmeticFault)?,
            forfeited: self
                .totals
                .forfeited
                .checked_add(forfeited)
                .ok_or(RewardsError::ArithmeticFault)?,
            ..self.totals
        };

        ledger.transfer(&self.config.pool_account, caller, payout)?;

        self.weights.set_weight(caller, 0)?;
        self.shares.burn(caller, stake.amount)?;
        self.stakes.remove(caller);
        self.accounts.remove(caller);
        self.pool = pool;
        self.totals = totals;
        if forfeited > 0 {
            tracing::info!(%caller, forfeited, "early exit penalty applied");
        }
        tracing::info!(
            %caller,
            principal = stake.amount,
            reward = reward_paid,
            "stake withdrawn"
        );
        Ok(UnstakeReceipt {
            principal: stake.amount,
            reward: reward_paid,
            forfeited,
        })
    }

    /// Move `amount` of `from`'s stake claim to `to`.
    ///
    /// Both sides are settled first. The matching fraction of `from`'s
    /// unpaid reward travels with the claim. A recipient that already
    /// stakes keeps one merged stake locked until the later of the two lock
    /// ends. Principal never leaves the pool account.
    pub fn transfer_stake(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), RewardsError> {
        self.require_source(WeightSource::Stake)?;
        if amount == 0 {
            return Err(RewardsError::ZeroAmount);
        }
        if from == to {
            return Err(RewardsError::SelfTransfer);
        }
        let sender = self
            .stakes
            .get(from)
            .cloned()
            .ok_or_else(|| RewardsError::NothingStaked(from.to_string()))?;
        if sender.amount < amount {
            return Err(RewardsError::InsufficientShares {
                needed: amount,
                available: sender.amount,
            });
        }
        if sender.is_locked(now)
            && self.config.lock_transfer_policy == LockTransferPolicy::RejectWhileLocked
        {
            return Err(RewardsError::LockNotEnded {
                ends_at: sender.lock_ends_at,
            });
        }
        let recipient = self.stakes.get(to).cloned();

        let mut from_account = self.settled(from)?;
        let mut to_account = self.settled(to)?;
        let moved_credit = mul_div(from_account.credited, amount, sender.amount)
            .ok_or(RewardsError::ArithmeticFault)?;
        from_account.credited -= moved_credit;
        to_account.credited = to_account
            .credited
            .checked_add(moved_credit)
            .ok_or(RewardsError::ArithmeticFault)?;

        let from_amount = sender.amount - amount;
        let to_amount = recipient
            .as_ref()
            .map_or(0, |s| s.amount)
            .checked_add(amount)
            .ok_or(RewardsError::ArithmeticFault)?;
        let lock_ends_at = recipient
            .as_ref()
            .map_or(sender.lock_ends_at, |s| s.lock_ends_at.max(sender.lock_ends_at));

        self.shares.transfer(from, to, amount)?;
        self.weights.set_weight(from, from_amount)?;
        self.weights.set_weight(to, to_amount)?;
        if from_amount == 0 {
            self.stakes.remove(from);
        } else {
            self.stakes.insert(
                from.clone(),
                Stake {
                    amount: from_amount,
                    ..sender
                },
            );
        }
        self.stakes.insert(
            to.clone(),
            Stake {
                address: to.clone(),
                amount: to_amount,
                lock_ends_at,
            },
        );
        self.store_account(from, from_account);
        self.store_account(to, to_account);
        tracing::info!(%from, %to, amount, moved_credit, "stake claim transferred");
        Ok(())
    }

    /// Add or remove `member` from a membership pool. Returns whether the
    /// weight changed. A removed member keeps what they earned so far.
    pub fn set_member(
        &mut self,
        caller: &Address,
        member: &Address,
        active: bool,
    ) -> Result<bool, RewardsError> {
        self.require_source(WeightSource::Membership)?;
        if self.config.registry_authority.as_ref() != Some(caller) {
            return Err(RewardsError::Unauthorized(caller.to_string()));
        }
        let target = u128::from(active);
        if self.weights.weight(member) == target {
            return Ok(false);
        }
        self.weights.total_after(member, target)?;
        let account = self.settled(member)?;

        self.weights.set_weight(member, target)?;
        self.store_account(member, account);
        tracing::info!(%member, active, members = self.weights.len(), "membership weight updated");
        Ok(true)
    }

    /// Change the lock applied to stakes created from now on.
    pub fn set_minimum_lock_period(
        &mut self,
        caller: &Address,
        secs: u64,
    ) -> Result<(), RewardsError> {
        if *caller != self.config.owner {
            return Err(RewardsError::Unauthorized(caller.to_string()));
        }
        tracing::info!(
            old = self.config.minimum_lock_secs,
            new = secs,
            "minimum lock period updated"
        );
        self.config.minimum_lock_secs = secs;
        Ok(())
    }

    fn require_source(&self, source: WeightSource) -> Result<(), RewardsError> {
        if self.config.source != source {
            return Err(RewardsError::WrongWeightSource(self.config.source.as_str()));
        }
        Ok(())
    }

    /// `addr`'s account as it would look if settled at the current
    /// accumulator value.
    fn settled(&self, addr: &Address) -> Result<RewardAccount, RewardsError> {
        let account = self.account(addr);
        let pending = self
            .pool
            .pending(self.weights.weight(addr), account.reward_debt)?;
        Ok(RewardAccount {
            reward_debt: self.pool.acc_reward_per_weight,
            credited: account
                .credited
                .checked_add(pending)
                .ok_or(RewardsError::ArithmeticFault)?,
        })
    }

    fn store_account(&mut self, addr: &Address, account: RewardAccount) {
        if account.credited == 0 && self.weights.weight(addr) == 0 {
            self.accounts.remove(addr);
        } else {
            self.accounts.insert(addr.clone(), account);
        }
    }
}
