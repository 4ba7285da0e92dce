//! In-memory value ledger with a fee hook.

use std::collections::{HashMap, HashSet};

use crate::error::LedgerError;
use crate::fees::{FeeSchedule, FeeSplit, PoolId, RevenueEvent};
use crate::ledger::{TransferReceipt, ValueLedger};
use revshare_types::Address;
use serde::{Deserialize, Serialize};

/// Where the pieces of a withheld fee are credited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRoutes {
    pub staking_pool: Address,
    pub membership_pool: Address,
    pub beneficiary: Address,
}

/// Balances held in process memory.
///
/// Pool accounts are always fee-exempt so that deposits into and payouts
/// from a pool move exact amounts. Revenue credited to a pool account is
/// queued as a [`RevenueEvent`]; the host drains the queue with
/// [`take_revenue`](MemoryLedger::take_revenue) and notifies the pools.
pub struct MemoryLedger {
    balances: HashMap<Address, u128>,
    exempt: HashSet<Address>,
    schedule: FeeSchedule,
    routes: FeeRoutes,
    pending_revenue: Vec<RevenueEvent>,
    total_supply: u128,
    total_fees: u128,
}

impl MemoryLedger {
    pub fn new(schedule: FeeSchedule, routes: FeeRoutes) -> Result<Self, LedgerError> {
        schedule.validate()?;
        let mut exempt = HashSet::new();
        exempt.insert(routes.staking_pool.clone());
        exempt.insert(routes.membership_pool.clone());
        Ok(Self {
            balances: HashMap::new(),
            exempt,
            schedule,
            routes,
            pending_revenue: Vec::new(),
            total_supply: 0,
            total_fees: 0,
        })
    }

    /// Create new value in `account` (genesis funding).
    pub fn mint(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticFault)?;
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticFault)?;
        self.balances.insert(account.clone(), balance);
        self.total_supply = supply;
        Ok(())
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Sum of every fee withheld so far.
    pub fn total_fees(&self) -> u128 {
        self.total_fees
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    pub fn set_fee_per_mille(&mut self, fee_per_mille: u32) -> Result<(), LedgerError> {
        let schedule = FeeSchedule {
            fee_per_mille,
            ..self.schedule.clone()
        };
        schedule.validate()?;
        tracing::info!(
            old = self.schedule.fee_per_mille,
            new = fee_per_mille,
            "transfer fee updated"
        );
        self.schedule = schedule;
        Ok(())
    }

    pub fn is_exempt(&self, account: &Address) -> bool {
        self.exempt.contains(account)
    }

    /// Exclude `account` from (or include it in) fee collection.
    /// Pool accounts stay exempt regardless.
    pub fn set_exempt(&mut self, account: &Address, exempt: bool) {
        if exempt {
            self.exempt.insert(account.clone());
        } else if *account != self.routes.staking_pool && *account != self.routes.membership_pool {
            self.exempt.remove(account);
        }
    }

    pub fn beneficiary(&self) -> &Address {
        &self.routes.beneficiary
    }

    pub fn set_beneficiary(&mut self, beneficiary: Address) {
        tracing::info!(old = %self.routes.beneficiary, new = %beneficiary, "beneficiary reassigned");
        self.routes.beneficiary = beneficiary;
    }

    pub fn routes(&self) -> &FeeRoutes {
        &self.routes
    }

    /// Drain the revenue queued for the pools since the last call.
    pub fn take_revenue(&mut self) -> Vec<RevenueEvent> {
        std::mem::take(&mut self.pending_revenue)
    }

    fn charges_fee(&self, from: &Address, to: &Address) -> bool {
        !self.exempt.contains(from) && !self.exempt.contains(to)
    }

    fn credit(
        staged: &mut HashMap<Address, u128>,
        balances: &HashMap<Address, u128>,
        account: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        let current = match staged.get(account) {
            Some(b) => *b,
            None => balances.get(account).copied().unwrap_or(0),
        };
        let next = current
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticFault)?;
        staged.insert(account.clone(), next);
        Ok(())
    }
}

impl ValueLedger for MemoryLedger {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferReceipt, LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                needed: amount,
                available,
            });
        }

        let fee = if self.charges_fee(from, to) {
            self.schedule.fee_for(amount)?
        } else {
            0
        };
        let split = if fee > 0 {
            self.schedule.split(fee)?
        } else {
            FeeSplit::default()
        };
        let received = amount - fee;

        // Stage every balance change so an overflow anywhere leaves no trace.
        let mut staged: HashMap<Address, u128> = HashMap::new();
        staged.insert(from.clone(), available - amount);
        Self::credit(&mut staged, &self.balances, to, received)?;
        Self::credit(&mut staged, &self.balances, &self.routes.staking_pool, split.staking)?;
        Self::credit(&mut staged, &self.balances, &self.routes.membership_pool, split.membership)?;
        Self::credit(&mut staged, &self.balances, &self.routes.beneficiary, split.beneficiary)?;
        let total_fees = self
            .total_fees
            .checked_add(fee)
            .ok_or(LedgerError::ArithmeticFault)?;

        self.balances.extend(staged);
        self.total_fees = total_fees;
        if split.staking > 0 {
            self.pending_revenue.push(RevenueEvent {
                pool: PoolId::Staking,
                amount: split.staking,
            });
        }
        if split.membership > 0 {
            self.pending_revenue.push(RevenueEvent {
                pool: PoolId::Membership,
                amount: split.membership,
            });
        }
        if fee > 0 {
            tracing::debug!(%from, %to, amount, fee, "fee withheld");
        }

        Ok(TransferReceipt {
            sent: amount,
            received,
            fee,
        })
    }
}
