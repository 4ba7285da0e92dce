//! Accounting shares representing stake claims, minted 1:1 with principal.

use crate::error::RewardsError;
use revshare_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShareToken {
    balances: HashMap<Address, u128>,
    total_supply: u128,
}

impl ShareToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn mint(&mut self, holder: &Address, amount: u128) -> Result<(), RewardsError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(RewardsError::ArithmeticFault)?;
        let balance = self
            .balance_of(holder)
            .checked_add(amount)
            .ok_or(RewardsError::ArithmeticFault)?;
        self.balances.insert(holder.clone(), balance);
        self.total_supply = supply;
        Ok(())
    }

    pub fn burn(&mut self, holder: &Address, amount: u128) -> Result<(), RewardsError> {
        let available = self.balance_of(holder);
        if available < amount {
            return Err(RewardsError::InsufficientShares {
                needed: amount,
                available,
            });
        }
        self.set_balance(holder, available - amount);
        self.total_supply -= amount;
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), RewardsError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(RewardsError::InsufficientShares {
                needed: amount,
                available,
            });
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(RewardsError::ArithmeticFault)?;
        self.set_balance(from, available - amount);
        self.set_balance(to, credited);
        Ok(())
    }

    fn set_balance(&mut self, holder: &Address, balance: u128) {
        if balance == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(holder.clone(), balance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_transfer_burn() {
        let mut shares = ShareToken::new();
        let a = Address::new("a");
        let b = Address::new("b");
        shares.mint(&a, 100).unwrap();
        shares.transfer(&a, &b, 30).unwrap();
        assert_eq!(shares.balance_of(&a), 70);
        assert_eq!(shares.balance_of(&b), 30);
        shares.burn(&b, 30).unwrap();
        assert_eq!(shares.total_supply(), 70);
        assert!(matches!(
            shares.burn(&b, 1),
            Err(RewardsError::InsufficientShares { needed: 1, available: 0 })
        ));
    }
}
