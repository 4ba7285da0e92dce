//! The value-ledger interface consumed by the engines.

use crate::error::LedgerError;
use revshare_types::Address;
use serde::{Deserialize, Serialize};

/// What a transfer actually did.
///
/// `received` is `sent - fee`; when either side is fee-exempt the fee is
/// zero and the two are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub sent: u128,
    pub received: u128,
    pub fee: u128,
}

impl TransferReceipt {
    pub fn fee_free(amount: u128) -> Self {
        Self {
            sent: amount,
            received: amount,
            fee: 0,
        }
    }
}

/// Account balances plus atomic transfer between them.
///
/// A transfer either moves the full amount (less any fee) or fails with
/// no effect. Engines call it only after every fallible check of their
/// own has passed.
pub trait ValueLedger {
    fn balance_of(&self, account: &Address) -> u128;

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferReceipt, LedgerError>;
}
