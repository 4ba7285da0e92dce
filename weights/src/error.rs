//! Weight-ledger errors.

use revshare_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeightError {
    #[error("arithmetic overflow in total weight")]
    ArithmeticFault,

    #[error("total weight {total} does not match the sum of weights {sum}")]
    InvariantViolated { total: u128, sum: u128 },
}

impl WeightError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ArithmeticFault
    }
}
