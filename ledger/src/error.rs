use revshare_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: u128,
        available: u128,
    },

    #[error("invalid fee schedule: {0}")]
    InvalidFeeSchedule(String),

    #[error("arithmetic overflow in ledger accounting")]
    ArithmeticFault,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientFunds,
            Self::InvalidFeeSchedule(_) => ErrorKind::InvalidParameters,
            Self::ArithmeticFault => ErrorKind::ArithmeticFault,
        }
    }
}
