//! Reward-distributor errors.

use revshare_ledger::LedgerError;
use revshare_types::{ErrorKind, Timestamp};
use revshare_weights::WeightError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewardsError {
    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("{0} already has an active stake")]
    AlreadyStaked(String),

    #[error("{0} has no active stake")]
    NothingStaked(String),

    #[error("stake is locked until {ends_at}")]
    LockNotEnded { ends_at: Timestamp },

    #[error("insufficient stake shares: need {needed}, have {available}")]
    InsufficientShares { needed: u128, available: u128 },

    #[error("operation not supported by a {0} pool")]
    WrongWeightSource(&'static str),

    #[error("cannot transfer a stake to its own holder")]
    SelfTransfer,

    #[error("invalid distributor configuration: {0}")]
    InvalidConfig(String),

    #[error("arithmetic overflow in reward accounting")]
    ArithmeticFault,

    #[error(transparent)]
    Weights(#[from] WeightError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl RewardsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::ZeroAmount | Self::SelfTransfer | Self::InvalidConfig(_) => {
                ErrorKind::InvalidParameters
            }
            Self::AlreadyStaked(_)
            | Self::NothingStaked(_)
            | Self::LockNotEnded { .. }
            | Self::WrongWeightSource(_) => ErrorKind::InvalidState,
            Self::InsufficientShares { .. } => ErrorKind::InsufficientFunds,
            Self::ArithmeticFault => ErrorKind::ArithmeticFault,
            Self::Weights(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
        }
    }
}
