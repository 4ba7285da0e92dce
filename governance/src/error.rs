use crate::proposal::ProposalId;
use revshare_ledger::LedgerError;
use revshare_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("{0} is not allowed to create proposals")]
    Unauthorized(String),

    #[error("invalid proposal parameters: {0}")]
    InvalidParameters(String),

    #[error("voting on proposal {0} is over")]
    VotingOver(ProposalId),

    #[error("voting on proposal {0} is not over")]
    VotingNotOver(ProposalId),

    #[error("proposal {0} is already resolved")]
    AlreadyResolved(ProposalId),

    #[error("{0} has already voted on this proposal")]
    AlreadyVoted(String),

    #[error("insufficient funds to vote: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("{0} has nothing to withdraw")]
    NothingToWithdraw(String),

    #[error("outcome dispatch failed: {0}")]
    Dispatch(String),

    #[error("arithmetic overflow in vote tally")]
    ArithmeticFault,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::ProposalNotFound(_) | Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::VotingOver(_)
            | Self::VotingNotOver(_)
            | Self::AlreadyResolved(_)
            | Self::AlreadyVoted(_)
            | Self::Dispatch(_) => ErrorKind::InvalidState,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::NothingToWithdraw(_) => ErrorKind::NothingToClaim,
            Self::ArithmeticFault => ErrorKind::ArithmeticFault,
            Self::Ledger(e) => e.kind(),
        }
    }
}

/// Errors from the privileged-status registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0} is already privileged")]
    AlreadyPrivileged(String),

    #[error("{0} is not privileged")]
    NotPrivileged(String),

    #[error("{0} may not change the registry")]
    Unauthorized(String),

    #[error("registry is already initialized")]
    AlreadyInitialized,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::AlreadyPrivileged(_) | Self::NotPrivileged(_) | Self::AlreadyInitialized => {
                ErrorKind::InvalidState
            }
        }
    }
}
