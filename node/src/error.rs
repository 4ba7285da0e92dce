use revshare_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] revshare_ledger::LedgerError),

    #[error("rewards error: {0}")]
    Rewards(#[from] revshare_rewards::RewardsError),

    #[error("governance error: {0}")]
    Governance(#[from] revshare_governance::GovernanceError),

    #[error("registry error: {0}")]
    Registry(#[from] revshare_governance::RegistryError),

    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),

    #[error("config error: {0}")]
    Config(String),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Rewards(e) => e.kind(),
            Self::Governance(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Config(_) => ErrorKind::InvalidParameters,
        }
    }
}
