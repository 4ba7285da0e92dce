//! Applying a passed proposal.

use revshare_types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The target declined; the proposal still resolves, as not applied.
    #[error("refused: {0}")]
    Refused(String),

    /// The action could not be carried out; finalization is aborted.
    #[error("failed: {0}")]
    Failed(String),
}

/// Side effects a passed proposal can have. Implemented by the host,
/// which owns the registry, the membership pool and the ledger.
pub trait OutcomeDispatcher {
    fn grant_privilege(&mut self, subject: &Address) -> Result<(), DispatchError>;

    fn revoke_privilege(&mut self, subject: &Address) -> Result<(), DispatchError>;

    fn reassign_beneficiary(&mut self, subject: &Address) -> Result<(), DispatchError>;
}
