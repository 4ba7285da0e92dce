//! Applies passed proposals to the registry, membership pool and ledger.

use revshare_governance::{DispatchError, OutcomeDispatcher, PrivilegeRegistry, PrivilegeSet, RegistryError};
use revshare_ledger::MemoryLedger;
use revshare_rewards::RewardDistributor;
use revshare_types::Address;

/// Borrowed view of the host state a proposal may change.
///
/// Privilege changes keep the registry and the membership pool in step:
/// the pool weight is changed first (it settles the member's accrued
/// reward), then the registry entry. Registry refusals are checked up
/// front so neither side is touched when the action cannot apply.
pub struct Enactor<'a> {
    pub authority: &'a Address,
    pub registry: &'a mut PrivilegeSet,
    pub membership: &'a mut RewardDistributor,
    pub ledger: &'a mut MemoryLedger,
}

fn registry_failure(err: RegistryError) -> DispatchError {
    match err {
        RegistryError::AlreadyPrivileged(_) | RegistryError::NotPrivileged(_) => {
            DispatchError::Refused(err.to_string())
        }
        RegistryError::Unauthorized(_) | RegistryError::AlreadyInitialized => {
            DispatchError::Failed(err.to_string())
        }
    }
}

impl OutcomeDispatcher for Enactor<'_> {
    fn grant_privilege(&mut self, subject: &Address) -> Result<(), DispatchError> {
        if self.registry.is_privileged(subject) {
            return Err(registry_failure(RegistryError::AlreadyPrivileged(
                subject.to_string(),
            )));
        }
        self.membership
            .set_member(self.authority, subject, true)
            .map_err(|e| DispatchError::Failed(e.to_string()))?;
        self.registry
            .grant(self.authority, subject)
            .map_err(registry_failure)
    }

    fn revoke_privilege(&mut self, subject: &Address) -> Result<(), DispatchError> {
        if !self.registry.is_privileged(subject) {
            return Err(registry_failure(RegistryError::NotPrivileged(
                subject.to_string(),
            )));
        }
        self.membership
            .set_member(self.authority, subject, false)
            .map_err(|e| DispatchError::Failed(e.to_string()))?;
        self.registry
            .revoke(self.authority, subject)
            .map_err(registry_failure)
    }

    fn reassign_beneficiary(&mut self, subject: &Address) -> Result<(), DispatchError> {
        self.ledger.set_beneficiary(subject.clone());
        Ok(())
    }
}
