//! Privileged-status registry.

use crate::error::RegistryError;
use revshare_types::Address;
use serde::{Deserialize, Serialize};

/// Tracks which addresses hold the proposal-grantable privilege.
pub trait PrivilegeRegistry {
    fn is_privileged(&self, addr: &Address) -> bool;

    /// Fails with `AlreadyPrivileged` if `addr` already holds the privilege.
    fn grant(&mut self, caller: &Address, addr: &Address) -> Result<(), RegistryError>;

    /// Fails with `NotPrivileged` if `addr` does not hold the privilege.
    fn revoke(&mut self, caller: &Address, addr: &Address) -> Result<(), RegistryError>;
}

/// In-memory registry keeping holders in grant order.
///
/// Bootstrapped once through [`init`](PrivilegeSet::init); afterwards only
/// `authority` may grant or revoke.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrivilegeSet {
    authority: Address,
    members: Vec<Address>,
    initialized: bool,
}

impl PrivilegeSet {
    pub fn new(authority: Address) -> Self {
        Self {
            authority,
            members: Vec::new(),
            initialized: false,
        }
    }

    /// Install the first holder. Callable once.
    pub fn init(&mut self, first: Address) -> Result<(), RegistryError> {
        if self.initialized {
            return Err(RegistryError::AlreadyInitialized);
        }
        self.initialized = true;
        tracing::info!(holder = %first, "privilege registry initialized");
        self.members.push(first);
        Ok(())
    }

    pub fn authority(&self) -> &Address {
        &self.authority
    }

    /// Holders in the order they were granted.
    pub fn members(&self) -> &[Address] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn check_caller(&self, caller: &Address) -> Result<(), RegistryError> {
        if *caller != self.authority {
            return Err(RegistryError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }
}

impl PrivilegeRegistry for PrivilegeSet {
    fn is_privileged(&self, addr: &Address) -> bool {
        self.members.contains(addr)
    }

    fn grant(&mut self, caller: &Address, addr: &Address) -> Result<(), RegistryError> {
        self.check_caller(caller)?;
        if self.is_privileged(addr) {
            return Err(RegistryError::AlreadyPrivileged(addr.to_string()));
        }
        self.members.push(addr.clone());
        tracing::info!(holder = %addr, holders = self.members.len(), "privilege granted");
        Ok(())
    }

    fn revoke(&mut self, caller: &Address, addr: &Address) -> Result<(), RegistryError> {
        self.check_caller(caller)?;
        let index = self
            .members
            .iter()
            .position(|m| m == addr)
            .ok_or_else(|| RegistryError::NotPrivileged(addr.to_string()))?;
        self.members.remove(index);
        tracing::info!(holder = %addr, holders = self.members.len(), "privilege revoked");
        Ok(())
    }
}
