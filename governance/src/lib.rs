//! Token-weighted governance.
//!
//! Privileged holders open proposals to grant or revoke privileged status,
//! or to reassign the fee beneficiary. Participants vote by locking value
//! in escrow (one vote per address per proposal). After the deadline anyone
//! may finalize: quorum (`min_voters`) and an inclusive for-share threshold
//! (`min_percentage`) decide, a passed proposal is dispatched to the host,
//! and every voter can then withdraw their locked value.

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod params;
pub mod proposal;
pub mod registry;
pub mod vote;

pub use dispatch::{DispatchError, OutcomeDispatcher};
pub use engine::GovernanceEngine;
pub use error::{GovernanceError, RegistryError};
pub use params::GovernanceParams;
pub use proposal::{Outcome, Proposal, ProposalId, ProposalKind, ProposalRequest, ProposalStats};
pub use registry::{PrivilegeRegistry, PrivilegeSet};
pub use vote::{Choice, VoteRecord};
