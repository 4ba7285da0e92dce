//! Escrowed votes.

use crate::proposal::ProposalId;
use revshare_types::Address;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    For,
    Against,
}

/// One voter's position on one proposal. Only `withdrawn` ever changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub proposal_id: ProposalId,
    pub voter: Address,
    /// Value held in escrow: the amount sent minus the transfer fee.
    pub amount_locked: u128,
    pub choice: Choice,
    pub withdrawn: bool,
}
