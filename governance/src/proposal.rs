//! Governance proposals and their resolution.

use crate::error::GovernanceError;
use revshare_types::math::mul_div;
use revshare_types::{Address, DescriptionHash, Timestamp};
use serde::{Deserialize, Serialize};

/// Sequential proposal identifier, starting at 0.
pub type ProposalId = u64;

/// What a successful proposal does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    /// Grant privileged status to the subject.
    GrantPrivilege,
    /// Revoke the subject's privileged status.
    RevokePrivilege,
    /// Make the subject the fee beneficiary.
    ReassignBeneficiary,
}

impl ProposalKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GrantPrivilege => "grant_privilege",
            Self::RevokePrivilege => "revoke_privilege",
            Self::ReassignBeneficiary => "reassign_beneficiary",
        }
    }
}

/// Caller-supplied fields of a new proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub kind: ProposalKind,
    pub subject: Address,
    pub description_hash: DescriptionHash,
    pub duration_secs: u64,
    pub min_voters: u64,
    /// Required share of for-votes, 1..=100.
    pub min_percentage: u32,
}

/// How a proposal was resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum Outcome {
    /// Quorum and threshold met; the action was applied.
    Enacted,
    /// Quorum and threshold met, but the target refused the action
    /// (e.g. granting to an already privileged holder).
    NotApplied { reason: String },
    /// Fewer distinct voters than required.
    QuorumNotMet { voters: u64, required: u64 },
    /// For-share below the threshold (or no value voted at all).
    ThresholdNotMet {
        for_total: u128,
        against_total: u128,
        required: u32,
    },
}

impl Outcome {
    /// Whether the vote itself succeeded.
    pub fn passed(&self) -> bool {
        matches!(self, Self::Enacted | Self::NotApplied { .. })
    }
}

/// Result of counting a closed proposal, before dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed(Outcome),
}

/// Running tallies of a proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalStats {
    pub for_total: u128,
    pub against_total: u128,
    pub voter_count: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub kind: ProposalKind,
    pub subject: Address,
    pub proposer: Address,
    pub description_hash: DescriptionHash,
    pub created_at: Timestamp,
    pub duration_secs: u64,
    /// `created_at + duration_secs`; voting is open strictly before it.
    pub ends_at: Timestamp,
    pub min_voters: u64,
    pub min_percentage: u32,
    pub for_total: u128,
    pub against_total: u128,
    pub voter_count: u64,
    pub resolved: bool,
    pub outcome: Option<Outcome>,
}

impl Proposal {
    pub fn new(
        id: ProposalId,
        proposer: Address,
        request: ProposalRequest,
        now: Timestamp,
    ) -> Result<Self, GovernanceError> {
        let ends_at = now
            .checked_add_secs(request.duration_secs)
            .ok_or(GovernanceError::ArithmeticFault)?;
        Ok(Self {
            id,
            kind: request.kind,
            subject: request.subject,
            proposer,
            description_hash: request.description_hash,
            created_at: now,
            duration_secs: request.duration_secs,
            ends_at,
            min_voters: request.min_voters,
            min_percentage: request.min_percentage,
            for_total: 0,
            against_total: 0,
            voter_count: 0,
            resolved: false,
            outcome: None,
        })
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        !self.resolved && now < self.ends_at
    }

    pub fn stats(&self) -> ProposalStats {
        ProposalStats {
            for_total: self.for_total,
            against_total: self.against_total,
            voter_count: self.voter_count,
        }
    }

    /// Apply quorum then threshold.
    ///
    /// The threshold is `for * 100 / (for + against) >= min_percentage`,
    /// floored and inclusive. A proposal nobody put value behind fails it.
    pub fn verdict(&self) -> Result<Verdict, GovernanceError> {
        if self.voter_count < self.min_voters {
            return Ok(Verdict::Failed(Outcome::QuorumNotMet {
                voters: self.voter_count,
                required: self.min_voters,
            }));
        }
        let total = self
            .for_total
            .checked_add(self.against_total)
            .ok_or(GovernanceError::ArithmeticFault)?;
        let threshold_failed = Verdict::Failed(Outcome::ThresholdNotMet {
            for_total: self.for_total,
            against_total: self.against_total,
            required: self.min_percentage,
        });
        if total == 0 {
            return Ok(threshold_failed);
        }
        let for_pct =
            mul_div(self.for_total, 100, total).ok_or(GovernanceError::ArithmeticFault)?;
        if for_pct >= u128::from(self.min_percentage) {
            Ok(Verdict::Passed)
        } else {
            Ok(threshold_failed)
        }
    }
}
