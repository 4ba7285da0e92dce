//! Core governance engine: proposals from creation through withdrawal.

use std::collections::{BTreeMap, HashMap};

use crate::dispatch::{DispatchError, OutcomeDispatcher};
use crate::error::GovernanceError;
use crate::params::GovernanceParams;
use crate::proposal::{
    Outcome, Proposal, ProposalId, ProposalKind, ProposalRequest, ProposalStats, Verdict,
};
use crate::registry::PrivilegeRegistry;
use crate::vote::{Choice, VoteRecord};
use revshare_ledger::{TransferReceipt, ValueLedger};
use revshare_types::{Address, Timestamp};

/// Votes cast on one proposal, in arrival order.
#[derive(Default)]
struct Ballot {
    order: Vec<Address>,
    records: HashMap<Address, VoteRecord>,
}

/// Proposal lifecycle: `Open -> Resolved`.
///
/// Votes are value moved from the voter into `escrow` through the ledger,
/// paying the ordinary transfer fee on the way in and again on the way out.
/// Every voter gets their locked value back after resolution, however they
/// voted.
pub struct GovernanceEngine {
    params: GovernanceParams,
    escrow: Address,
    proposals: BTreeMap<ProposalId, Proposal>,
    ballots: HashMap<ProposalId, Ballot>,
    next_id: ProposalId,
}

impl GovernanceEngine {
    pub fn new(params: GovernanceParams, escrow: Address) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            params,
            escrow,
            proposals: BTreeMap::new(),
            ballots: HashMap::new(),
            next_id: 0,
        })
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn escrow(&self) -> &Address {
        &self.escrow
    }

    /// Open a new proposal. Only privileged holders may propose.
    pub fn create_proposal<R: PrivilegeRegistry>(
        &mut self,
        registry: &R,
        caller: &Address,
        request: ProposalRequest,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        if !registry.is_privileged(caller) {
            return Err(GovernanceError::Unauthorized(caller.to_string()));
        }
        self.params.check_request(&request)?;
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(GovernanceError::ArithmeticFault)?;
        let proposal = Proposal::new(id, caller.clone(), request, now)?;

        tracing::info!(
            proposal = id,
            kind = proposal.kind.name(),
            subject = %proposal.subject,
            proposer = %caller,
            ends_at = %proposal.ends_at,
            min_voters = proposal.min_voters,
            min_percentage = proposal.min_percentage,
            "proposal created"
        );
        self.proposals.insert(id, proposal);
        self.ballots.insert(id, Ballot::default());
        self.next_id = next_id;
        Ok(id)
    }

    /// Lock `amount` of `voter`'s value behind `choice`. One vote per
    /// voter per proposal; the locked and tallied amount is what arrives in
    /// escrow after the transfer fee.
    pub fn vote<L: ValueLedger>(
        &mut self,
        id: ProposalId,
        voter: &Address,
        choice: Choice,
        amount: u128,
        now: Timestamp,
        ledger: &mut L,
    ) -> Result<VoteRecord, GovernanceError> {
        let proposal = self.proposal_or_err(id)?;
        if !proposal.is_open(now) {
            return Err(GovernanceError::VotingOver(id));
        }
        if self.has_voted(id, voter) {
            return Err(GovernanceError::AlreadyVoted(voter.to_string()));
        }
        let available = ledger.balance_of(voter);
        if amount == 0 || available < amount {
            return Err(GovernanceError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        // `amount` bounds what escrow can receive, so the tallies below
        // cannot overflow once this passes.
        let tally = match choice {
            Choice::For => proposal.for_total,
            Choice::Against => proposal.against_total,
        };
        tally
            .checked_add(amount)
            .ok_or(GovernanceError::ArithmeticFault)?;
        let voter_count = proposal
            .voter_count
            .checked_add(1)
            .ok_or(GovernanceError::ArithmeticFault)?;

        let receipt = ledger.transfer(voter, &self.escrow, amount)?;

        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        match choice {
            Choice::For => proposal.for_total += receipt.received,
            Choice::Against => proposal.against_total += receipt.received,
        }
        proposal.voter_count = voter_count;

        let record = VoteRecord {
            proposal_id: id,
            voter: voter.clone(),
            amount_locked: receipt.received,
            choice,
            withdrawn: false,
        };
        let ballot = self.ballots.entry(id).or_default();
        ballot.order.push(voter.clone());
        ballot.records.insert(voter.clone(), record.clone());
        tracing::info!(
            proposal = id,
            %voter,
            ?choice,
            locked = receipt.received,
            fee = receipt.fee,
            "vote cast"
        );
        Ok(record)
    }

    /// Resolve a proposal whose voting window has closed. Anyone may call
    /// this, exactly once per proposal.
    pub fn finalize<D: OutcomeDispatcher>(
        &mut self,
        id: ProposalId,
        now: Timestamp,
        dispatcher: &mut D,
    ) -> Result<Outcome, GovernanceError> {
        let proposal = self.proposal_or_err(id)?;
        if proposal.resolved {
            return Err(GovernanceError::AlreadyResolved(id));
        }
        if now < proposal.ends_at {
            return Err(GovernanceError::VotingNotOver(id));
        }

        let outcome = match proposal.verdict()? {
            Verdict::Failed(outcome) => outcome,
            Verdict::Passed => {
                let subject = &proposal.subject;
                let dispatched = match proposal.kind {
                    ProposalKind::GrantPrivilege => dispatcher.grant_privilege(subject),
                    ProposalKind::RevokePrivilege => dispatcher.revoke_privilege(subject),
                    ProposalKind::ReassignBeneficiary => dispatcher.reassign_beneficiary(subject),
                };
                match dispatched {
                    Ok(()) => Outcome::Enacted,
                    Err(DispatchError::Refused(reason)) => {
                        tracing::warn!(
                            proposal = id,
                            kind = proposal.kind.name(),
                            %reason,
                            "passed proposal not applied"
                        );
                        Outcome::NotApplied { reason }
                    }
                    Err(DispatchError::Failed(reason)) => {
                        return Err(GovernanceError::Dispatch(reason));
                    }
                }
            }
        };

        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        proposal.resolved = true;
        proposal.outcome = Some(outcome.clone());
        tracing::info!(
            proposal = id,
            passed = outcome.passed(),
            outcome = ?outcome,
            for_total = proposal.for_total,
            against_total = proposal.against_total,
            voters = proposal.voter_count,
            "proposal resolved"
        );
        Ok(outcome)
    }

    /// Return `voter`'s locked value, less the ordinary transfer fee.
    pub fn withdraw<L: ValueLedger>(
        &mut self,
        id: ProposalId,
        voter: &Address,
        ledger: &mut L,
    ) -> Result<TransferReceipt, GovernanceError> {
        let proposal = self.proposal_or_err(id)?;
        if !proposal.resolved {
            return Err(GovernanceError::VotingNotOver(id));
        }
        let amount = match self.vote_of(id, voter) {
            Some(record) if !record.withdrawn && record.amount_locked > 0 => record.amount_locked,
            _ => return Err(GovernanceError::NothingToWithdraw(voter.to_string())),
        };

        let receipt = ledger.transfer(&self.escrow, voter, amount)?;

        if let Some(record) = self
            .ballots
            .get_mut(&id)
            .and_then(|b| b.records.get_mut(voter))
        {
            record.withdrawn = true;
        }
        tracing::info!(
            proposal = id,
            %voter,
            returned = receipt.received,
            fee = receipt.fee,
            "vote withdrawn"
        );
        Ok(receipt)
    }

    pub fn proposal_count(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_proposal(&self, id: ProposalId) -> bool {
        self.proposals.contains_key(&id)
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    /// All proposals in creation order.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn stats(&self, id: ProposalId) -> Result<ProposalStats, GovernanceError> {
        Ok(self.proposal_or_err(id)?.stats())
    }

    /// Voters in the order their votes arrived.
    pub fn voters(&self, id: ProposalId) -> Result<&[Address], GovernanceError> {
        self.proposal_or_err(id)?;
        Ok(self
            .ballots
            .get(&id)
            .map(|b| b.order.as_slice())
            .unwrap_or(&[]))
    }

    pub fn vote_of(&self, id: ProposalId, voter: &Address) -> Option<&VoteRecord> {
        self.ballots.get(&id).and_then(|b| b.records.get(voter))
    }

    /// Value `voter` still has in escrow for proposal `id`.
    pub fn locked_balance(&self, id: ProposalId, voter: &Address) -> u128 {
        match self.vote_of(id, voter) {
            Some(record) if !record.withdrawn => record.amount_locked,
            _ => 0,
        }
    }

    /// The recorded outcome; `VotingNotOver` until the proposal resolves.
    pub fn outcome(&self, id: ProposalId) -> Result<&Outcome, GovernanceError> {
        self.proposal_or_err(id)?
            .outcome
            .as_ref()
            .ok_or(GovernanceError::VotingNotOver(id))
    }

    fn has_voted(&self, id: ProposalId, voter: &Address) -> bool {
        self.vote_of(id, voter).is_some()
    }

    fn proposal_or_err(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PrivilegeSet;
    use revshare_ledger::{FeeRoutes, FeeSchedule, MemoryLedger};
    use revshare_types::DescriptionHash;

    const DURATION: u64 = 518_400;

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    /// Records what it was asked to do; refuses grants to `refuse`.
    #[derive(Default)]
    struct RecordingDispatcher {
        calls: Vec<(ProposalKind, Address)>,
        refuse: Option<Address>,
        fail: bool,
    }

    impl RecordingDispatcher {
        fn call(&mut self, kind: ProposalKind, subject: &Address) -> Result<(), DispatchError> {
            if self.fail {
                return Err(DispatchError::Failed("boom".into()));
            }
            if self.refuse.as_ref() == Some(subject) {
                return Err(DispatchError::Refused(format!("{subject} refused")));
            }
            self.calls.push((kind, subject.clone()));
            Ok(())
        }
    }

    impl OutcomeDispatcher for RecordingDispatcher {
        fn grant_privilege(&mut self, subject: &Address) -> Result<(), DispatchError> {
            self.call(ProposalKind::GrantPrivilege, subject)
        }

        fn revoke_privilege(&mut self, subject: &Address) -> Result<(), DispatchError> {
            self.call(ProposalKind::RevokePrivilege, subject)
        }

        fn reassign_beneficiary(&mut self, subject: &Address) -> Result<(), DispatchError> {
            self.call(ProposalKind::ReassignBeneficiary, subject)
        }
    }

    struct Fixture {
        engine: GovernanceEngine,
        registry: PrivilegeSet,
        ledger: MemoryLedger,
    }

    fn setup() -> Fixture {
        let mut registry = PrivilegeSet::new(addr("escrow"));
        registry.init(addr("founder")).unwrap();
        let mut ledger = MemoryLedger::new(
            FeeSchedule::default(),
            FeeRoutes {
                staking_pool: addr("staking"),
                membership_pool: addr("members"),
                beneficiary: addr("charity"),
            },
        )
        .unwrap();
        for who in ["v1", "v2", "v3", "v4"] {
            ledger.mint(&addr(who), 10_000).unwrap();
        }
        Fixture {
            engine: GovernanceEngine::new(GovernanceParams::default(), addr("escrow")).unwrap(),
            registry,
            ledger,
        }
    }

    fn request(kind: ProposalKind, min_voters: u64, min_percentage: u32) -> ProposalRequest {
        ProposalRequest {
            kind,
            subject: addr("applicant"),
            description_hash: DescriptionHash::new([7u8; 32]),
            duration_secs: DURATION,
            min_voters,
            min_percentage,
        }
    }

    fn open(f: &mut Fixture, kind: ProposalKind, min_voters: u64, min_percentage: u32) -> ProposalId {
        f.engine
            .create_proposal(
                &f.registry,
                &addr("founder"),
                request(kind, min_voters, min_percentage),
                t(0),
            )
            .unwrap()
    }

    #[test]
    fn test_create_requires_privilege_and_valid_params() {
        let mut f = setup();
        let err = f
            .engine
            .create_proposal(
                &f.registry,
                &addr("v1"),
                request(ProposalKind::GrantPrivilege, 4, 50),
                t(0),
            )
            .unwrap_err();
        assert_eq!(err, GovernanceError::Unauthorized("v1".into()));

        let err = f
            .engine
            .create_proposal(
                &f.registry,
                &addr("founder"),
                request(ProposalKind::GrantPrivilege, 0, 50),
                t(0),
            )
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidParameters(_)));
        assert_eq!(f.engine.proposal_count(), 0);

        let id = open(&mut f, ProposalKind::GrantPrivilege, 4, 50);
        assert_eq!(id, 0);
        assert!(f.engine.is_proposal(0));
        assert!(!f.engine.is_proposal(1));
    }

    #[test]
    fn test_votes_are_fee_adjusted() {
        let mut f = setup();
        let id = open(&mut f, ProposalKind::GrantPrivilege, 4, 50);
        f.engine
            .vote(id, &addr("v1"), Choice::For, 1000, t(1), &mut f.ledger)
            .unwrap();
        f.engine
            .vote(id, &addr("v2"), Choice::Against, 600, t(2), &mut f.ledger)
            .unwrap();

        assert_eq!(
            f.engine.stats(id).unwrap(),
            ProposalStats {
                for_total: 960,
                against_total: 576,
                voter_count: 2
            }
        );
        assert_eq!(f.ledger.balance_of(&addr("escrow")), 1536);
        assert_eq!(f.engine.locked_balance(id, &addr("v1")), 960);
        assert_eq!(f.engine.voters(id).unwrap(), &[addr("v1"), addr("v2")]);
    }

    #[test]
    fn test_vote_rejections() {
        let mut f = setup();
        let id = open(&mut f, ProposalKind::GrantPrivilege, 1, 50);
        f.engine
            .vote(id, &addr("v1"), Choice::For, 100, t(1), &mut f.ledger)
            .unwrap();

        assert_eq!(
            f.engine
                .vote(id, &addr("v1"), Choice::For, 100, t(2), &mut f.ledger)
                .unwrap_err(),
            GovernanceError::AlreadyVoted("v1".into())
        );
        assert_eq!(
            f.engine
                .vote(id, &addr("v1"), Choice::Against, 100, t(2), &mut f.ledger)
                .unwrap_err(),
            GovernanceError::AlreadyVoted("v1".into())
        );
        assert!(matches!(
            f.engine
                .vote(id, &addr("nobody"), Choice::For, 100, t(2), &mut f.ledger)
                .unwrap_err(),
            GovernanceError::InsufficientFunds { needed: 100, available: 0 }
        ));
        assert!(matches!(
            f.engine
                .vote(id, &addr("v2"), Choice::For, 0, t(2), &mut f.ledger)
                .unwrap_err(),
            GovernanceError::InsufficientFunds { .. }
        ));
        assert_eq!(
            f.engine
                .vote(id, &addr("v2"), Choice::For, 100, t(DURATION), &mut f.ledger)
                .unwrap_err(),
            GovernanceError::VotingOver(id)
        );
        assert_eq!(f.engine.stats(id).unwrap().voter_count, 1);
    }

    #[test]
    fn test_finalize_lifecycle() {
        let mut f = setup();
        let mut dispatcher = RecordingDispatcher::default();
        let id = open(&mut f, ProposalKind::ReassignBeneficiary, 2, 50);
        f.engine
            .vote(id, &addr("v1"), Choice::For, 1000, t(1), &mut f.ledger)
            .unwrap();
        f.engine
            .vote(id, &addr("v2"), Choice::Against, 600, t(1), &mut f.ledger)
            .unwrap();

        assert_eq!(
            f.engine.finalize(id, t(DURATION - 1), &mut dispatcher),
            Err(GovernanceError::VotingNotOver(id))
        );
        assert_eq!(f.engine.outcome(id), Err(GovernanceError::VotingNotOver(id)));

        let outcome = f.engine.finalize(id, t(DURATION), &mut dispatcher).unwrap();
        assert_eq!(outcome, Outcome::Enacted);
        assert_eq!(
            dispatcher.calls,
            vec![(ProposalKind::ReassignBeneficiary, addr("applicant"))]
        );
        assert_eq!(
            f.engine.finalize(id, t(DURATION + 1), &mut dispatcher),
            Err(GovernanceError::AlreadyResolved(id))
        );
        assert_eq!(f.engine.outcome(id).unwrap(), &Outcome::Enacted);
    }

    #[test]
    fn test_quorum_failure_dispatches_nothing() {
        let mut f = setup();
        let mut dispatcher = RecordingDispatcher::default();
        let id = open(&mut f, ProposalKind::GrantPrivilege, 4, 50);
        f.engine
            .vote(id, &addr("v1"), Choice::For, 1000, t(1), &mut f.ledger)
            .unwrap();
        f.engine
            .vote(id, &addr("v2"), Choice::Against, 600, t(1), &mut f.ledger)
            .unwrap();

        let outcome = f.engine.finalize(id, t(DURATION), &mut dispatcher).unwrap();
        assert_eq!(outcome, Outcome::QuorumNotMet { voters: 2, required: 4 });
        assert!(dispatcher.calls.is_empty());
        assert!(f.engine.proposal(id).unwrap().resolved);
    }

    #[test]
    fn test_refused_dispatch_still_resolves() {
        let mut f = setup();
        let mut dispatcher = RecordingDispatcher {
            refuse: Some(addr("applicant")),
            ..Default::default()
        };
        let id = open(&mut f, ProposalKind::GrantPrivilege, 1, 50);
        f.engine
            .vote(id, &addr("v1"), Choice::For, 100, t(1), &mut f.ledger)
            .unwrap();
        let outcome = f.engine.finalize(id, t(DURATION), &mut dispatcher).unwrap();
        assert!(outcome.passed());
        assert!(matches!(outcome, Outcome::NotApplied { .. }));
    }

    #[test]
    fn test_failed_dispatch_leaves_proposal_open_for_finalize() {
        let mut f = setup();
        let mut dispatcher = RecordingDispatcher {
            fail: true,
            ..Default::default()
        };
        let id = open(&mut f, ProposalKind::RevokePrivilege, 1, 50);
        f.engine
            .vote(id, &addr("v1"), Choice::For, 100, t(1), &mut f.ledger)
            .unwrap();
        assert!(matches!(
            f.engine.finalize(id, t(DURATION), &mut dispatcher),
            Err(GovernanceError::Dispatch(_))
        ));
        assert!(!f.engine.proposal(id).unwrap().resolved);

        dispatcher.fail = false;
        assert_eq!(
            f.engine.finalize(id, t(DURATION), &mut dispatcher).unwrap(),
            Outcome::Enacted
        );
    }

    #[test]
    fn test_withdraw_returns_fee_adjusted_value() {
        let mut f = setup();
        let mut dispatcher = RecordingDispatcher::default();
        let id = open(&mut f, ProposalKind::GrantPrivilege, 4, 50);
        f.engine
            .vote(id, &addr("v1"), Choice::For, 1000, t(1), &mut f.ledger)
            .unwrap();
        f.engine
            .vote(id, &addr("v2"), Choice::Against, 600, t(1), &mut f.ledger)
            .unwrap();

        assert_eq!(
            f.engine.withdraw(id, &addr("v1"), &mut f.ledger),
            Err(GovernanceError::VotingNotOver(id))
        );
        f.engine.finalize(id, t(DURATION), &mut dispatcher).unwrap();

        let receipt = f.engine.withdraw(id, &addr("v1"), &mut f.ledger).unwrap();
        // 960 locked, 4% fee on the way out.
        assert_eq!(receipt.received, 922);
        assert_eq!(f.ledger.balance_of(&addr("v1")), 10_000 - 1000 + 922);
        assert_eq!(
            f.engine.withdraw(id, &addr("v1"), &mut f.ledger),
            Err(GovernanceError::NothingToWithdraw("v1".into()))
        );
        assert_eq!(
            f.engine.withdraw(id, &addr("v3"), &mut f.ledger),
            Err(GovernanceError::NothingToWithdraw("v3".into()))
        );

        f.engine.withdraw(id, &addr("v2"), &mut f.ledger).unwrap();
        assert_eq!(f.ledger.balance_of(&addr("escrow")), 0);
        assert_eq!(f.engine.locked_balance(id, &addr("v2")), 0);
    }
}
