//! Events emitted by the host for subscribers.

use revshare_governance::{Choice, Outcome, ProposalId, ProposalKind};
use revshare_ledger::PoolId;
use revshare_types::Address;

/// Host-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Fee revenue was notified to a pool.
    RevenueNotified { pool: PoolId, amount: u128 },
    Staked { staker: Address, amount: u128 },
    Unstaked {
        staker: Address,
        principal: u128,
        reward: u128,
        forfeited: u128,
    },
    RewardClaimed {
        pool: PoolId,
        claimant: Address,
        amount: u128,
    },
    StakeTransferred {
        from: Address,
        to: Address,
        amount: u128,
    },
    ProposalCreated {
        id: ProposalId,
        kind: ProposalKind,
        subject: Address,
    },
    VoteCast {
        id: ProposalId,
        voter: Address,
        choice: Choice,
        locked: u128,
    },
    /// A proposal reached its terminal state.
    ProposalResolved { id: ProposalId, outcome: Outcome },
    VoteWithdrawn {
        id: ProposalId,
        voter: Address,
        returned: u128,
    },
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline, in subscription order, after the
/// operation that produced the event has committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&HostEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&HostEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &HostEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
