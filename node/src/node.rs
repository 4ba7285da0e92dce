//! The revshare host: one ledger, two reward pools, a privilege registry
//! and a governance engine, driven by a single clock.

use std::collections::BTreeMap;

use revshare_governance::{
    Choice, GovernanceEngine, Outcome, PrivilegeRegistry, PrivilegeSet, ProposalId,
    ProposalRequest, VoteRecord,
};
use revshare_ledger::{
    FeeRoutes, MemoryLedger, PoolId, RevenueEvent, TransferReceipt, ValueLedger,
};
use revshare_nullables::Clock;
use revshare_rewards::{
    DistributorConfig, RewardDistributor, Stake, UnstakeReceipt, WeightSource,
};
use revshare_types::{Address, Timestamp};
use serde::Serialize;

use crate::config::NodeConfig;
use crate::enactor::Enactor;
use crate::event::{EventBus, HostEvent};
use crate::NodeError;

/// Pool figures for reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolSummary {
    pub total_weight: u128,
    pub participants: usize,
    pub acc_reward_per_weight: u128,
    pub undistributed: u128,
    /// Routed to the pool account but not yet accepted by `notify`.
    pub undelivered: u128,
    pub notified: u128,
    pub paid: u128,
    pub forfeited: u128,
}

impl PoolSummary {
    fn of(pool: &RewardDistributor, undelivered: u128) -> Self {
        let totals = pool.totals();
        Self {
            total_weight: pool.total_weight(),
            participants: pool.participants(),
            acc_reward_per_weight: pool.pool().acc_reward_per_weight,
            undistributed: pool.undistributed(),
            undelivered,
            notified: totals.notified,
            paid: totals.paid,
            forfeited: totals.forfeited,
        }
    }
}

/// Point-in-time view of the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub now: Timestamp,
    pub total_supply: u128,
    pub total_fees: u128,
    pub beneficiary: Address,
    pub privileged: Vec<Address>,
    pub balances: BTreeMap<Address, u128>,
    pub staking: PoolSummary,
    pub membership: PoolSummary,
    pub proposals: usize,
}

/// Wires the engines together.
///
/// Each public operation reads the clock once, performs one engine call,
/// then forwards any fee revenue the ledger withheld to the matching pool
/// as a `notify` from the fee router.
pub struct RevshareNode {
    config: NodeConfig,
    clock: Box<dyn Clock>,
    ledger: MemoryLedger,
    staking: RewardDistributor,
    membership: RewardDistributor,
    registry: PrivilegeSet,
    governance: GovernanceEngine,
    events: EventBus,
    /// Routed revenue a pool has not accepted yet.
    undelivered: Vec<RevenueEvent>,
}

impl RevshareNode {
    pub fn new(config: NodeConfig, clock: Box<dyn Clock>) -> Result<Self, NodeError> {
        config.validate()?;
        let accounts = &config.accounts;

        let mut ledger = MemoryLedger::new(
            config.fees.clone(),
            FeeRoutes {
                staking_pool: accounts.staking_pool.clone(),
                membership_pool: accounts.membership_pool.clone(),
                beneficiary: accounts.beneficiary.clone(),
            },
        )?;

        let staking = RewardDistributor::new(DistributorConfig {
            source: WeightSource::Stake,
            pool_account: accounts.staking_pool.clone(),
            owner: accounts.owner.clone(),
            depositors: vec![accounts.fee_router.clone()],
            registry_authority: None,
            minimum_lock_secs: config.staking.minimum_lock_secs,
            early_exit_penalty_pct: config.staking.early_exit_penalty_pct,
            lock_transfer_policy: config.staking.lock_transfer_policy,
        })?;
        let mut membership = RewardDistributor::new(
            DistributorConfig::membership(
                accounts.membership_pool.clone(),
                accounts.owner.clone(),
                accounts.governance.clone(),
            )
            .with_depositor(accounts.fee_router.clone()),
        )?;

        let mut registry = PrivilegeSet::new(accounts.governance.clone());
        for (i, holder) in config.genesis.privileged.iter().enumerate() {
            if i == 0 {
                registry.init(holder.clone())?;
            } else {
                registry.grant(&accounts.governance, holder)?;
            }
            membership.set_member(&accounts.governance, holder, true)?;
        }

        for (account, balance) in &config.genesis.balances {
            ledger.mint(account, u128::from(*balance))?;
        }
        for account in &config.genesis.fee_exempt {
            ledger.set_exempt(account, true);
        }

        let governance =
            GovernanceEngine::new(config.governance.clone(), accounts.governance.clone())?;

        tracing::info!(
            privileged = registry.len(),
            accounts = config.genesis.balances.len(),
            fee_per_mille = config.fees.fee_per_mille,
            "host initialised"
        );

        Ok(Self {
            config,
            clock,
            ledger,
            staking,
            membership,
            registry,
            governance,
            events: EventBus::new(),
            undelivered: Vec::new(),
        })
    }

    // ── Views ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn staking(&self) -> &RewardDistributor {
        &self.staking
    }

    pub fn membership(&self) -> &RewardDistributor {
        &self.membership
    }

    pub fn registry(&self) -> &PrivilegeSet {
        &self.registry
    }

    pub fn governance(&self) -> &GovernanceEngine {
        &self.governance
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.ledger.balance_of(account)
    }

    pub fn is_privileged(&self, account: &Address) -> bool {
        self.registry.is_privileged(account)
    }

    /// Revenue held by `pool`'s account that its distributor has not
    /// accepted yet.
    pub fn undelivered_revenue(&self, pool: PoolId) -> u128 {
        self.undelivered
            .iter()
            .filter(|e| e.pool == pool)
            .map(|e| e.amount)
            .sum()
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&HostEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn summary(&self) -> NodeSummary {
        let accounts = &self.config.accounts;
        let mut balances = BTreeMap::new();
        let known = self
            .config
            .genesis
            .balances
            .keys()
            .chain([
                &accounts.staking_pool,
                &accounts.membership_pool,
                &accounts.governance,
                self.ledger.beneficiary(),
            ]);
        for account in known {
            balances.insert(account.clone(), self.ledger.balance_of(account));
        }
        NodeSummary {
            now: self.now(),
            total_supply: self.ledger.total_supply(),
            total_fees: self.ledger.total_fees(),
            beneficiary: self.ledger.beneficiary().clone(),
            privileged: self.registry.members().to_vec(),
            balances,
            staking: PoolSummary::of(&self.staking, self.undelivered_revenue(PoolId::Staking)),
            membership: PoolSummary::of(
                &self.membership,
                self.undelivered_revenue(PoolId::Membership),
            ),
            proposals: self.governance.proposal_count(),
        }
    }

    // ── Ledger ─────────────────────────────────────────────────────────

    /// Ordinary value transfer; non-exempt transfers pay the fee.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<TransferReceipt, NodeError> {
        let receipt = self.ledger.transfer(from, to, amount)?;
        self.route_revenue();
        Ok(receipt)
    }

    pub fn set_fee_per_mille(&mut self, caller: &Address, fee_per_mille: u32) -> Result<(), NodeError> {
        self.require_owner(caller)?;
        self.ledger.set_fee_per_mille(fee_per_mille)?;
        Ok(())
    }

    pub fn set_fee_exempt(
        &mut self,
        caller: &Address,
        account: &Address,
        exempt: bool,
    ) -> Result<(), NodeError> {
        self.require_owner(caller)?;
        self.ledger.set_exempt(account, exempt);
        Ok(())
    }

    // ── Staking pool ───────────────────────────────────────────────────

    pub fn stake(&mut self, caller: &Address, amount: u128) -> Result<Stake, NodeError> {
        let now = self.now();
        let stake = self.staking.stake(caller, amount, now, &mut self.ledger)?;
        self.events.emit(&HostEvent::Staked {
            staker: caller.clone(),
            amount: stake.amount,
        });
        self.route_revenue();
        Ok(stake)
    }

    pub fn unstake(&mut self, caller: &Address) -> Result<UnstakeReceipt, NodeError> {
        let now = self.now();
        let receipt = self.staking.unstake(caller, now, &mut self.ledger)?;
        self.events.emit(&HostEvent::Unstaked {
            staker: caller.clone(),
            principal: receipt.principal,
            reward: receipt.reward,
            forfeited: receipt.forfeited,
        });
        self.route_revenue();
        Ok(receipt)
    }

    pub fn transfer_stake(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), NodeError> {
        let now = self.now();
        self.staking.transfer_stake(from, to, amount, now)?;
        self.events.emit(&HostEvent::StakeTransferred {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    pub fn set_minimum_lock_period(&mut self, caller: &Address, secs: u64) -> Result<(), NodeError> {
        self.staking.set_minimum_lock_period(caller, secs)?;
        Ok(())
    }

    /// Claim from either pool.
    pub fn claim(&mut self, pool: PoolId, caller: &Address) -> Result<u128, NodeError> {
        let now = self.now();
        let distributor = match pool {
            PoolId::Staking => &mut self.staking,
            PoolId::Membership => &mut self.membership,
        };
        let amount = distributor.claim(caller, now, &mut self.ledger)?;
        if amount > 0 {
            self.events.emit(&HostEvent::RewardClaimed {
                pool,
                claimant: caller.clone(),
                amount,
            });
        }
        self.route_revenue();
        Ok(amount)
    }

    pub fn earned(&self, pool: PoolId, account: &Address) -> Result<u128, NodeError> {
        let distributor = match pool {
            PoolId::Staking => &self.staking,
            PoolId::Membership => &self.membership,
        };
        Ok(distributor.earned(account)?)
    }

    // ── Governance ─────────────────────────────────────────────────────

    pub fn create_proposal(
        &mut self,
        caller: &Address,
        request: ProposalRequest,
    ) -> Result<ProposalId, NodeError> {
        let now = self.now();
        let kind = request.kind;
        let subject = request.subject.clone();
        let id = self
            .governance
            .create_proposal(&self.registry, caller, request, now)?;
        self.events
            .emit(&HostEvent::ProposalCreated { id, kind, subject });
        Ok(id)
    }

    pub fn vote(
        &mut self,
        id: ProposalId,
        voter: &Address,
        choice: Choice,
        amount: u128,
    ) -> Result<VoteRecord, NodeError> {
        let now = self.now();
        let record = self
            .governance
            .vote(id, voter, choice, amount, now, &mut self.ledger)?;
        self.events.emit(&HostEvent::VoteCast {
            id,
            voter: voter.clone(),
            choice,
            locked: record.amount_locked,
        });
        self.route_revenue();
        Ok(record)
    }

    /// Resolve a proposal and apply it if it passed.
    pub fn finalize(&mut self, id: ProposalId) -> Result<Outcome, NodeError> {
        let now = self.now();
        let mut enactor = Enactor {
            authority: &self.config.accounts.governance,
            registry: &mut self.registry,
            membership: &mut self.membership,
            ledger: &mut self.ledger,
        };
        let outcome = self.governance.finalize(id, now, &mut enactor)?;
        self.events.emit(&HostEvent::ProposalResolved {
            id,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    pub fn withdraw(&mut self, id: ProposalId, voter: &Address) -> Result<TransferReceipt, NodeError> {
        let receipt = self.governance.withdraw(id, voter, &mut self.ledger)?;
        self.events.emit(&HostEvent::VoteWithdrawn {
            id,
            voter: voter.clone(),
            returned: receipt.received,
        });
        self.route_revenue();
        Ok(receipt)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn require_owner(&self, caller: &Address) -> Result<(), NodeError> {
        if *caller != self.config.accounts.owner {
            return Err(NodeError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Forward revenue withheld by the ledger's fee hook to the pools.
    ///
    /// Runs after the triggering operation has committed, so it cannot fail
    /// that operation. A deposit the pool rejects stays queued, still held
    /// by the pool account, and is retried on the next routing.
    fn route_revenue(&mut self) {
        let now = self.now();
        let router = &self.config.accounts.fee_router;
        let mut queue = std::mem::take(&mut self.undelivered);
        queue.extend(self.ledger.take_revenue());
        for event in queue {
            let pool = match event.pool {
                PoolId::Staking => &mut self.staking,
                PoolId::Membership => &mut self.membership,
            };
            match pool.notify(router, event.amount, now) {
                Ok(_) => self.events.emit(&HostEvent::RevenueNotified {
                    pool: event.pool,
                    amount: event.amount,
                }),
                Err(e) => {
                    tracing::error!(
                        pool = ?event.pool,
                        amount = event.amount,
                        error = %e,
                        "revenue deposit rejected, kept for retry"
                    );
                    self.undelivered.push(event);
                }
            }
        }
    }
}
