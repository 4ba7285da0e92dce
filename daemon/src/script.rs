//! Scripted runs against a fresh host with a deterministic clock.

use anyhow::Context;
use revshare_governance::{Choice, ProposalId, ProposalKind, ProposalRequest};
use revshare_ledger::PoolId;
use revshare_node::{NodeConfig, NodeError, NodeSummary, RevshareNode};
use revshare_nullables::NullClock;
use revshare_types::{Address, DescriptionHash, ErrorKind};
use serde::{Deserialize, Serialize};

/// Starting time of every simulation.
pub const GENESIS_SECS: u64 = 1_700_000_000;

/// A simulation file: an optional host configuration followed by steps.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: NodeConfig,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Advance {
        secs: u64,
    },
    Transfer {
        from: Address,
        to: Address,
        amount: u64,
    },
    Stake {
        account: Address,
        amount: u64,
    },
    Unstake {
        account: Address,
    },
    Claim {
        pool: PoolId,
        account: Address,
    },
    TransferStake {
        from: Address,
        to: Address,
        amount: u64,
    },
    SetFee {
        caller: Address,
        fee_per_mille: u32,
    },
    SetMinimumLock {
        caller: Address,
        secs: u64,
    },
    Propose {
        caller: Address,
        kind: ProposalKind,
        subject: Address,
        duration_secs: u64,
        min_voters: u64,
        min_percentage: u32,
        #[serde(default)]
        description_hash: Option<String>,
    },
    Vote {
        proposal: ProposalId,
        voter: Address,
        choice: Choice,
        amount: u64,
    },
    Finalize {
        proposal: ProposalId,
    },
    Withdraw {
        proposal: ProposalId,
        voter: Address,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::Transfer { .. } => "transfer",
            Self::Stake { .. } => "stake",
            Self::Unstake { .. } => "unstake",
            Self::Claim { .. } => "claim",
            Self::TransferStake { .. } => "transfer_stake",
            Self::SetFee { .. } => "set_fee",
            Self::SetMinimumLock { .. } => "set_minimum_lock",
            Self::Propose { .. } => "propose",
            Self::Vote { .. } => "vote",
            Self::Finalize { .. } => "finalize",
            Self::Withdraw { .. } => "withdraw",
        }
    }
}

/// What one step did, as reported in the JSON output.
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub ok: bool,
    /// Error kind of a failed or no-effect step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub detail: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    pub summary: NodeSummary,
}

impl Script {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("failed to parse simulation script")
    }
}

/// Run every step in order. Steps that fail with a benign kind (nothing to
/// claim or withdraw) count as successes. With `keep_going`, any other
/// failing step is recorded and the run continues; otherwise the first
/// failure aborts.
pub fn run(script: Script, keep_going: bool) -> anyhow::Result<Report> {
    let clock = NullClock::new(GENESIS_SECS);
    let mut node = RevshareNode::new(script.config, Box::new(clock.clone()))
        .context("failed to start host")?;

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.into_iter().enumerate() {
        let op = step.name();
        let result = apply(&mut node, &clock, step);
        let kind = result.as_ref().err().and_then(error_kind);
        match result {
            Ok(detail) => steps.push(StepReport {
                index,
                op,
                ok: true,
                kind: None,
                detail,
            }),
            Err(e) if kind.is_some_and(|k| k.is_benign()) => {
                tracing::debug!(index, op, error = %e, "step had no effect");
                steps.push(StepReport {
                    index,
                    op,
                    ok: true,
                    kind: kind.map(|k| k.as_str()),
                    detail: serde_json::Value::String(e.to_string()),
                });
            }
            Err(e) if keep_going => {
                tracing::warn!(index, op, error = %e, "step failed");
                steps.push(StepReport {
                    index,
                    op,
                    ok: false,
                    kind: kind.map(|k| k.as_str()),
                    detail: serde_json::Value::String(format!("{e:#}")),
                });
            }
            Err(e) => return Err(e.context(format!("step {index} ({op}) failed"))),
        }
    }

    Ok(Report {
        steps,
        summary: node.summary(),
    })
}

fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<NodeError>().map(NodeError::kind)
}

fn apply(
    node: &mut RevshareNode,
    clock: &NullClock,
    step: Step,
) -> anyhow::Result<serde_json::Value> {
    let detail = match step {
        Step::Advance { secs } => {
            clock.advance(secs);
            serde_json::json!({ "now": node.now() })
        }
        Step::Transfer { from, to, amount } => {
            let receipt = node.transfer(&from, &to, amount.into())?;
            serde_json::to_value(receipt)?
        }
        Step::Stake { account, amount } => serde_json::to_value(node.stake(&account, amount.into())?)?,
        Step::Unstake { account } => serde_json::to_value(node.unstake(&account)?)?,
        Step::Claim { pool, account } => {
            let amount = node.claim(pool, &account)?;
            serde_json::json!({ "claimed": amount })
        }
        Step::TransferStake { from, to, amount } => {
            node.transfer_stake(&from, &to, amount.into())?;
            serde_json::Value::Null
        }
        Step::SetFee {
            caller,
            fee_per_mille,
        } => {
            node.set_fee_per_mille(&caller, fee_per_mille)?;
            serde_json::Value::Null
        }
        Step::SetMinimumLock { caller, secs } => {
            node.set_minimum_lock_period(&caller, secs)?;
            serde_json::Value::Null
        }
        Step::Propose {
            caller,
            kind,
            subject,
            duration_secs,
            min_voters,
            min_percentage,
            description_hash,
        } => {
            let description_hash = match description_hash {
                Some(hex) => DescriptionHash::from_hex(&hex)
                    .ok_or_else(|| anyhow::anyhow!("invalid description hash {hex:?}"))?,
                None => DescriptionHash::ZERO,
            };
            let id = node.create_proposal(
                &caller,
                ProposalRequest {
                    kind,
                    subject,
                    description_hash,
                    duration_secs,
                    min_voters,
                    min_percentage,
                },
            )?;
            serde_json::json!({ "proposal": id })
        }
        Step::Vote {
            proposal,
            voter,
            choice,
            amount,
        } => serde_json::to_value(node.vote(proposal, &voter, choice, amount.into())?)?,
        Step::Finalize { proposal } => serde_json::to_value(node.finalize(proposal)?)?,
        Step::Withdraw { proposal, voter } => {
            serde_json::to_value(node.withdraw(proposal, &voter)?)?
        }
    };
    Ok(detail)
}
