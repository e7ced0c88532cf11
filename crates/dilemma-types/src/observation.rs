//! What an agent sees when it is asked to decide.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::capabilities::{Capabilities, Position};
use crate::ids::{AgentId, ProposalId};
use crate::rules::{RuleTable, RuleValue};

/// A pending governance change to one rule key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposal {
    /// Unique, strictly increasing id.
    pub proposal_id: ProposalId,
    /// The agent that opened the proposal.
    pub actor: AgentId,
    /// Turn the proposal was opened.
    pub turn: u32,
    /// Rule key to change.
    pub key: String,
    /// Proposed value.
    pub value: RuleValue,
}

/// Extra state visible when any extended capability is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExtendedView {
    /// Mechanics enabled for this world.
    pub capabilities: Capabilities,
    /// The observing agent's health, in health mode.
    pub self_health: Option<i64>,
    /// Health of every alive agent, in health mode.
    pub health_by_agent: BTreeMap<AgentId, i64>,
    /// Agents actively allied with the observer.
    pub allies: BTreeSet<AgentId>,
    /// The observer's grid cell, with movement enabled.
    pub position: Option<Position>,
}

/// An immutable per-turn snapshot handed to a decision strategy.
///
/// Built fresh for every agent on every turn and dropped right after the
/// decision. Only alive agents appear in the per-agent maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentObservation {
    /// Current turn, starting at 1.
    pub turn: u32,
    /// The observing agent.
    pub self_id: AgentId,
    /// Observer's token balance.
    pub self_balance: i64,
    /// Observer's strength.
    pub self_strength: i64,
    /// Observer's 1-based rank by balance among alive agents.
    pub self_rank: u32,
    /// Alive agent ids in ascending order.
    pub alive_ids: Vec<AgentId>,
    /// Token balance per alive agent.
    pub balance_by_agent: BTreeMap<AgentId, i64>,
    /// Strength per alive agent.
    pub strength_by_agent: BTreeMap<AgentId, i64>,
    /// Trust per alive agent.
    pub trust_by_agent: BTreeMap<AgentId, f64>,
    /// Aggression per alive agent.
    pub aggression_by_agent: BTreeMap<AgentId, f64>,
    /// Copy of the current rule values.
    pub rules: RuleTable,
    /// The pending proposal, if one is open.
    pub pending_proposal: Option<Proposal>,
    /// The last agent that harmed the observer.
    pub last_harm_from: Option<AgentId>,
    /// Extended-mechanics state, when any capability is on.
    pub extended: Option<ExtendedView>,
}

impl AgentObservation {
    /// Alive agents other than the observer, ascending.
    pub fn others(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.alive_ids.iter().copied().filter(move |id| *id != self.self_id)
    }

    /// Balance of `agent`, zero when unknown.
    pub fn balance_of(&self, agent: AgentId) -> i64 {
        self.balance_by_agent.get(&agent).copied().unwrap_or(0)
    }

    /// Strength of `agent`, zero when unknown.
    pub fn strength_of(&self, agent: AgentId) -> i64 {
        self.strength_by_agent.get(&agent).copied().unwrap_or(0)
    }

    /// Trust of `agent`, neutral when unknown.
    pub fn trust_of(&self, agent: AgentId) -> f64 {
        self.trust_by_agent.get(&agent).copied().unwrap_or(0.5)
    }

    /// Aggression of `agent`, zero when unknown.
    pub fn aggression_of(&self, agent: AgentId) -> f64 {
        self.aggression_by_agent.get(&agent).copied().unwrap_or(0.0)
    }

    /// Integer rule value, or `default` when absent or not an integer.
    pub fn rule_int(&self, key: &str, default: i64) -> i64 {
        match self.rules.get(key) {
            Some(RuleValue::Int(v)) => *v,
            _ => default,
        }
    }

    /// Numeric rule value, or `default` when absent or not numeric.
    pub fn rule_float(&self, key: &str, default: f64) -> f64 {
        self.rules
            .get(key)
            .and_then(RuleValue::as_number)
            .unwrap_or(default)
    }
}
