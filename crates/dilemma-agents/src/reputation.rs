//! Trust and aggression scores fed back into agent observations.
//!
//! # Invariants
//!
//! - Every bootstrapped agent starts at trust 0.5, aggression 0.0.
//! - Scores are clamped to [0.0, 1.0] on every update.
//! - `last_harm_from[target]` names the most recent agent that harmed it.

use std::collections::BTreeMap;

use dilemma_types::AgentId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Starting trust for every agent.
pub const INITIAL_TRUST: f64 = 0.5;

/// Starting aggression for every agent.
pub const INITIAL_AGGRESSION: f64 = 0.0;

/// Trust earned by one WORK.
const WORK_TRUST_GAIN: f64 = 0.01;

/// Aggression added by any steal attempt.
const STEAL_AGGRESSION: f64 = 0.08;

/// Trust lost by a successful thief.
const STEAL_SUCCESS_TRUST_LOSS: f64 = 0.06;

/// Trust lost by a failed thief.
const STEAL_FAIL_TRUST_LOSS: f64 = 0.03;

/// Aggression added by any attack.
const ATTACK_AGGRESSION: f64 = 0.15;

/// Trust lost by any attacker.
const ATTACK_TRUST_LOSS: f64 = 0.12;

/// Trust gained by the survivor of a failed attack.
const SYMPATHY_TRUST_GAIN: f64 = 0.02;

// ---------------------------------------------------------------------------
// ReputationBook
// ---------------------------------------------------------------------------

/// Per-agent trust, aggression, and last-harm pointers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReputationBook {
    trust: BTreeMap<AgentId, f64>,
    aggression: BTreeMap<AgentId, f64>,
    last_harm_from: BTreeMap<AgentId, AgentId>,
}

impl ReputationBook {
    /// An empty book.
    pub const fn new() -> Self {
        Self {
            trust: BTreeMap::new(),
            aggression: BTreeMap::new(),
            last_harm_from: BTreeMap::new(),
        }
    }

    /// Give every agent in `agents` the starting scores.
    pub fn bootstrap(&mut self, agents: impl IntoIterator<Item = AgentId>) {
        for agent in agents {
            self.trust.insert(agent, INITIAL_TRUST);
            self.aggression.insert(agent, INITIAL_AGGRESSION);
        }
    }

    /// Trust of `agent`; unknown agents read as the starting value.
    pub fn trust(&self, agent: AgentId) -> f64 {
        self.trust.get(&agent).copied().unwrap_or(INITIAL_TRUST)
    }

    /// Aggression of `agent`; unknown agents read as the starting value.
    pub fn aggression(&self, agent: AgentId) -> f64 {
        self.aggression
            .get(&agent)
            .copied()
            .unwrap_or(INITIAL_AGGRESSION)
    }

    /// The last agent that harmed `agent`.
    pub fn last_harm_from(&self, agent: AgentId) -> Option<AgentId> {
        self.last_harm_from.get(&agent).copied()
    }

    // -----------------------------------------------------------------------
    // Updates
    // -----------------------------------------------------------------------

    /// `actor` worked.
    pub fn record_work(&mut self, actor: AgentId) {
        self.adjust_trust(actor, WORK_TRUST_GAIN);
    }

    /// `actor` tried to steal from `target`.
    pub fn record_steal(&mut self, actor: AgentId, target: AgentId, success: bool) {
        self.adjust_aggression(actor, STEAL_AGGRESSION);
        let loss = if success {
            STEAL_SUCCESS_TRUST_LOSS
        } else {
            STEAL_FAIL_TRUST_LOSS
        };
        self.adjust_trust(actor, -loss);
        if success {
            self.last_harm_from.insert(target, actor);
        }
    }

    /// `actor` attacked `target`.
    pub fn record_attack(&mut self, actor: AgentId, target: AgentId, success: bool) {
        self.adjust_aggression(actor, ATTACK_AGGRESSION);
        self.adjust_trust(actor, -ATTACK_TRUST_LOSS);
        self.last_harm_from.insert(target, actor);
        if !success {
            self.adjust_trust(target, SYMPATHY_TRUST_GAIN);
        }
    }

    fn adjust_trust(&mut self, agent: AgentId, delta: f64) {
        let score = self.trust.entry(agent).or_insert(INITIAL_TRUST);
        *score = (*score + delta).clamp(0.0, 1.0);
    }

    fn adjust_aggression(&mut self, agent: AgentId, delta: f64) {
        let score = self.aggression.entry(agent).or_insert(INITIAL_AGGRESSION);
        *score = (*score + delta).clamp(0.0, 1.0);
    }
}
