//! Pairwise alliances between agents.
//!
//! Alliances are unilateral: one agent forming an alliance with another
//! activates it for both. Broken alliances stay in the registry with the
//! turn they ended, so the history of a run can be inspected afterwards.

use std::collections::BTreeSet;

use dilemma_types::{AgentId, AllianceDetails, AllianceReason};

// ---------------------------------------------------------------------------
// Alliance
// ---------------------------------------------------------------------------

/// One alliance record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alliance {
    /// Lower id of the pair.
    pub first: AgentId,
    /// Higher id of the pair.
    pub second: AgentId,
    /// Mean trust of the pair when the alliance formed.
    pub trust_level: f64,
    /// Combined strength of the pair when the alliance formed.
    pub strength: i64,
    /// Turn the alliance formed.
    pub formed_turn: u32,
    /// Turn the alliance was broken, if it was.
    pub broken_turn: Option<u32>,
}

impl Alliance {
    /// Whether the alliance is still in force.
    pub const fn is_active(&self) -> bool {
        self.broken_turn.is_none()
    }

    /// Whether `agent` is one of the pair.
    pub fn involves(&self, agent: AgentId) -> bool {
        self.first == agent || self.second == agent
    }

    /// The other member of the pair, if `agent` is a member.
    pub fn partner_of(&self, agent: AgentId) -> Option<AgentId> {
        if self.first == agent {
            Some(self.second)
        } else if self.second == agent {
            Some(self.first)
        } else {
            None
        }
    }

    fn joins(&self, a: AgentId, b: AgentId) -> bool {
        self.is_active() && self.involves(a) && self.involves(b)
    }
}

// ---------------------------------------------------------------------------
// AllianceRegistry
// ---------------------------------------------------------------------------

/// Every alliance formed during a run, in formation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllianceRegistry {
    alliances: Vec<Alliance>,
}

impl AllianceRegistry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            alliances: Vec::new(),
        }
    }

    /// All records, active or broken.
    pub fn all(&self) -> &[Alliance] {
        &self.alliances
    }

    /// Whether `a` and `b` are actively allied.
    pub fn are_allied(&self, a: AgentId, b: AgentId) -> bool {
        self.alliances.iter().any(|alliance| alliance.joins(a, b))
    }

    /// Active partners of `agent`, ascending.
    pub fn allies_of(&self, agent: AgentId) -> BTreeSet<AgentId> {
        self.alliances
            .iter()
            .filter(|alliance| alliance.is_active())
            .filter_map(|alliance| alliance.partner_of(agent))
            .collect()
    }

    /// Ally `actor` with `partner`.
    ///
    /// `trust_level` and `strength` are recorded as given: the caller
    /// passes the pair's mean trust and combined strength.
    pub fn form(
        &mut self,
        actor: AgentId,
        partner: AgentId,
        trust_level: f64,
        strength: i64,
        turn: u32,
    ) -> AllianceDetails {
        if self.are_allied(actor, partner) {
            return AllianceDetails {
                success: false,
                reason: AllianceReason::AlreadyAllied,
                partner,
                trust_level: None,
                strength: None,
            };
        }

        self.alliances.push(Alliance {
            first: actor.min(partner),
            second: actor.max(partner),
            trust_level,
            strength,
            formed_turn: turn,
            broken_turn: None,
        });

        AllianceDetails {
            success: true,
            reason: AllianceReason::AllianceFormed,
            partner,
            trust_level: Some(trust_level),
            strength: Some(strength),
        }
    }

    /// End the active alliance between `actor` and `partner`.
    pub fn dissolve(&mut self, actor: AgentId, partner: AgentId, turn: u32) -> AllianceDetails {
        let active = self
            .alliances
            .iter_mut()
            .find(|alliance| alliance.joins(actor, partner));

        let reason = match active {
            Some(alliance) => {
                alliance.broken_turn = Some(turn);
                AllianceReason::AllianceBroken
            }
            None => AllianceReason::NoAllianceFound,
        };

        AllianceDetails {
            success: reason == AllianceReason::AllianceBroken,
            reason,
            partner,
            trust_level: None,
            strength: None,
        }
    }
}
