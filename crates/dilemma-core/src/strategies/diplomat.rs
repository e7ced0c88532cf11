//! Diplomat: builds alliances, supports its allies, and fights in numbers.
//!
//! Falls back to working whenever the world runs without the extended
//! mechanics it relies on.

use rand::RngCore;

use dilemma_types::{Action, ActionRejection, AgentObservation, Ballot, ExtendedView, Intent, keys};

use super::politician::{SUPPORT_THRESHOLD, proposer_support};
use super::{chance, first_max_by, first_min_by};
use crate::decision::DecisionStrategy;

/// Rest when health drops below this.
const REST_BELOW_HEALTH: i64 = 25;

/// Alliances the diplomat tries to hold at once.
const DESIRED_ALLIES: usize = 2;

/// Chance to court a new ally on a free turn.
const COURT_CHANCE: f64 = 0.3;

/// Allies above this aggression are dropped.
const BETRAYAL_AGGRESSION: f64 = 0.6;

/// Aggression that marks an agent as a coalition target.
const THREAT_AGGRESSION: f64 = 0.3;

/// Chance to lead a coalition against a known threat.
const COALITION_CHANCE: f64 = 0.25;

/// Chance to send tokens to a struggling ally.
const AID_CHANCE: f64 = 0.15;

/// Balance the diplomat keeps before aiding anyone.
const AID_RESERVE: i64 = 10;

/// Cooperative agent that leans on alliances.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiplomatStrategy;

impl DiplomatStrategy {
    fn extended_move(
        observation: &AgentObservation,
        view: &ExtendedView,
        rng: &mut dyn RngCore,
    ) -> Option<Action> {
        let me = observation.self_id;
        let caps = view.capabilities;

        if caps.health && view.self_health.is_some_and(|health| health < REST_BELOW_HEALTH) {
            return Some(Action::new(me, Intent::Rest));
        }

        if !caps.alliances {
            return None;
        }

        let traitor = view
            .allies
            .iter()
            .copied()
            .find(|ally| observation.aggression_of(*ally) > BETRAYAL_AGGRESSION);
        if let Some(partner) = traitor {
            return Some(Action::new(me, Intent::BreakAlliance { partner }));
        }

        let strangers = observation.others().filter(|id| !view.allies.contains(id));
        let threat = first_max_by(strangers, |id| observation.aggression_of(id))
            .filter(|id| observation.aggression_of(*id) > THREAT_AGGRESSION);
        let can_strike = caps.coalition
            && !view.allies.is_empty()
            && observation.self_balance >= observation.rule_int(keys::ATTACK_COST, 5);
        if let Some(target) = threat.filter(|_| can_strike && chance(rng, COALITION_CHANCE)) {
            return Some(Action::new(me, Intent::CoalitionAttack { target }));
        }

        let poorest_ally = first_min_by(view.allies.iter().copied(), |id| observation.balance_of(id));
        let can_aid = caps.trade && observation.self_balance > AID_RESERVE;
        if let Some(partner) = poorest_ally.filter(|_| can_aid && chance(rng, AID_CHANCE)) {
            return Some(Action::new(
                me,
                Intent::Trade {
                    partner,
                    offer: 1,
                    request: 0,
                },
            ));
        }

        if view.allies.len() < DESIRED_ALLIES {
            let strangers = observation.others().filter(|id| !view.allies.contains(id));
            let friend = first_max_by(strangers, |id| observation.trust_of(id));
            if let Some(partner) = friend.filter(|_| chance(rng, COURT_CHANCE)) {
                return Some(Action::new(me, Intent::FormAlliance { partner }));
            }
        }

        None
    }
}

impl DecisionStrategy for DiplomatStrategy {
    fn label(&self) -> &str {
        "diplomat"
    }

    fn decide(
        &mut self,
        observation: &AgentObservation,
        rng: &mut dyn RngCore,
    ) -> Result<Action, ActionRejection> {
        let me = observation.self_id;
        if let Some(proposal) = &observation.pending_proposal {
            let ballot = if proposer_support(observation, proposal.actor) > SUPPORT_THRESHOLD {
                Ballot::Yes
            } else {
                Ballot::No
            };
            return Ok(Action::vote(me, ballot));
        }

        let chosen = observation
            .extended
            .as_ref()
            .and_then(|view| Self::extended_move(observation, view, rng));
        Ok(chosen.unwrap_or_else(|| Action::work(me)))
    }
}
