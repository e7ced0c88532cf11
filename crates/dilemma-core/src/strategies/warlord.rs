//! Warlord: builds a war chest, then eliminates the weak.

use rand::RngCore;

use dilemma_types::{Action, ActionRejection, AgentObservation, Ballot, RuleValue, keys};

use super::{chance, first_max_by, first_min_by};
use crate::decision::DecisionStrategy;

/// Chance to attack once the game is down to its last few agents.
const LATE_ATTACK_CHANCE: f64 = 0.55;

/// Chance of an opportunistic attack when holding twice the attack cost.
const EARLY_ATTACK_CHANCE: f64 = 0.04;

/// Chance to propose easier attacks.
const PROPOSE_CHANCE: f64 = 0.1;

/// Chance to steal from the richest agent.
const STEAL_CHANCE: f64 = 0.3;

/// Ceiling on the attack success base the warlord proposes.
const SUCCESS_BASE_CAP: f64 = 0.4;

/// Step added to the attack success base per proposal.
const SUCCESS_BASE_STEP: f64 = 0.02;

/// Late game starts at this many alive agents or fewer.
const LATE_GAME_FLOOR: usize = 3;

/// Prefers force; saves up, then attacks the weakest.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarlordStrategy;

impl DecisionStrategy for WarlordStrategy {
    fn label(&self) -> &str {
        "warlord"
    }

    fn decide(
        &mut self,
        observation: &AgentObservation,
        rng: &mut dyn RngCore,
    ) -> Result<Action, ActionRejection> {
        let me = observation.self_id;
        if let Some(proposal) = &observation.pending_proposal {
            let ballot = if proposal.key == keys::ATTACK_SUCCESS_BASE {
                Ballot::Yes
            } else {
                Ballot::No
            };
            return Ok(Action::vote(me, ballot));
        }

        if observation.others().next().is_none() {
            return Ok(Action::work(me));
        }

        let attack_cost = observation.rule_int(keys::ATTACK_COST, 5);
        let late_game = observation.alive_ids.len()
            <= LATE_GAME_FLOOR.max(observation.balance_by_agent.len() / 3);

        let can_attack = observation.self_balance >= attack_cost;
        let softest = first_min_by(observation.others(), |id| {
            observation.strength_of(id).saturating_add(observation.balance_of(id))
        });
        if let Some(prey) = softest.filter(|_| late_game && can_attack && chance(rng, LATE_ATTACK_CHANCE)) {
            return Ok(Action::attack(me, prey));
        }

        let flush = observation.self_balance >= attack_cost.saturating_mul(2);
        let weakest = first_min_by(observation.others(), |id| observation.strength_of(id));
        if let Some(prey) = weakest.filter(|_| flush && chance(rng, EARLY_ATTACK_CHANCE)) {
            return Ok(Action::attack(me, prey));
        }

        if chance(rng, PROPOSE_CHANCE) {
            let base = (observation.rule_float(keys::ATTACK_SUCCESS_BASE, 0.12) + SUCCESS_BASE_STEP)
                .min(SUCCESS_BASE_CAP);
            return Ok(Action::propose(me, keys::ATTACK_SUCCESS_BASE, RuleValue::Float(base)));
        }

        let richest = first_max_by(observation.others(), |id| observation.balance_of(id));
        if let Some(mark) = richest.filter(|_| chance(rng, STEAL_CHANCE)) {
            return Ok(Action::steal(me, mark));
        }

        Ok(Action::work(me))
    }
}
