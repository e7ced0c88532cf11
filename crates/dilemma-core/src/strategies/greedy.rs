//! Greedy: work by default, steal from the richest when clearly behind.

use rand::RngCore;

use dilemma_types::{Action, ActionRejection, AgentObservation, Ballot, RuleValue, keys};

use super::{chance, first_max_by, rule_pair};
use crate::decision::DecisionStrategy;

/// Chance to steal from a much richer agent.
const STEAL_CHANCE: f64 = 0.35;

/// Chance to propose a higher work income.
const PROPOSE_CHANCE: f64 = 0.05;

/// Lead the richest agent must have before greedy steals.
const STEAL_MARGIN: i64 = 2;

/// Maximizes its own balance with little regard for anyone else.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyStrategy;

impl GreedyStrategy {
    fn ballot(observation: &AgentObservation, key: &str, value: &RuleValue) -> Ballot {
        if key == keys::WORK_INCOME {
            let [_, current_high] = rule_pair(observation, keys::WORK_INCOME, [2, 4]);
            if matches!(value, RuleValue::Pair([_, high]) if *high >= current_high) {
                return Ballot::Yes;
            }
        }
        if key == keys::STEAL_AMOUNT || key == keys::ATTACK_COST {
            return Ballot::No;
        }
        Ballot::Yes
    }
}

impl DecisionStrategy for GreedyStrategy {
    fn label(&self) -> &str {
        "greedy"
    }

    fn decide(
        &mut self,
        observation: &AgentObservation,
        rng: &mut dyn RngCore,
    ) -> Result<Action, ActionRejection> {
        let me = observation.self_id;
        if let Some(proposal) = &observation.pending_proposal {
            let ballot = Self::ballot(observation, &proposal.key, &proposal.value);
            return Ok(Action::vote(me, ballot));
        }

        let Some(richest) = first_max_by(observation.others(), |id| observation.balance_of(id)) else {
            return Ok(Action::work(me));
        };

        if observation.balance_of(richest) > observation.self_balance.saturating_add(STEAL_MARGIN)
            && observation.self_balance >= observation.rule_int(keys::STEAL_MIN_TOKEN_BALANCE, 0)
            && chance(rng, STEAL_CHANCE)
        {
            return Ok(Action::steal(me, richest));
        }

        if chance(rng, PROPOSE_CHANCE) {
            return Ok(Action::propose(me, keys::WORK_INCOME, [3, 5]));
        }

        Ok(Action::work(me))
    }
}
