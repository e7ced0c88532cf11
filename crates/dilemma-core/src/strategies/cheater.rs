//! Cheater: steal first, retaliate against whoever struck last.

use rand::RngCore;

use dilemma_types::{Action, ActionRejection, AgentObservation, Ballot, keys};

use super::{chance, first_max_by};
use crate::decision::DecisionStrategy;

/// Chance to steal back from the last agent that caused harm.
const RETALIATE_CHANCE: f64 = 0.55;

/// Chance to lobby for a larger steal amount.
const PROPOSE_CHANCE: f64 = 0.08;

/// Weight of distrust when picking a theft target.
const DISTRUST_WEIGHT: f64 = 3.0;

/// Treats theft as the primary income.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheaterStrategy;

impl DecisionStrategy for CheaterStrategy {
    fn label(&self) -> &str {
        "cheater"
    }

    fn decide(
        &mut self,
        observation: &AgentObservation,
        rng: &mut dyn RngCore,
    ) -> Result<Action, ActionRejection> {
        let me = observation.self_id;
        if let Some(proposal) = &observation.pending_proposal {
            let ballot = match proposal.key.as_str() {
                keys::STEAL_AMOUNT | keys::STEAL_SUCCESS_BASE => Ballot::Yes,
                keys::STEAL_CATCH_PENALTY => Ballot::No,
                _ if chance(rng, 0.5) => Ballot::Yes,
                _ => Ballot::No,
            };
            return Ok(Action::vote(me, ballot));
        }

        let culprit = observation
            .last_harm_from
            .filter(|harm| observation.alive_ids.contains(harm));
        if let Some(harm) = culprit.filter(|_| chance(rng, RETALIATE_CHANCE)) {
            return Ok(Action::steal(me, harm));
        }

        let targets = observation.others().filter(|id| observation.balance_of(*id) > 0);
        let target = first_max_by(targets, |id| {
            let distrust = (1.0 - observation.trust_of(id)) * DISTRUST_WEIGHT;
            observation.balance_of(id).saturating_add(truncate(distrust))
        });
        let can_steal = observation.self_balance >= observation.rule_int(keys::STEAL_MIN_TOKEN_BALANCE, 0);
        if let Some(target) = target.filter(|_| can_steal) {
            return Ok(Action::steal(me, target));
        }

        if chance(rng, PROPOSE_CHANCE) {
            let bigger = observation.rule_int(keys::STEAL_AMOUNT, 3).saturating_add(1);
            return Ok(Action::propose(me, keys::STEAL_AMOUNT, bigger));
        }

        Ok(Action::work(me))
    }
}

#[allow(clippy::cast_possible_truncation)] // distrust weight is in [0, 3]
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
