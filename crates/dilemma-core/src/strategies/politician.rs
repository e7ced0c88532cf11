//! Politician: votes on the proposer's reputation and legislates deterrence.

use rand::RngCore;

use dilemma_types::{Action, ActionRejection, AgentId, AgentObservation, Ballot, keys};

use super::{chance, in_bottom_half};
use crate::decision::DecisionStrategy;

/// Minimum proposer standing (`trust - 0.4 * aggression`) for a yes vote.
pub const SUPPORT_THRESHOLD: f64 = 0.3;

/// Weight of aggression against trust when judging a proposer.
const AGGRESSION_WEIGHT: f64 = 0.4;

/// Chance to table a proposal on a free turn.
const PROPOSE_CHANCE: f64 = 0.2;

/// Highest steal catch penalty the politician will ask for.
const CATCH_PENALTY_CAP: i64 = 5;

/// Highest attack cost the politician will ask for.
const ATTACK_COST_CAP: i64 = 10;

/// Works and steers the rules toward harsher penalties.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoliticianStrategy;

/// Standing of `proposer` as seen by `observation`.
pub fn proposer_support(observation: &AgentObservation, proposer: AgentId) -> f64 {
    observation.trust_of(proposer) - AGGRESSION_WEIGHT * observation.aggression_of(proposer)
}

impl DecisionStrategy for PoliticianStrategy {
    fn label(&self) -> &str {
        "politician"
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

        if chance(rng, PROPOSE_CHANCE) {
            if in_bottom_half(observation) {
                let penalty = observation
                    .rule_int(keys::STEAL_CATCH_PENALTY, 2)
                    .saturating_add(1)
                    .min(CATCH_PENALTY_CAP);
                return Ok(Action::propose(me, keys::STEAL_CATCH_PENALTY, penalty));
            }
            let cost = observation
                .rule_int(keys::ATTACK_COST, 5)
                .saturating_add(1)
                .min(ATTACK_COST_CAP);
            return Ok(Action::propose(me, keys::ATTACK_COST, cost));
        }

        Ok(Action::work(me))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    use dilemma_types::{AgentId, Intent, Proposal, ProposalId, RuleValue};

    use super::*;
    use crate::decision::tests::observation;

    fn with_proposal_from(proposer: u32, trust: f64, aggression: f64) -> AgentObservation {
        let mut obs = observation(0, &[0, 1, 2], 10);
        obs.trust_by_agent.insert(AgentId::new(proposer), trust);
        obs.aggression_by_agent.insert(AgentId::new(proposer), aggression);
        obs.pending_proposal = Some(Proposal {
            proposal_id: ProposalId::new(1),
            actor: AgentId::new(proposer),
            turn: 1,
            key: keys::ATTACK_COST.to_owned(),
            value: RuleValue::Int(6),
        });
        obs
    }

    #[test]
    fn backs_reputable_proposers_only() {
        let mut rng = ChaCha12Rng::seed_from_u64(9);
        let trusted = with_proposal_from(1, 0.5, 0.0);
        let feared = with_proposal_from(2, 0.5, 0.6);

        assert_eq!(
            PoliticianStrategy.decide(&trusted, &mut rng).unwrap().intent,
            Intent::VoteRule { ballot: Ballot::Yes }
        );
        assert_eq!(
            PoliticianStrategy.decide(&feared, &mut rng).unwrap().intent,
            Intent::VoteRule { ballot: Ballot::No }
        );
    }

    #[test]
    fn proposals_respect_caps() {
        let mut rng = ChaCha12Rng::seed_from_u64(9);
        let mut obs = observation(0, &[0, 1, 2], 10);
        obs.rules.insert(keys::ATTACK_COST.to_owned(), RuleValue::Int(10));

        for _ in 0..100 {
            let action = PoliticianStrategy.decide(&obs, &mut rng).unwrap();
            if let Intent::ProposeRule { key, value } = action.intent {
                assert_eq!(key, keys::ATTACK_COST);
                assert_eq!(value, RuleValue::Int(10));
                return;
            }
        }
        panic!("no proposal in 100 decisions at p = 0.2");
    }
}
