//! Property tests for the engine's run-wide invariants.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;

use dilemma_agents::{
    AgentState, Population, ReputationBook, attack_probability, coalition_probability,
    steal_probability,
};
use dilemma_core::SimulationConfig;
use dilemma_core::World;
use dilemma_governance::{GovernanceSystem, RuleSet};
use dilemma_types::{
    AgentId, Ballot, Capabilities, ProposeReason, RuleValue, default_rule_table, keys,
};

fn config(seed: u64, agents: u32, turns: u32, extended: bool) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.seed = seed;
    config.world.agent_count = agents;
    config.world.max_turns = turns;
    if extended {
        config.features.capabilities = Capabilities::extended();
        config.world.roster = Some(
            ["greedy", "cheater", "politician", "warlord", "diplomat"]
                .map(String::from)
                .to_vec(),
        );
    }
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn same_seed_same_log(seed in any::<u64>(), agents in 5_u32..=12, extended in any::<bool>()) {
        let config = config(seed, agents, 30, extended);
        let a = World::from_config(&config).unwrap().run().unwrap();
        let b = World::from_config(&config).unwrap().run().unwrap();
        prop_assert_eq!(a.log_digest, b.log_digest);
        prop_assert_eq!(a.leaderboard, b.leaderboard);
    }

    #[test]
    fn balances_never_go_negative(seed in any::<u64>(), extended in any::<bool>()) {
        let mut world = World::from_config(&config(seed, 8, 60, extended)).unwrap();
        while world.step().unwrap() {
            for (id, state) in world.population().iter() {
                prop_assert!(state.balance >= 0, "agent {} at {}", id, state.balance);
                if let Some(health) = state.health {
                    prop_assert!((0..=50).contains(&health));
                }
            }
        }
    }

    #[test]
    fn reputation_stays_in_unit_range(seed in any::<u64>(), extended in any::<bool>()) {
        let mut world = World::from_config(&config(seed, 10, 80, extended)).unwrap();
        let snapshot = world.run().unwrap();
        for row in &snapshot.leaderboard {
            prop_assert!((0.0..=1.0).contains(&row.trust));
            prop_assert!((0.0..=1.0).contains(&row.aggression));
        }
    }
}

proptest! {
    #[test]
    fn scripted_reputation_is_clamped(ops in prop::collection::vec((0_u8..3, 0_u32..4, 0_u32..4, any::<bool>()), 0..200)) {
        let mut book = ReputationBook::new();
        book.bootstrap((0..4).map(AgentId::new));
        for (op, actor, target, success) in ops {
            let (actor, target) = (AgentId::new(actor), AgentId::new(target));
            match op {
                0 => book.record_work(actor),
                1 => book.record_steal(actor, target, success),
                _ => book.record_attack(actor, target, success),
            }
        }
        for agent in (0..4).map(AgentId::new) {
            prop_assert!((0.0..=1.0).contains(&book.trust(agent)));
            prop_assert!((0.0..=1.0).contains(&book.aggression(agent)));
        }
    }

    #[test]
    fn probabilities_stay_within_their_bounds(
        base in -1.0_f64..2.0,
        actor in -50_i64..50,
        target in -50_i64..50,
        bonus in 0.0_f64..1.0,
        size in 1_usize..10,
    ) {
        let steal = steal_probability(base, actor, target);
        let attack = attack_probability(base, actor, target);
        let coalition = coalition_probability(base, actor, target, bonus, size);
        prop_assert!((0.05..=0.9).contains(&steal));
        prop_assert!((0.01..=0.75).contains(&attack));
        prop_assert!((0.01..=0.95).contains(&coalition));
    }

    #[test]
    fn ranks_follow_balance_then_id(balances in prop::collection::vec(0_i64..40, 1..15)) {
        let mut population = Population::new();
        for (raw, balance) in (0_u32..).zip(&balances) {
            population.insert(AgentId::new(raw), AgentState::new(*balance, 1));
        }
        let ranked = population.ranked_alive();
        prop_assert_eq!(ranked.len(), balances.len());
        for pair in ranked.windows(2) {
            if let [a, b] = pair {
                let (a_bal, b_bal) = (population.balance(*a).unwrap(), population.balance(*b).unwrap());
                prop_assert!(a_bal > b_bal || (a_bal == b_bal && a < b));
            }
        }
        for (rank, agent) in (1_u32..).zip(&ranked) {
            prop_assert_eq!(population.rank_of(*agent), Some(rank));
        }
    }

    #[test]
    fn at_most_one_proposal_is_pending(
        steps in prop::collection::vec((any::<bool>(), 0_u32..5, 1_i64..10), 1..40),
    ) {
        let mut governance = GovernanceSystem::new(RuleSet::new(default_rule_table()));
        let balances: BTreeMap<AgentId, i64> = (0..5).map(|raw| (AgentId::new(raw), 10)).collect();
        for (turn, (propose, actor, value)) in (1_u32..).zip(steps) {
            let actor = AgentId::new(actor);
            let was_pending = governance.pending().cloned();
            if propose {
                let details = governance.propose(actor, keys::STEAL_AMOUNT, &RuleValue::Int(value), turn);
                if let Some(previous) = was_pending {
                    prop_assert_eq!(details.proposal_reason, ProposeReason::ProposalAlreadyPending);
                    prop_assert_eq!(governance.pending(), Some(&previous));
                } else {
                    prop_assert_eq!(details.proposal_reason, ProposeReason::ProposalRegistered);
                }
            } else {
                governance.vote(actor, Ballot::Yes);
                governance.try_resolve(balances.clone(), turn, false);
            }
        }
    }
}
