//! COALITION_ATTACK: an initiator and its allies strike one target together.
//!
//! Participants are the initiator followed by every alive, active ally
//! (never the target itself) whose balance covers `attack_cost`, in
//! ascending id order. Everyone pays the cost; one draw decides the hit.
//! Success probability gains `coalition_bonus_per_ally` for each ally and
//! caps at [`COALITION_MAX_PROBABILITY`](super::COALITION_MAX_PROBABILITY).
//! In health mode the hit uses the combined strength of all participants.
//! Loot on elimination is split evenly; the indivisible remainder stays
//! with the target. On a miss every participant pays its own recoil.

use std::collections::BTreeSet;

use rand::Rng;

use dilemma_types::{AgentId, AttackReason, CoalitionDetails, keys};

use super::combat::defaults;
use super::{ConflictResolver, coalition_probability};
use crate::error::AgentError;
use crate::population::Population;

impl ConflictResolver<'_> {
    /// The allies of `initiator` able to join an attack on `target`.
    pub fn coalition_allies(
        &self,
        target: AgentId,
        allies: &BTreeSet<AgentId>,
        population: &Population,
    ) -> Result<Vec<AgentId>, AgentError> {
        let cost = self.rules.int(keys::ATTACK_COST, defaults::COST).max(0);
        let mut able = Vec::new();
        for &ally in allies {
            if ally != target && population.is_alive(ally) && population.balance(ally)? >= cost {
                able.push(ally);
            }
        }
        Ok(able)
    }

    /// Resolve `initiator` and `allies` attacking `target`.
    ///
    /// Draws: exactly one.
    pub fn resolve_coalition_attack<R: Rng + ?Sized>(
        &self,
        initiator: AgentId,
        allies: &[AgentId],
        target: AgentId,
        population: &mut Population,
        rng: &mut R,
    ) -> Result<CoalitionDetails, AgentError> {
        let participants: Vec<AgentId> = core::iter::once(initiator)
            .chain(allies.iter().copied())
            .collect();
        let size = participants.len();
        let coalition_size = u32::try_from(size).unwrap_or(u32::MAX);

        let cost = self.rules.int(keys::ATTACK_COST, defaults::COST);
        let mut combined_strength = 0_i64;
        for &member in &participants {
            population.debit_capped(member, cost)?;
            combined_strength = combined_strength.saturating_add(population.strength(member)?);
        }

        let success_p = coalition_probability(
            self.rules.float(keys::ATTACK_SUCCESS_BASE, defaults::SUCCESS_BASE),
            population.strength(initiator)?,
            population.strength(target)?,
            self.tuning.coalition_bonus_per_ally,
            size,
        );

        if rng.random::<f64>() < success_p {
            let hit = self.land_hit(combined_strength, target, population)?;
            if !hit.eliminated {
                return Ok(CoalitionDetails {
                    success: true,
                    reason: AttackReason::TargetWounded,
                    participants,
                    coalition_size,
                    loot: None,
                    loot_per_actor: None,
                    penalty: None,
                    damage: hit.damage,
                    target_health: hit.target_health,
                });
            }

            let loot = self.loot(target, population)?;
            let share = loot
                .checked_div(i64::try_from(size).unwrap_or(i64::MAX))
                .unwrap_or(0);
            for &member in &participants {
                population.transfer(target, member, share)?;
            }
            tracing::debug!(
                agent = %target,
                coalition_size,
                loot,
                "coalition eliminated target"
            );
            return Ok(CoalitionDetails {
                success: true,
                reason: AttackReason::TargetEliminated,
                participants,
                coalition_size,
                loot: Some(loot),
                loot_per_actor: Some(share),
                penalty: None,
                damage: hit.damage,
                target_health: hit.target_health,
            });
        }

        let recoil = self.rules.int(keys::ATTACK_FAIL_PENALTY, defaults::FAIL_PENALTY);
        let mut paid = 0_i64;
        for &member in &participants {
            paid = paid.saturating_add(population.debit_capped(member, recoil)?);
        }
        Ok(CoalitionDetails {
            success: false,
            reason: AttackReason::AttackFailed,
            participants,
            coalition_size,
            loot: None,
            loot_per_actor: None,
            penalty: Some(paid),
            damage: None,
            target_health: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    use dilemma_governance::RuleSet;
    use dilemma_types::{ExtendedTuning, RuleTable, RuleValue, default_rule_table};

    use super::*;
    use crate::population::AgentState;

    fn id(raw: u32) -> AgentId {
        AgentId::new(raw)
    }

    fn rules(base: f64) -> RuleSet {
        let mut table: RuleTable = default_rule_table();
        table.insert(keys::ATTACK_SUCCESS_BASE.to_owned(), RuleValue::Float(base));
        RuleSet::new(table)
    }

    /// Initiator 0, allies 1 and 2, target 3, broke ally 4.
    fn population() -> Population {
        let mut pop = Population::new();
        pop.insert(id(0), AgentState::new(20, 4));
        pop.insert(id(1), AgentState::new(10, 4));
        pop.insert(id(2), AgentState::new(6, 4));
        pop.insert(id(3), AgentState::new(25, 4));
        pop.insert(id(4), AgentState::new(2, 4));
        pop
    }

    #[test]
    fn only_alive_solvent_allies_join() {
        let rules = rules(0.12);
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), false);
        let mut pop = population();
        pop.eliminate(id(2));
        let allies = BTreeSet::from([id(1), id(2), id(3), id(4)]);

        let able = resolver.coalition_allies(id(3), &allies, &pop).unwrap();
        assert_eq!(able, vec![id(1)]);
    }

    #[test]
    fn elimination_splits_loot_evenly() {
        let rules = rules(0.9);
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), false);
        let mut rng = ChaCha12Rng::seed_from_u64(21);

        for _ in 0..50 {
            let mut pop = population();
            let details = resolver
                .resolve_coalition_attack(id(0), &[id(1), id(2)], id(3), &mut pop, &mut rng)
                .unwrap();
            if !details.success {
                continue;
            }
            // floor(25 * 0.4) = 10 split three ways: 3 each, 1 stays.
            assert_eq!(details.coalition_size, 3);
            assert_eq!(details.loot, Some(10));
            assert_eq!(details.loot_per_actor, Some(3));
            assert_eq!(pop.balance(id(3)), Ok(16));
            assert_eq!(pop.balance(id(0)), Ok(18));
            assert_eq!(pop.balance(id(2)), Ok(4));
            assert!(!pop.is_alive(id(3)));
            return;
        }
        panic!("no coalition success in 50 attempts at p = 0.95");
    }

    #[test]
    fn miss_charges_every_participant() {
        let rules = rules(-5.0);
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), false);
        let mut rng = ChaCha12Rng::seed_from_u64(2);

        for _ in 0..50 {
            let mut pop = population();
            let details = resolver
                .resolve_coalition_attack(id(0), &[id(1)], id(3), &mut pop, &mut rng)
                .unwrap();
            if details.success {
                continue;
            }
            assert_eq!(details.reason, AttackReason::AttackFailed);
            assert_eq!(details.penalty, Some(4));
            assert_eq!(pop.balance(id(0)), Ok(13));
            assert_eq!(pop.balance(id(1)), Ok(3));
            assert!(pop.is_alive(id(3)));
            return;
        }
        panic!("no coalition miss in 50 attempts");
    }

    #[test]
    fn health_mode_uses_combined_strength() {
        let rules = rules(0.9);
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), true);
        let mut rng = ChaCha12Rng::seed_from_u64(8);

        for _ in 0..50 {
            let mut pop = population();
            pop.set_health(id(3), 50, 50).unwrap();
            let details = resolver
                .resolve_coalition_attack(id(0), &[id(1)], id(3), &mut pop, &mut rng)
                .unwrap();
            if !details.success {
                continue;
            }
            // 20 + (4 + 4 - 4) = 24 damage.
            assert_eq!(details.damage, Some(24));
            assert_eq!(details.target_health, Some(26));
            assert_eq!(details.reason, AttackReason::TargetWounded);
            return;
        }
        panic!("no coalition hit in 50 attempts");
    }
}
