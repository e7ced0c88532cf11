//! ATTACK: pay to strike another agent, eliminating or wounding it.
//!
//! Resolution flow:
//! 1. The attacker pays `attack_cost` up front.
//! 2. One draw against [`attack_probability`](super::attack_probability).
//! 3. On a hit in base mode the target is eliminated and
//!    `floor(target_balance * attack_loot_ratio)` moves to the attacker.
//! 4. On a hit in health mode the target loses
//!    [`hit_damage`](super::hit_damage) health; only at zero health is it
//!    eliminated and looted.
//! 5. On a miss the attacker pays `attack_fail_penalty` recoil.
//!
//! The cost and recoil are capped at the attacker's balance.

use rand::Rng;

use dilemma_types::{AgentId, AttackDetails, AttackReason, keys};

use super::{ConflictResolver, attack_probability, hit_damage, scale_tokens};
use crate::error::AgentError;
use crate::population::Population;

/// Defaults used when an attack rule is missing.
pub(super) mod defaults {
    pub const COST: i64 = 5;
    pub const SUCCESS_BASE: f64 = 0.12;
    pub const FAIL_PENALTY: i64 = 2;
    pub const LOOT_RATIO: f64 = 0.4;
}

/// Result of landing a hit on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Hit {
    pub eliminated: bool,
    pub damage: Option<i64>,
    pub target_health: Option<i64>,
}

impl ConflictResolver<'_> {
    /// Resolve `actor` attacking `target`.
    ///
    /// Draws: exactly one.
    pub fn resolve_attack<R: Rng + ?Sized>(
        &self,
        actor: AgentId,
        target: AgentId,
        population: &mut Population,
        rng: &mut R,
    ) -> Result<AttackDetails, AgentError> {
        let cost = population.debit_capped(actor, self.rules.int(keys::ATTACK_COST, defaults::COST))?;

        let success_p = attack_probability(
            self.rules.float(keys::ATTACK_SUCCESS_BASE, defaults::SUCCESS_BASE),
            population.strength(actor)?,
            population.strength(target)?,
        );

        if rng.random::<f64>() < success_p {
            let hit = self.land_hit(population.strength(actor)?, target, population)?;
            if !hit.eliminated {
                return Ok(AttackDetails {
                    success: true,
                    reason: AttackReason::TargetWounded,
                    cost,
                    loot: None,
                    penalty: None,
                    damage: hit.damage,
                    target_health: hit.target_health,
                });
            }

            let loot = self.loot(target, population)?;
            population.transfer(target, actor, loot)?;
            return Ok(AttackDetails {
                success: true,
                reason: AttackReason::TargetEliminated,
                cost,
                loot: Some(loot),
                penalty: None,
                damage: hit.damage,
                target_health: hit.target_health,
            });
        }

        let recoil = population.debit_capped(
            actor,
            self.rules.int(keys::ATTACK_FAIL_PENALTY, defaults::FAIL_PENALTY),
        )?;
        Ok(AttackDetails {
            success: false,
            reason: AttackReason::AttackFailed,
            cost,
            loot: None,
            penalty: Some(recoil),
            damage: None,
            target_health: None,
        })
    }

    /// Apply a landed hit of `attack_strength` to `target`, eliminating it
    /// outright in base mode or when its health reaches zero.
    pub(super) fn land_hit(
        &self,
        attack_strength: i64,
        target: AgentId,
        population: &mut Population,
    ) -> Result<Hit, AgentError> {
        if !self.health_mode {
            population.eliminate(target);
            tracing::debug!(agent = %target, "agent eliminated");
            return Ok(Hit {
                eliminated: true,
                damage: None,
                target_health: None,
            });
        }

        let damage = hit_damage(
            self.tuning.attack_base_damage,
            self.tuning.attack_min_damage,
            attack_strength,
            population.strength(target)?,
        );
        let current = population
            .health(target)?
            .unwrap_or(self.tuning.max_health);
        let remaining = population.set_health(
            target,
            current.saturating_sub(damage),
            self.tuning.max_health,
        )?;
        let eliminated = remaining == 0;
        if eliminated {
            population.eliminate(target);
            tracing::debug!(agent = %target, damage, "agent eliminated at zero health");
        }
        Ok(Hit {
            eliminated,
            damage: Some(damage),
            target_health: Some(remaining),
        })
    }

    /// Tokens looted from an eliminated `target`.
    pub(super) fn loot(&self, target: AgentId, population: &Population) -> Result<i64, AgentError> {
        Ok(scale_tokens(
            population.balance(target)?,
            self.rules.float(keys::ATTACK_LOOT_RATIO, defaults::LOOT_RATIO),
        ))
    }
}
