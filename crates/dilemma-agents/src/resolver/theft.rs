//! STEAL: take tokens from another agent, at the risk of penalties.
//!
//! Resolution flow:
//! 1. An empty target ends the attempt (`target_has_no_resources`) with no draw.
//! 2. `take = min(steal_amount, target_balance)`.
//! 3. First draw against [`steal_probability`](super::steal_probability).
//! 4. On success, `take` moves to the thief and a second draw against
//!    `steal_catch_prob` may fine the thief `steal_catch_penalty`.
//! 5. On failure the thief pays `steal_fail_penalty`.
//!
//! Penalties are capped at the thief's balance.

use rand::Rng;

use dilemma_types::{AgentId, StealDetails, StealReason, keys};

use super::{ConflictResolver, steal_probability};
use crate::error::AgentError;
use crate::population::{Population, cap};

/// Defaults used when a steal rule is missing.
mod defaults {
    pub const STEAL_AMOUNT: i64 = 3;
    pub const SUCCESS_BASE: f64 = 0.45;
    pub const CATCH_PROB: f64 = 0.25;
    pub const CATCH_PENALTY: i64 = 2;
    pub const FAIL_PENALTY: i64 = 1;
}

impl ConflictResolver<'_> {
    /// Resolve `actor` stealing from `target`.
    ///
    /// Draws: none for an empty target; one on failure; two on success.
    pub fn resolve_steal<R: Rng + ?Sized>(
        &self,
        actor: AgentId,
        target: AgentId,
        population: &mut Population,
        rng: &mut R,
    ) -> Result<StealDetails, AgentError> {
        let target_balance = population.balance(target)?;
        if target_balance <= 0 {
            return Ok(StealDetails {
                success: false,
                reason: StealReason::TargetHasNoResources,
                amount: 0,
                penalty: None,
            });
        }

        let take = cap(
            self.rules.int(keys::STEAL_AMOUNT, defaults::STEAL_AMOUNT),
            target_balance,
        );
        let success_p = steal_probability(
            self.rules.float(keys::STEAL_SUCCESS_BASE, defaults::SUCCESS_BASE),
            population.strength(actor)?,
            population.strength(target)?,
        );

        if rng.random::<f64>() < success_p {
            population.transfer(target, actor, take)?;

            let catch_p = self.rules.float(keys::STEAL_CATCH_PROB, defaults::CATCH_PROB);
            if rng.random::<f64>() < catch_p {
                let penalty = population.debit_capped(
                    actor,
                    self.rules.int(keys::STEAL_CATCH_PENALTY, defaults::CATCH_PENALTY),
                )?;
                return Ok(StealDetails {
                    success: true,
                    reason: StealReason::CaughtAfterSuccess,
                    amount: take,
                    penalty: Some(penalty),
                });
            }

            return Ok(StealDetails {
                success: true,
                reason: StealReason::CleanSuccess,
                amount: take,
                penalty: None,
            });
        }

        let penalty = population.debit_capped(
            actor,
            self.rules.int(keys::STEAL_FAIL_PENALTY, defaults::FAIL_PENALTY),
        )?;
        Ok(StealDetails {
            success: false,
            reason: StealReason::Failed,
            amount: 0,
            penalty: Some(penalty),
        })
    }
}
