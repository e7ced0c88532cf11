//! WORK: a random income from the `work_income` range.

use rand::Rng;

use dilemma_types::{AgentId, WorkDetails, keys};

use super::ConflictResolver;
use crate::error::AgentError;
use crate::population::Population;

/// Income range used when `work_income` is missing.
pub const DEFAULT_WORK_INCOME: (i64, i64) = (2, 4);

impl ConflictResolver<'_> {
    /// Credit `actor` with a uniform integer from the inclusive
    /// `work_income` range.
    ///
    /// Draws: exactly one integer. A range reaching below zero still draws
    /// over the full range, but negative results credit nothing.
    pub fn resolve_work<R: Rng + ?Sized>(
        &self,
        actor: AgentId,
        population: &mut Population,
        rng: &mut R,
    ) -> Result<WorkDetails, AgentError> {
        let (low, high) = self.rules.pair(keys::WORK_INCOME, DEFAULT_WORK_INCOME);
        let gain = rng.random_range(low..=high).max(0);
        population.credit(actor, gain)?;
        Ok(WorkDetails {
            success: true,
            gain,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    use dilemma_governance::RuleSet;
    use dilemma_types::{ExtendedTuning, RuleValue, default_rule_table};

    use super::*;
    use crate::population::AgentState;

    #[test]
    fn income_stays_within_the_rule_range() {
        let rules = RuleSet::new(default_rule_table());
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), false);
        let mut population = Population::new();
        population.insert(AgentId::new(0), AgentState::new(0, 5));
        let mut rng = ChaCha12Rng::seed_from_u64(7);

        let mut total = 0_i64;
        for _ in 0..100 {
            let Ok(details) = resolver.resolve_work(AgentId::new(0), &mut population, &mut rng) else {
                return;
            };
            assert!((2..=4).contains(&details.gain));
            total = total.saturating_add(details.gain);
        }
        assert_eq!(population.balance(AgentId::new(0)), Ok(total));
    }

    #[test]
    fn negative_income_credits_nothing() {
        let mut table = default_rule_table();
        table.insert(keys::WORK_INCOME.to_owned(), RuleValue::Pair([-5, -1]));
        let rules = RuleSet::new(table);
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), false);
        let mut population = Population::new();
        population.insert(AgentId::new(0), AgentState::new(3, 5));
        let mut rng = ChaCha12Rng::seed_from_u64(1);

        let details = resolver.resolve_work(AgentId::new(0), &mut population, &mut rng);
        assert_eq!(details.map(|d| d.gain), Ok(0));
        assert_eq!(population.balance(AgentId::new(0)), Ok(3));
    }
}
