//! REST and MOVE: the deterministic extended actions.

use dilemma_types::{AgentId, MoveDetails, Position, RestDetails};

use super::ConflictResolver;
use crate::error::AgentError;
use crate::population::Population;

impl ConflictResolver<'_> {
    /// Restore up to `rest_heal` health, never above `max_health`.
    ///
    /// Draws: none.
    pub fn resolve_rest(&self, actor: AgentId, population: &mut Population) -> Result<RestDetails, AgentError> {
        let max = self.tuning.max_health;
        let current = population.health(actor)?.unwrap_or(max);
        let heal = self.tuning.rest_heal.min(max.saturating_sub(current)).max(0);
        let new_health = population.set_health(actor, current.saturating_add(heal), max)?;
        Ok(RestDetails {
            success: true,
            heal,
            new_health,
        })
    }

    /// Move `actor` to `to`. Agents without a recorded cell start at the origin.
    ///
    /// Draws: none.
    pub fn resolve_move(
        &self,
        actor: AgentId,
        to: Position,
        population: &mut Population,
    ) -> Result<MoveDetails, AgentError> {
        let from = population.position(actor)?.unwrap_or_default();
        population.set_position(actor, to)?;
        Ok(MoveDetails {
            success: true,
            from,
            to,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dilemma_governance::RuleSet;
    use dilemma_types::{ExtendedTuning, default_rule_table};

    use super::*;
    use crate::population::AgentState;

    fn population(health: i64) -> Population {
        let mut state = AgentState::new(10, 3);
        state.health = Some(health);
        let mut pop = Population::new();
        pop.insert(AgentId::new(0), state);
        pop
    }

    #[test]
    fn rest_heals_a_fixed_amount() {
        let rules = RuleSet::new(default_rule_table());
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), true);
        let mut pop = population(25);

        let details = resolver.resolve_rest(AgentId::new(0), &mut pop).unwrap();
        assert_eq!(details.heal, 10);
        assert_eq!(details.new_health, 35);
    }

    #[test]
    fn rest_stops_at_max_health() {
        let rules = RuleSet::new(default_rule_table());
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), true);
        let mut pop = population(46);

        let first = resolver.resolve_rest(AgentId::new(0), &mut pop).unwrap();
        let second = resolver.resolve_rest(AgentId::new(0), &mut pop).unwrap();
        assert_eq!((first.heal, first.new_health), (4, 50));
        assert_eq!((second.heal, second.new_health), (0, 50));
    }

    #[test]
    fn move_reports_previous_cell() {
        let rules = RuleSet::new(default_rule_table());
        let resolver = ConflictResolver::new(&rules, ExtendedTuning::default(), false);
        let mut pop = population(50);

        let first = resolver.resolve_move(AgentId::new(0), Position(3, 4), &mut pop).unwrap();
        let second = resolver.resolve_move(AgentId::new(0), Position(5, 1), &mut pop).unwrap();
        assert_eq!(first.from, Position(0, 0));
        assert_eq!(second.from, Position(3, 4));
        assert_eq!(pop.position(AgentId::new(0)), Ok(Some(Position(5, 1))));
    }
}
