//! Turning configured strategy names into decision strategies.

use crate::config::WorldConfig;
use crate::decision::{DecisionError, DecisionStrategy};
use crate::strategies;

/// Strategies cycled through when no roster is configured.
pub const DEFAULT_ROSTER: [&str; 4] = ["greedy", "cheater", "politician", "warlord"];

/// The strategy name of every slot: the configured roster (or the default
/// one) cycled until `agent_count` slots are filled.
pub fn roster_names(world: &WorldConfig) -> Vec<String> {
    let count = usize::try_from(world.agent_count).unwrap_or(usize::MAX);
    match world.roster.as_deref() {
        Some(names) if !names.is_empty() => names.iter().cycle().take(count).cloned().collect(),
        _ => DEFAULT_ROSTER
            .iter()
            .cycle()
            .take(count)
            .map(|name| (*name).to_owned())
            .collect(),
    }
}

/// One strategy per name, in order.
pub fn build_roster(names: &[String]) -> Result<Vec<Box<dyn DecisionStrategy>>, DecisionError> {
    names.iter().map(|name| strategies::by_name(name)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_cycles_the_four_classics() {
        let world = WorldConfig {
            agent_count: 6,
            ..WorldConfig::default()
        };
        assert_eq!(
            roster_names(&world),
            ["greedy", "cheater", "politician", "warlord", "greedy", "cheater"]
        );
    }

    #[test]
    fn configured_roster_is_cycled_to_the_agent_count() {
        let world = WorldConfig {
            agent_count: 5,
            roster: Some(vec![String::from("diplomat"), String::from("stub")]),
            ..WorldConfig::default()
        };
        let names = roster_names(&world);
        assert_eq!(names, ["diplomat", "stub", "diplomat", "stub", "diplomat"]);

        let built = build_roster(&names).unwrap();
        let labels: Vec<&str> = built.iter().map(|s| s.label()).collect();
        assert_eq!(labels, names);
    }

    #[test]
    fn unknown_names_fail_the_whole_roster() {
        let names = vec![String::from("greedy"), String::from("hermit")];
        assert!(matches!(
            build_roster(&names),
            Err(DecisionError::UnknownStrategy { name }) if name == "hermit"
        ));
    }
}
