//! End-of-run (or mid-run) summary of a simulation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::enums::ActionKind;
use crate::events::EventRecord;
use crate::ids::AgentId;
use crate::rules::{MutationRecord, RuleTable};

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    /// The agent.
    pub agent_id: AgentId,
    /// Strategy label of the agent's slot.
    pub strategy: String,
    /// Current token balance.
    pub token_balance: i64,
    /// Fixed strength.
    pub strength: i64,
    /// Whether the agent is still alive.
    pub alive: bool,
    /// Trust rounded to four decimals.
    pub trust: f64,
    /// Aggression rounded to four decimals.
    pub aggression: f64,
    /// Current health, in health mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<i64>,
}

/// Full state summary of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Seed the run was built with.
    pub seed: u64,
    /// Turns fully executed.
    pub turns_completed: u32,
    /// Current rule table version.
    pub rules_version: u64,
    /// Every agent, by descending balance then ascending id.
    pub leaderboard: Vec<LeaderboardRow>,
    /// Alive agent ids, ascending.
    pub alive: Vec<AgentId>,
    /// Decisions submitted per action kind, zeros included.
    pub action_counts: BTreeMap<ActionKind, u64>,
    /// Number of events in the log.
    pub event_count: usize,
    /// Hex SHA-256 digest of the event log.
    pub log_digest: String,
    /// The full event log.
    pub events: Vec<EventRecord>,
    /// Current rule values.
    pub rules: RuleTable,
    /// Every applied rule change, oldest first.
    pub rule_history: Vec<MutationRecord>,
}

impl Snapshot {
    /// The leading row, if any agent exists.
    pub fn leader(&self) -> Option<&LeaderboardRow> {
        self.leaderboard.first()
    }
}

/// Round to four decimal places for display.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round4_keeps_four_decimals() {
        assert!((round4(0.123_456) - 0.1235).abs() < 1e-12);
        assert!((round4(0.5) - 0.5).abs() < 1e-12);
    }
}
