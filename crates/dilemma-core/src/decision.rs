//! The decision contract between the world and its agents.
//!
//! Each turn the world hands every alive agent a fresh
//! [`AgentObservation`] and the run's random generator, and asks its
//! [`DecisionStrategy`] for one [`Action`]. A strategy that cannot form a
//! well-typed action returns an [`ActionRejection`] instead; the world logs
//! it as `blocked` and moves on.

use std::collections::VecDeque;

use rand::RngCore;

use dilemma_types::{Action, ActionRejection, AgentObservation, RawAction};

/// Errors raised while assembling strategies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    /// No built-in strategy has the requested name.
    #[error("unknown strategy: {name}")]
    UnknownStrategy {
        /// The name that failed to resolve.
        name: String,
    },
}

/// A source of decisions for one agent.
///
/// Implementations must be deterministic given the observation and the
/// generator: all randomness comes from `rng`, drawn in a fixed order.
pub trait DecisionStrategy {
    /// Display label recorded on the leaderboard.
    fn label(&self) -> &str;

    /// Choose this turn's action.
    fn decide(
        &mut self,
        observation: &AgentObservation,
        rng: &mut dyn RngCore,
    ) -> Result<Action, ActionRejection>;
}

/// A strategy that always does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubStrategy;

impl StubStrategy {
    /// Create a new stub strategy.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionStrategy for StubStrategy {
    fn label(&self) -> &str {
        "stub"
    }

    fn decide(
        &mut self,
        observation: &AgentObservation,
        _rng: &mut dyn RngCore,
    ) -> Result<Action, ActionRejection> {
        Ok(Action::idle(observation.self_id))
    }
}

/// Replays queued raw actions, one per turn, then does nothing.
///
/// The actor field of each queued action is replaced with the observer's
/// id before conversion.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStrategy {
    label: String,
    script: VecDeque<RawAction>,
}

impl ScriptedStrategy {
    /// A script labelled `label` that plays `script` in order.
    pub fn new(label: &str, script: impl IntoIterator<Item = RawAction>) -> Self {
        Self {
            label: label.to_owned(),
            script: script.into_iter().collect(),
        }
    }
}

impl DecisionStrategy for ScriptedStrategy {
    fn label(&self) -> &str {
        &self.label
    }

    fn decide(
        &mut self,
        observation: &AgentObservation,
        _rng: &mut dyn RngCore,
    ) -> Result<Action, ActionRejection> {
        match self.script.pop_front() {
            Some(mut raw) => {
                raw.actor = observation.self_id;
                Action::try_from(raw)
            }
            None => Ok(Action::idle(observation.self_id)),
        }
    }
}
