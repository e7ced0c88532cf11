//! Built-in decision strategies.
//!
//! Each strategy is a small fixed heuristic over the observation. Every
//! random choice is a single `f64` draw compared against a threshold, made
//! only when the preceding conditions hold, so the number of draws per
//! decision depends on the state and is reproducible.
//!
//! - [`greedy`] -- Works, steals from the richest, backs higher income
//! - [`cheater`] -- Steals relentlessly, retaliates, lobbies for larger thefts
//! - [`politician`] -- Votes on reputation, proposes deterrence
//! - [`warlord`] -- Hunts the weak late in the game
//! - [`diplomat`] -- Allies, trades, rests, and strikes in coalitions

pub mod cheater;
pub mod diplomat;
pub mod greedy;
pub mod politician;
pub mod warlord;

use rand::{Rng, RngCore};

use dilemma_types::{AgentId, AgentObservation, RuleValue};

use crate::decision::{DecisionError, DecisionStrategy, StubStrategy};

pub use cheater::CheaterStrategy;
pub use diplomat::DiplomatStrategy;
pub use greedy::GreedyStrategy;
pub use politician::PoliticianStrategy;
pub use warlord::WarlordStrategy;

/// Names accepted by [`by_name`].
pub const STRATEGY_NAMES: [&str; 6] = ["greedy", "cheater", "politician", "warlord", "diplomat", "stub"];

/// The built-in strategy called `name`.
pub fn by_name(name: &str) -> Result<Box<dyn DecisionStrategy>, DecisionError> {
    let strategy: Box<dyn DecisionStrategy> = match name {
        "greedy" => Box::new(GreedyStrategy),
        "cheater" => Box::new(CheaterStrategy),
        "politician" => Box::new(PoliticianStrategy),
        "warlord" => Box::new(WarlordStrategy),
        "diplomat" => Box::new(DiplomatStrategy),
        "stub" => Box::new(StubStrategy::new()),
        other => {
            return Err(DecisionError::UnknownStrategy {
                name: other.to_owned(),
            });
        }
    };
    Ok(strategy)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// One draw: `true` with probability `p`.
fn chance(rng: &mut dyn RngCore, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// The first candidate with the greatest key.
fn first_max_by<K: PartialOrd>(
    candidates: impl IntoIterator<Item = AgentId>,
    key: impl Fn(AgentId) -> K,
) -> Option<AgentId> {
    let mut best: Option<(AgentId, K)> = None;
    for id in candidates {
        let k = key(id);
        if best.as_ref().is_none_or(|(_, top)| k > *top) {
            best = Some((id, k));
        }
    }
    best.map(|(id, _)| id)
}

/// The first candidate with the smallest key.
fn first_min_by<K: PartialOrd>(
    candidates: impl IntoIterator<Item = AgentId>,
    key: impl Fn(AgentId) -> K,
) -> Option<AgentId> {
    let mut best: Option<(AgentId, K)> = None;
    for id in candidates {
        let k = key(id);
        if best.as_ref().is_none_or(|(_, low)| k < *low) {
            best = Some((id, k));
        }
    }
    best.map(|(id, _)| id)
}

/// The `[low, high]` pair stored under `key`, or `default`.
fn rule_pair(observation: &AgentObservation, key: &str, default: [i64; 2]) -> [i64; 2] {
    match observation.rules.get(key) {
        Some(RuleValue::Pair(pair)) => *pair,
        _ => default,
    }
}

/// Whether the observer ranks in the bottom half of the alive agents.
fn in_bottom_half(observation: &AgentObservation) -> bool {
    usize::try_from(observation.self_rank).unwrap_or(usize::MAX) > observation.alive_ids.len() / 2
}
