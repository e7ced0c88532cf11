//! Conflict resolution: outcome math for every action kind.
//!
//! Each resolver reads the live rule values, mutates the population, and
//! returns the outcome record that becomes the event's details. Resolvers
//! that need randomness draw from the caller's generator in a fixed order,
//! documented on each method; replaying the same seed and turn order
//! reproduces every draw.
//!
//! Amounts derived from rules are clamped to what the payer holds, so no
//! resolver ever drives a balance below zero.
//!
//! - [`work`] -- WORK income
//! - [`theft`] -- STEAL
//! - [`combat`] -- ATTACK
//! - [`coalition`] -- COALITION_ATTACK
//! - [`trade`] -- TRADE
//! - [`recovery`] -- REST and MOVE

pub mod coalition;
pub mod combat;
pub mod recovery;
pub mod theft;
pub mod trade;
pub mod work;

use dilemma_governance::RuleSet;
use dilemma_types::ExtendedTuning;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Steal success shift per point of strength advantage.
pub const STEAL_STRENGTH_EDGE: f64 = 0.03;

/// Lowest possible steal success probability.
pub const STEAL_MIN_PROBABILITY: f64 = 0.05;

/// Highest possible steal success probability.
pub const STEAL_MAX_PROBABILITY: f64 = 0.9;

/// Attack success shift per point of strength advantage.
pub const ATTACK_STRENGTH_EDGE: f64 = 0.04;

/// Lowest possible attack success probability.
pub const ATTACK_MIN_PROBABILITY: f64 = 0.01;

/// Highest possible solo attack success probability.
pub const ATTACK_MAX_PROBABILITY: f64 = 0.75;

/// Highest possible coalition attack success probability.
pub const COALITION_MAX_PROBABILITY: f64 = 0.95;

// ---------------------------------------------------------------------------
// ConflictResolver
// ---------------------------------------------------------------------------

/// Resolves actions against the current rules.
///
/// Borrowed per action so it always sees the rule values in force at that
/// moment, including changes applied earlier in the same turn.
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver<'a> {
    rules: &'a RuleSet,
    tuning: ExtendedTuning,
    health_mode: bool,
}

impl<'a> ConflictResolver<'a> {
    /// A resolver over `rules`. With `health_mode` set, attacks wound
    /// before they eliminate.
    pub const fn new(rules: &'a RuleSet, tuning: ExtendedTuning, health_mode: bool) -> Self {
        Self {
            rules,
            tuning,
            health_mode,
        }
    }

    /// The rules this resolver reads.
    pub const fn rules(&self) -> &'a RuleSet {
        self.rules
    }
}

// ---------------------------------------------------------------------------
// Probabilities
// ---------------------------------------------------------------------------

/// `clamp(base + 0.03 * (actor - target), 0.05, 0.9)`.
pub fn steal_probability(base: f64, actor_strength: i64, target_strength: i64) -> f64 {
    let edge = strength_gap(actor_strength, target_strength) * STEAL_STRENGTH_EDGE;
    (base + edge).clamp(STEAL_MIN_PROBABILITY, STEAL_MAX_PROBABILITY)
}

/// `clamp(base + 0.04 * (actor - target), 0.01, 0.75)`.
pub fn attack_probability(base: f64, actor_strength: i64, target_strength: i64) -> f64 {
    let edge = strength_gap(actor_strength, target_strength) * ATTACK_STRENGTH_EDGE;
    (base + edge).clamp(ATTACK_MIN_PROBABILITY, ATTACK_MAX_PROBABILITY)
}

/// `clamp(base + 0.04 * (initiator - target) + bonus * (size - 1), 0.01, 0.95)`.
pub fn coalition_probability(
    base: f64,
    initiator_strength: i64,
    target_strength: i64,
    bonus_per_ally: f64,
    coalition_size: usize,
) -> f64 {
    let edge = strength_gap(initiator_strength, target_strength) * ATTACK_STRENGTH_EDGE;
    let allies = usize_to_f64(coalition_size.saturating_sub(1));
    (base + edge + bonus_per_ally * allies).clamp(ATTACK_MIN_PROBABILITY, COALITION_MAX_PROBABILITY)
}

/// `max(min_damage, base_damage + (attacker - target))`.
pub fn hit_damage(base_damage: i64, min_damage: i64, attacker_strength: i64, target_strength: i64) -> i64 {
    base_damage
        .saturating_add(attacker_strength.saturating_sub(target_strength))
        .max(min_damage)
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// `floor(amount * ratio)`, clamped to `[0, amount]`.
#[allow(clippy::cast_possible_truncation)] // bounded by `amount` after the clamp
pub fn scale_tokens(amount: i64, ratio: f64) -> i64 {
    if amount <= 0 || !ratio.is_finite() {
        return 0;
    }
    let scaled = (i64_to_f64(amount) * ratio).floor();
    (scaled as i64).clamp(0, amount)
}

fn strength_gap(actor: i64, target: i64) -> f64 {
    i64_to_f64(actor.saturating_sub(target))
}

#[allow(clippy::cast_precision_loss)] // strengths and balances are small
fn i64_to_f64(value: i64) -> f64 {
    value as f64
}

#[allow(clippy::cast_precision_loss)] // coalition sizes are tiny
fn usize_to_f64(value: usize) -> f64 {
    value as f64
}
