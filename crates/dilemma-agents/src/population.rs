//! Per-agent world state: balances, strength, health, position, aliveness.
//!
//! # Invariants
//!
//! - Balances never go below zero: [`Population::debit`] refuses overdrafts.
//! - Strength is fixed at construction.
//! - Health, when tracked, stays within `[0, max_health]`.
//! - The alive set only shrinks; an agent is eliminated at most once.

use std::collections::{BTreeMap, BTreeSet};

use dilemma_types::{AgentId, Position};

use crate::error::AgentError;

// ---------------------------------------------------------------------------
// AgentState
// ---------------------------------------------------------------------------

/// Mutable state of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentState {
    /// Token balance.
    pub balance: i64,
    /// Combat strength, fixed for the whole run.
    pub strength: i64,
    /// Health, when the health capability is on.
    pub health: Option<i64>,
    /// Grid cell, when the movement capability is on.
    pub position: Option<Position>,
}

impl AgentState {
    /// State with a balance and strength and no extended fields.
    pub const fn new(balance: i64, strength: i64) -> Self {
        Self {
            balance,
            strength,
            health: None,
            position: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// All agents of a world, keyed by id, with the alive set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Population {
    agents: BTreeMap<AgentId, AgentState>,
    alive: BTreeSet<AgentId>,
}

impl Population {
    /// An empty population.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            alive: BTreeSet::new(),
        }
    }

    /// Add an alive agent. Negative starting balances are raised to zero.
    pub fn insert(&mut self, id: AgentId, mut state: AgentState) {
        state.balance = state.balance.max(0);
        self.agents.insert(id, state);
        self.alive.insert(id);
    }

    /// Number of agents, alive or not.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the population has no agents at all.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// State of `id`.
    pub fn get(&self, id: AgentId) -> Result<&AgentState, AgentError> {
        self.agents.get(&id).ok_or(AgentError::AgentNotFound(id))
    }

    fn get_mut(&mut self, id: AgentId) -> Result<&mut AgentState, AgentError> {
        self.agents.get_mut(&id).ok_or(AgentError::AgentNotFound(id))
    }

    /// Every agent and its state, ascending by id.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &AgentState)> {
        self.agents.iter().map(|(id, state)| (*id, state))
    }

    /// Token balance of `id`.
    pub fn balance(&self, id: AgentId) -> Result<i64, AgentError> {
        self.get(id).map(|s| s.balance)
    }

    /// Strength of `id`.
    pub fn strength(&self, id: AgentId) -> Result<i64, AgentError> {
        self.get(id).map(|s| s.strength)
    }

    /// Health of `id`, if tracked.
    pub fn health(&self, id: AgentId) -> Result<Option<i64>, AgentError> {
        self.get(id).map(|s| s.health)
    }

    // -----------------------------------------------------------------------
    // Aliveness
    // -----------------------------------------------------------------------

    /// Whether `id` is alive.
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.alive.contains(&id)
    }

    /// The alive set, ascending.
    pub const fn alive(&self) -> &BTreeSet<AgentId> {
        &self.alive
    }

    /// Number of alive agents.
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// `(id, balance)` of every alive agent, ascending by id.
    pub fn alive_balances(&self) -> impl Iterator<Item = (AgentId, i64)> + '_ {
        self.alive
            .iter()
            .filter_map(|id| self.agents.get(id).map(|s| (*id, s.balance)))
    }

    /// Remove `id` from the alive set. Returns `false` if it was already dead.
    pub fn eliminate(&mut self, id: AgentId) -> bool {
        self.alive.remove(&id)
    }

    // -----------------------------------------------------------------------
    // Ranking
    // -----------------------------------------------------------------------

    /// Alive agents by descending balance, ties by ascending id.
    pub fn ranked_alive(&self) -> Vec<AgentId> {
        let mut ranked: Vec<(AgentId, i64)> = self.alive_balances().collect();
        ranked.sort_by(|(a_id, a_bal), (b_id, b_bal)| b_bal.cmp(a_bal).then(a_id.cmp(b_id)));
        ranked.into_iter().map(|(id, _)| id).collect()
    }

    /// 1-based rank of `id` among alive agents, `None` when dead.
    pub fn rank_of(&self, id: AgentId) -> Option<u32> {
        let position = self.ranked_alive().iter().position(|a| *a == id)?;
        u32::try_from(position).ok()?.checked_add(1)
    }

    // -----------------------------------------------------------------------
    // Tokens
    // -----------------------------------------------------------------------

    /// Add `amount` tokens to `id`.
    pub fn credit(&mut self, id: AgentId, amount: i64) -> Result<(), AgentError> {
        if amount < 0 {
            return Err(AgentError::NegativeAmount { agent: id, amount });
        }
        let state = self.get_mut(id)?;
        state.balance = state.balance.saturating_add(amount);
        Ok(())
    }

    /// Remove `amount` tokens from `id`, refusing to overdraw.
    pub fn debit(&mut self, id: AgentId, amount: i64) -> Result<(), AgentError> {
        if amount < 0 {
            return Err(AgentError::NegativeAmount { agent: id, amount });
        }
        let state = self.get_mut(id)?;
        if amount > state.balance {
            return Err(AgentError::InsufficientBalance {
                agent: id,
                requested: amount,
                available: state.balance,
            });
        }
        state.balance = state.balance.saturating_sub(amount);
        Ok(())
    }

    /// Move `amount` tokens from `from` to `to`. Nothing moves on error.
    pub fn transfer(&mut self, from: AgentId, to: AgentId, amount: i64) -> Result<(), AgentError> {
        self.get(to)?;
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Debit up to `amount` from `id`, limited by its balance. Returns what
    /// was actually taken.
    pub fn debit_capped(&mut self, id: AgentId, amount: i64) -> Result<i64, AgentError> {
        let taken = cap(amount, self.balance(id)?);
        self.debit(id, taken)?;
        Ok(taken)
    }

    // -----------------------------------------------------------------------
    // Extended state
    // -----------------------------------------------------------------------

    /// Set the health of `id`, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, id: AgentId, health: i64, max_health: i64) -> Result<i64, AgentError> {
        let state = self.get_mut(id)?;
        let clamped = health.clamp(0, max_health.max(0));
        state.health = Some(clamped);
        Ok(clamped)
    }

    /// Position of `id`, if tracked.
    pub fn position(&self, id: AgentId) -> Result<Option<Position>, AgentError> {
        self.get(id).map(|s| s.position)
    }

    /// Place `id` at `position`.
    pub fn set_position(&mut self, id: AgentId, position: Position) -> Result<(), AgentError> {
        self.get_mut(id)?.position = Some(position);
        Ok(())
    }
}

/// Clamp a rule-derived amount to `[0, available]`.
pub fn cap(amount: i64, available: i64) -> i64 {
    amount.clamp(0, available.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> AgentId {
        AgentId::new(raw)
    }

    fn population(balances: &[i64]) -> Population {
        let mut pop = Population::new();
        for (slot, balance) in (0_u32..).zip(balances) {
            pop.insert(id(slot), AgentState::new(*balance, 5));
        }
        pop
    }

    #[test]
    fn debit_refuses_overdraft() {
        let mut pop = population(&[3]);
        let err = pop.debit(id(0), 4);
        assert_eq!(
            err,
            Err(AgentError::InsufficientBalance {
                agent: id(0),
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(pop.balance(id(0)), Ok(3));
    }

    #[test]
    fn capped_debit_takes_what_is_there() {
        let mut pop = population(&[2]);
        assert_eq!(pop.debit_capped(id(0), 5), Ok(2));
        assert_eq!(pop.balance(id(0)), Ok(0));
        assert_eq!(pop.debit_capped(id(0), 5), Ok(0));
    }

    #[test]
    fn transfer_to_unknown_agent_moves_nothing() {
        let mut pop = population(&[10]);
        assert_eq!(pop.transfer(id(0), id(9), 4), Err(AgentError::AgentNotFound(id(9))));
        assert_eq!(pop.balance(id(0)), Ok(10));
    }

    #[test]
    fn ranking_breaks_ties_by_id() {
        let pop = population(&[5, 9, 9, 1]);
        assert_eq!(pop.ranked_alive(), vec![id(1), id(2), id(0), id(3)]);
        assert_eq!(pop.rank_of(id(2)), Some(2));
        assert_eq!(pop.rank_of(id(3)), Some(4));
    }

    #[test]
    fn dead_agents_have_no_rank_and_die_once() {
        let mut pop = population(&[5, 9]);
        assert!(pop.eliminate(id(1)));
        assert!(!pop.eliminate(id(1)));
        assert_eq!(pop.rank_of(id(1)), None);
        assert_eq!(pop.rank_of(id(0)), Some(1));
        assert_eq!(pop.alive_count(), 1);
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn health_is_clamped() {
        let mut pop = population(&[5]);
        assert_eq!(pop.set_health(id(0), 70, 50), Ok(50));
        assert_eq!(pop.set_health(id(0), -3, 50), Ok(0));
    }
}
