//! Error types for the dilemma-agents crate.
//!
//! In-turn failures (a missed steal, a refused trade) are outcome values,
//! not errors. These variants only surface when the caller hands the
//! population an agent it does not hold or asks it to break the
//! non-negative balance invariant.

use dilemma_types::AgentId;

/// Errors raised by population bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID is not part of the population.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// A debit would take a balance below zero.
    #[error("insufficient balance for {agent}: wanted {requested} but only have {available}")]
    InsufficientBalance {
        /// The agent being debited.
        agent: AgentId,
        /// The amount the caller tried to remove.
        requested: i64,
        /// The agent's balance at the time.
        available: i64,
    },

    /// A credit or debit was asked to move a negative amount.
    #[error("negative token amount {amount} for {agent}")]
    NegativeAmount {
        /// The agent involved.
        agent: AgentId,
        /// The offending amount.
        amount: i64,
    },
}
