//! Agent-side world logic for the Cheater's Dilemma.
//!
//! Everything here mutates per-agent state without touching I/O: the
//! [`Population`] ledger of balances and vitals, the [`ConflictResolver`]
//! that turns validated actions into outcomes, the [`ReputationBook`] of
//! trust and aggression, and the [`AllianceRegistry`].
//!
//! # Modules
//!
//! - [`alliances`] -- Pairwise alliances ([`AllianceRegistry`])
//! - [`error`] -- Bookkeeping errors ([`AgentError`])
//! - [`population`] -- Balances, strength, health, position, aliveness
//! - [`reputation`] -- Trust and aggression scores ([`ReputationBook`])
//! - [`resolver`] -- Outcome math for every action kind ([`ConflictResolver`])

pub mod alliances;
pub mod error;
pub mod population;
pub mod reputation;
pub mod resolver;

pub use alliances::{Alliance, AllianceRegistry};
pub use error::AgentError;
pub use population::{AgentState, Population, cap};
pub use reputation::ReputationBook;
pub use resolver::{
    ConflictResolver, attack_probability, coalition_probability, hit_damage, scale_tokens,
    steal_probability,
};
