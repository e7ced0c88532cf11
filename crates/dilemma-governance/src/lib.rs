//! Rules and governance for the Cheater's Dilemma.
//!
//! The [`RuleSet`] owns the live parameter table, its version counter and
//! mutation history, and decides whether an action is legal. The
//! [`GovernanceSystem`] runs the single-proposal, token-weighted voting
//! state machine on top of it; a passing proposal is the only way a rule
//! value ever changes.
//!
//! # Modules
//!
//! - [`rules`] -- The rule table, typed lookups, and mutation
//! - [`validation`] -- Action legality and the reasons it reports
//! - [`governance`] -- Proposal, vote, and resolution state machine

pub mod governance;
pub mod rules;
pub mod validation;

pub use governance::{GovernanceSystem, Resolution, ResolvedProposal, Tally};
pub use rules::{INITIAL_VERSION, MutationRejection, RuleSet};
pub use validation::{AllowReason, BlockReason, ValidationContext, Verdict};
