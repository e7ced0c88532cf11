//! Shared type definitions for the Cheater's Dilemma turn engine.
//!
//! Every crate in the workspace speaks these types: agents submit
//! [`Action`]s after reading an [`AgentObservation`], the resolvers return
//! outcome records, and the world logs [`EventRecord`]s and summarizes a
//! run as a [`Snapshot`].
//!
//! # Modules
//!
//! - [`ids`] -- Integer newtype identifiers
//! - [`enums`] -- Action kinds, ballots, outcome labels
//! - [`rules`] -- Rule table values and mutation history
//! - [`capabilities`] -- Optional extended mechanics and their tuning
//! - [`actions`] -- The closed action type and its raw boundary form
//! - [`observation`] -- Per-turn agent observation and pending proposal
//! - [`outcomes`] -- Resolver and governance outcome records
//! - [`events`] -- Event log records
//! - [`snapshot`] -- Run summary

pub mod actions;
pub mod capabilities;
pub mod enums;
pub mod events;
pub mod ids;
pub mod observation;
pub mod outcomes;
pub mod rules;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionRejection, Intent, RawAction, RejectReason};
pub use capabilities::{Capabilities, ExtendedTuning, Position};
pub use enums::{ActionKind, Ballot, Outcome};
pub use events::{DetailBody, EventDetails, EventRecord, RULE_CHANGE, RULE_VOTE_RESULT};
pub use ids::{AgentId, ProposalId};
pub use observation::{AgentObservation, ExtendedView, Proposal};
pub use outcomes::{
    AllianceDetails, AllianceReason, AttackDetails, AttackReason, CoalitionDetails,
    MoveDetails, ProposalDetails, ProposeReason, ResolutionDetails, RestDetails, StealDetails,
    StealReason, TradeDetails, TradeReason, VoteDetails, VoteReason, WorkDetails,
};
pub use rules::{KeyRange, MutationRecord, RuleTable, RuleValue, default_rule_table, keys};
pub use snapshot::{LeaderboardRow, Snapshot, round4};
