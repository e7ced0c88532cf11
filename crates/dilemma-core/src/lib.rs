//! Turn engine, event log, and built-in agents for the Cheater's Dilemma.
//!
//! This crate owns the [`World`] orchestrator that drives a run turn by
//! turn: it asks every alive agent's strategy for an action, validates and
//! resolves it, updates reputation, runs governance, and appends one event
//! per decision to the hash-fingerprinted [`EventLogger`].
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `dilemma-config.yaml` into
//!   strongly-typed structs.
//! - [`decision`] -- [`DecisionStrategy`] trait, [`StubStrategy`], and
//!   [`ScriptedStrategy`].
//! - [`logger`] -- Append-only event log and its SHA-256 digest.
//! - [`roster`] -- Turning strategy names into a seated roster.
//! - [`strategies`] -- The built-in heuristic strategies.
//! - [`world`] -- The turn loop and run summary.
//!
//! [`DecisionStrategy`]: decision::DecisionStrategy
//! [`StubStrategy`]: decision::StubStrategy
//! [`ScriptedStrategy`]: decision::ScriptedStrategy

pub mod config;
pub mod decision;
pub mod logger;
pub mod roster;
pub mod strategies;
pub mod world;

pub use config::SimulationConfig;
pub use logger::EventLogger;
pub use world::{World, WorldError, WorldParams};
