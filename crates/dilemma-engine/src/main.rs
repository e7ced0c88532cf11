//! Command-line runner for the Cheater's Dilemma.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line flags
//! 2. Load `dilemma-config.yaml` (or `$DILEMMA_CONFIG`), falling back to
//!    defaults when the file is missing
//! 3. Apply `DILEMMA_*` environment overrides, then the flags
//! 4. Initialize structured logging (tracing)
//! 5. Build the world and run it to completion
//! 6. Print the leaderboard and, with `--export-json`, write the snapshot

mod cli;
mod error;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser as _;
use dilemma_core::config::{CONFIG_FILE, CONFIG_PATH_VAR, LogFormat, LoggingConfig};
use dilemma_core::{SimulationConfig, World};
use dilemma_types::Snapshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::CliArgs;
use crate::error::EngineError;

/// Where the configuration came from.
enum ConfigOrigin {
    /// Parsed from this file.
    File(PathBuf),
    /// This file did not exist; defaults were used.
    Defaults(PathBuf),
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let (mut config, origin) = load_config().context("loading configuration")?;
    args.apply(&mut config);

    init_tracing(&config.logging)?;
    match &origin {
        ConfigOrigin::File(path) => info!(path = %path.display(), "configuration loaded"),
        ConfigOrigin::Defaults(path) => {
            warn!(path = %path.display(), "config file not found, using defaults");
        }
    }
    info!(
        seed = config.world.seed,
        agents = config.world.agent_count,
        max_turns = config.world.max_turns,
        extended = config.features.capabilities.any(),
        "dilemma-engine starting"
    );

    let mut world = World::from_config(&config)
        .map_err(EngineError::from)
        .context("building world")?;
    let snapshot = world
        .run()
        .map_err(EngineError::from)
        .context("running simulation")?;

    print_report(&snapshot);

    if args.export_json {
        let path = export_snapshot(&snapshot, Path::new("."))?;
        println!("\nJSON export written: {}", path.display());
    }
    Ok(())
}

/// Load the config file named by `DILEMMA_CONFIG`, or `dilemma-config.yaml`
/// in the working directory, with environment overrides applied.
fn load_config() -> Result<(SimulationConfig, ConfigOrigin), EngineError> {
    let path = std::env::var_os(CONFIG_PATH_VAR).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, ConfigOrigin::File(path)))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok((config, ConfigOrigin::Defaults(path)))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    let installed = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

fn print_report(snapshot: &Snapshot) {
    println!("=== Leaderboard ===");
    for (rank, row) in (1_u32..).zip(&snapshot.leaderboard) {
        let status = if row.alive { "alive" } else { "eliminated" };
        let health = row
            .health
            .map_or_else(String::new, |health| format!(" health={health}"));
        println!(
            "#{rank:<2} agent {:<2} {:<10} tokens={:<4} strength={:<2} trust={:.4} aggression={:.4}{health} {status}",
            row.agent_id, row.strategy, row.token_balance, row.strength, row.trust, row.aggression,
        );
    }

    println!("\n=== Run ===");
    println!("seed: {}", snapshot.seed);
    println!("turns_completed: {}", snapshot.turns_completed);
    println!("alive: {}", snapshot.alive.len());
    println!("rules_version: {}", snapshot.rules_version);
    println!("events: {}", snapshot.event_count);
    println!("log_digest: {}", snapshot.log_digest);
    if let Some(leader) = snapshot.leader() {
        println!("leader: agent {} ({})", leader.agent_id, leader.strategy);
    }
}

/// Write the snapshot as pretty JSON into `dir`, named after the run.
fn export_snapshot(snapshot: &Snapshot, dir: &Path) -> Result<PathBuf, EngineError> {
    let name = format!(
        "simulation_seed{}_agents{}_turns{}.json",
        snapshot.seed,
        snapshot.leaderboard.len(),
        snapshot.turns_completed
    );
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(snapshot)?;
    match std::fs::write(&path, json) {
        Ok(()) => {
            info!(path = %path.display(), "snapshot exported");
            Ok(path)
        }
        Err(source) => Err(EngineError::Export { path, source }),
    }
}
