//! Command-line flags.
//!
//! Flags override both the config file and the `DILEMMA_*` environment.

use clap::Parser;

use dilemma_core::SimulationConfig;
use dilemma_types::Capabilities;

/// Parsed command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(
    name = "dilemma-engine",
    about = "Run one Cheater's Dilemma simulation and print the leaderboard"
)]
#[command(version)]
pub struct CliArgs {
    /// Seed for the run's random generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of agents to create.
    #[arg(long)]
    pub agents: Option<u32>,

    /// Turn limit.
    #[arg(long)]
    pub turns: Option<u32>,

    /// Enable every extended mechanic.
    #[arg(long)]
    pub extended: bool,

    /// Write the full snapshot to a JSON file in the working directory.
    #[arg(long)]
    pub export_json: bool,
}

impl CliArgs {
    /// Lay the flags over `config`.
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
        if let Some(agents) = self.agents {
            config.world.agent_count = agents;
        }
        if let Some(turns) = self.turns {
            config.world.max_turns = turns;
        }
        if self.extended {
            config.features.capabilities = Capabilities::extended();
        }
    }
}
