//! Configuration loading and typed config structures for the Cheater's Dilemma.
//!
//! The canonical configuration lives in `dilemma-config.yaml` in the
//! working directory. Every section and field has a default, so an empty
//! file (or no file) yields the reference setup: 10 agents, seed 42, 500
//! turns, the default rule table, and no extended mechanics.
//!
//! Environment variables are applied after parsing:
//! - `DILEMMA_SEED` overrides `world.seed`
//! - `DILEMMA_AGENTS` overrides `world.agent_count`
//! - `DILEMMA_MAX_TURNS` overrides `world.max_turns`
//! - `DILEMMA_EXTENDED` (`1` or `true`) turns on every capability

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use dilemma_types::{Capabilities, ExtendedTuning, RuleTable, default_rule_table};

/// Default config file name.
pub const CONFIG_FILE: &str = "dilemma-config.yaml";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_VAR: &str = "DILEMMA_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override did not parse.
    #[error("invalid value {value:?} for {name}")]
    InvalidOverride {
        /// The environment variable.
        name: &'static str,
        /// The value it held.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `dilemma-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Population, seed, and turn budget.
    #[serde(default)]
    pub world: WorldConfig,

    /// Rule values overriding the default rule table, key by key.
    #[serde(default)]
    pub rules: RuleTable,

    /// Extended mechanics and their tuning.
    #[serde(default)]
    pub features: FeaturesConfig,

    /// Diagnostic logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] for a malformed override.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The full rule table: defaults with the configured values laid over.
    pub fn rule_table(&self) -> RuleTable {
        let mut table = default_rule_table();
        table.extend(self.rules.iter().map(|(key, value)| (key.clone(), value.clone())));
        table
    }

    /// Apply the `DILEMMA_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to
    /// its value when set.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(seed) = parse_override(&lookup, "DILEMMA_SEED")? {
            self.world.seed = seed;
        }
        if let Some(count) = parse_override(&lookup, "DILEMMA_AGENTS")? {
            self.world.agent_count = count;
        }
        if let Some(turns) = parse_override(&lookup, "DILEMMA_MAX_TURNS")? {
            self.world.max_turns = turns;
        }
        let extended = lookup("DILEMMA_EXTENDED")
            .is_some_and(|flag| matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        if extended {
            self.features.capabilities = Capabilities::extended();
        }
        Ok(())
    }
}

fn parse_override<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidOverride { name, value }),
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of agents in the run.
    #[serde(default = "default_agent_count")]
    pub agent_count: u32,

    /// Smallest accepted population.
    #[serde(default = "default_min_agents")]
    pub min_agents: u32,

    /// Largest accepted population.
    #[serde(default = "default_max_agents")]
    pub max_agents: u32,

    /// Turn budget.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Inclusive range of starting balances.
    #[serde(default = "default_initial_balance_range")]
    pub initial_balance_range: [i64; 2],

    /// Inclusive range of strengths.
    #[serde(default = "default_strength_range")]
    pub strength_range: [i64; 2],

    /// Strategy names, cycled to fill `agent_count`. Defaults to greedy,
    /// cheater, politician, warlord.
    #[serde(default)]
    pub roster: Option<Vec<String>>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            agent_count: default_agent_count(),
            min_agents: default_min_agents(),
            max_agents: default_max_agents(),
            max_turns: default_max_turns(),
            initial_balance_range: default_initial_balance_range(),
            strength_range: default_strength_range(),
            roster: None,
        }
    }
}

/// Extended mechanics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct FeaturesConfig {
    /// Which mechanics are on.
    #[serde(default)]
    pub capabilities: Capabilities,

    /// Numeric parameters of those mechanics.
    #[serde(default)]
    pub tuning: ExtendedTuning,
}

/// Output format of diagnostic logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_agent_count() -> u32 {
    10
}

const fn default_min_agents() -> u32 {
    5
}

const fn default_max_agents() -> u32 {
    20
}

const fn default_max_turns() -> u32 {
    500
}

const fn default_initial_balance_range() -> [i64; 2] {
    [10, 30]
}

const fn default_strength_range() -> [i64; 2] {
    [1, 10]
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use dilemma_types::{RuleValue, keys};

    use super::*;

    #[test]
    fn default_config_is_the_reference_setup() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.agent_count, 10);
        assert_eq!(config.world.max_turns, 500);
        assert_eq!(config.world.initial_balance_range, [10, 30]);
        assert_eq!(config.features.capabilities, Capabilities::base());
        assert_eq!(config.rule_table(), default_rule_table());
    }

    #[test]
    fn empty_yaml_is_valid() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  seed: 7
  agent_count: 6
  max_turns: 50
  strength_range: [2, 4]
  roster: [warlord, diplomat]

rules:
  attack_cost: 8
  work_income: [1, 6]
  allow_steal: false

features:
  capabilities:
    health: true
    alliances: true
  tuning:
    max_health: 80

logging:
  level: debug
  format: json
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.agent_count, 6);
        assert_eq!(config.world.min_agents, 5);
        assert_eq!(config.world.strength_range, [2, 4]);
        assert_eq!(
            config.world.roster,
            Some(vec![String::from("warlord"), String::from("diplomat")])
        );
        assert!(config.features.capabilities.health);
        assert!(!config.features.capabilities.trade);
        assert_eq!(config.features.tuning.max_health, 80);
        assert_eq!(config.features.tuning.rest_heal, 10);
        assert_eq!(config.logging.format, LogFormat::Json);

        let table = config.rule_table();
        assert_eq!(table.get(keys::ATTACK_COST), Some(&RuleValue::Int(8)));
        assert_eq!(table.get(keys::WORK_INCOME), Some(&RuleValue::Pair([1, 6])));
        assert_eq!(table.get(keys::ALLOW_STEAL), Some(&RuleValue::Flag(false)));
        assert_eq!(table.get(keys::STEAL_AMOUNT), Some(&RuleValue::Int(3)));
    }

    #[test]
    fn overrides_replace_parsed_values() {
        let vars = BTreeMap::from([
            ("DILEMMA_SEED", "99"),
            ("DILEMMA_AGENTS", "12"),
            ("DILEMMA_EXTENDED", "true"),
        ]);
        let mut config = SimulationConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.world.seed, 99);
        assert_eq!(config.world.agent_count, 12);
        assert_eq!(config.world.max_turns, 500);
        assert_eq!(config.features.capabilities, Capabilities::extended());
    }

    #[test]
    fn malformed_override_is_an_error() {
        let mut config = SimulationConfig::default();
        let result = config.apply_overrides(|name| (name == "DILEMMA_MAX_TURNS").then(|| String::from("lots")));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOverride {
                name: "DILEMMA_MAX_TURNS",
                ..
            })
        ));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = SimulationConfig::parse(include_str!("../../../dilemma-config.yaml")).unwrap();
        let defaults = SimulationConfig::default();
        assert_eq!(shipped.rule_table(), defaults.rule_table());
        assert_eq!(shipped.features, defaults.features);
        assert_eq!(shipped.logging, defaults.logging);
        assert_eq!(shipped.world.seed, defaults.world.seed);
        assert_eq!(shipped.world.agent_count, defaults.world.agent_count);
    }
}
