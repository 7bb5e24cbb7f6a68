//! Configuration loading and typed config structures for the Chancellor simulation.
//!
//! The canonical configuration lives in `chancellor-config.yaml` at the
//! project root. Each section mirrors one YAML mapping; every field has a
//! default, so an empty file (or no file at all) yields a playable game.
//!
//! Sections owned by other crates ([`FrictionConfig`], [`VoteConfig`],
//! [`LobbyConfig`], [`StanceConfig`], [`RosterConfig`]) are embedded
//! directly so the YAML keys match their field names.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use chancellor_ledger::FrictionConfig;
use chancellor_politics::{LobbyConfig, RosterConfig, StanceConfig, VoteConfig};
use chancellor_types::{DEFAULT_TOTAL_TURNS, FiscalRuleKind, GameMode};

/// Environment variable that overrides `game.seed`.
pub const SEED_ENV_VAR: &str = "CHANCELLOR_SEED";

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// New-game settings.
    #[serde(default)]
    pub game: GameSection,

    /// Roster composition and party discipline.
    #[serde(default)]
    pub legislature: LegislatureConfig,

    /// Legislative friction gate.
    #[serde(default)]
    pub friction: FrictionConfig,

    /// Vote simulator.
    #[serde(default)]
    pub vote: VoteConfig,

    /// Lobbying.
    #[serde(default)]
    pub lobbying: LobbyConfig,

    /// Stance model and its preview.
    #[serde(default)]
    pub stance: StanceSection,

    /// Save-slot and roster storage.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `CHANCELLOR_SEED` overrides `game.seed` when set to a valid integer.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying env overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string, ignoring the environment.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply environment-variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            self.game.apply_seed_override(&val);
        }
    }
}

/// New-game settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameSection {
    /// Seed for roster generation, stance jitter and event rolls.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of monthly turns in a game.
    #[serde(default = "default_total_turns")]
    pub total_turns: u32,

    /// Calendar year of turn 0.
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Calendar month of turn 0, 1--12.
    #[serde(default = "default_start_month")]
    pub start_month: u8,

    /// Game mode.
    #[serde(default)]
    pub mode: GameMode,

    /// Fiscal-rule framework in force at the start.
    #[serde(default = "default_fiscal_rule")]
    pub fiscal_rule: FiscalRuleKind,
}

impl GameSection {
    fn apply_seed_override(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => self.seed = seed,
            Err(_) => warn!(value = raw, "ignoring unparseable {SEED_ENV_VAR}"),
        }
    }
}

const fn default_seed() -> u64 {
    20_240_704
}

const fn default_total_turns() -> u32 {
    DEFAULT_TOTAL_TURNS
}

const fn default_start_year() -> i32 {
    2024
}

const fn default_start_month() -> u8 {
    7
}

const fn default_fiscal_rule() -> FiscalRuleKind {
    FiscalRuleKind::StabilityRule
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            total_turns: default_total_turns(),
            start_year: default_start_year(),
            start_month: default_start_month(),
            mode: GameMode::default(),
            fiscal_rule: default_fiscal_rule(),
        }
    }
}

/// Roster composition and party discipline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegislatureConfig {
    /// Seats per party used when generating a roster.
    #[serde(default)]
    pub composition: RosterConfig,

    /// Party-discipline pressure at the start, 0--1.
    #[serde(default = "default_whip_strength")]
    pub whip_strength: f64,
}

const fn default_whip_strength() -> f64 {
    0.7
}

impl Default for LegislatureConfig {
    fn default() -> Self {
        Self {
            composition: RosterConfig::default(),
            whip_strength: default_whip_strength(),
        }
    }
}

/// Stance model parameters and the interactive preview.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StanceSection {
    /// Scoring parameters.
    #[serde(default)]
    pub model: StanceConfig,

    /// Quiet period before a preview recomputation runs, milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Mean absolute score shift that triggers a bloc recount.
    #[serde(default = "default_materiality_threshold")]
    pub materiality_threshold: f64,
}

impl StanceSection {
    /// The debounce window as a [`Duration`].
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

const fn default_debounce_ms() -> u64 {
    250
}

const fn default_materiality_threshold() -> f64 {
    2.0
}

impl Default for StanceSection {
    fn default() -> Self {
        Self {
            model: StanceConfig::default(),
            debounce_ms: default_debounce_ms(),
            materiality_threshold: default_materiality_threshold(),
        }
    }
}

/// Save-slot and roster storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Prefix of save-slot keys.
    #[serde(default = "default_slot_prefix")]
    pub slot_prefix: String,

    /// Prefix of roster keys.
    #[serde(default = "default_roster_prefix")]
    pub roster_prefix: String,

    /// Slot written by autosave.
    #[serde(default)]
    pub slot: u32,
}

impl PersistenceConfig {
    /// Key of a save slot.
    pub fn slot_key(&self, slot: u32) -> String {
        format!("{}{slot}", self.slot_prefix)
    }

    /// Key of a roster blob.
    pub fn roster_key(&self, roster_id: impl core::fmt::Display) -> String {
        format!("{}{roster_id}", self.roster_prefix)
    }
}

fn default_slot_prefix() -> String {
    "save:slot:".to_owned()
}

fn default_roster_prefix() -> String {
    "roster:".to_owned()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            slot_prefix: default_slot_prefix(),
            roster_prefix: default_roster_prefix(),
            slot: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
