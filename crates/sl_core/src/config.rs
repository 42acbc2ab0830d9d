//! Engine configuration: embedded defaults plus optional file overrides.
//!
//! The defaults ship compiled into the binary; deployments that need
//! different point values or limits load a YAML file over them.

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::settings::StandingsSettings;

/// Engine defaults YAML (compile-time embedded).
pub const ENGINE_DEFAULTS_YAML: &str = include_str!("../../../data/engine_defaults.yaml");

static DEFAULTS: OnceLock<EngineConfig> = OnceLock::new();

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Ordering applied among teams level on points, goal difference and goals
/// scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreak {
    #[default]
    TeamNameAsc,
    TeamIdAsc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Points schema applied where the tournament tree has none.
    pub default_settings: StandingsSettings,
    /// Counted call-up appearances allowed per destination team.
    pub called_match_limit: u32,
    /// Recent results kept in a standings streak.
    pub streak_length: usize,
    pub tie_break: TieBreak,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_settings: StandingsSettings::default(),
            called_match_limit: 5,
            streak_length: 5,
            tie_break: TieBreak::default(),
        }
    }
}

impl EngineConfig {
    /// Load a config file, with missing keys falling back to the defaults.
    pub fn load_from_path(path: &Path) -> Result<EngineConfig, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: display.clone(), source })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path: display, source })
    }
}

/// Parsed embedded defaults, cached after the first call.
///
/// # Panics
///
/// Panics if the embedded YAML fails to parse, which a normal build cannot
/// produce.
pub fn engine_defaults() -> &'static EngineConfig {
    DEFAULTS.get_or_init(|| {
        serde_yaml::from_str(ENGINE_DEFAULTS_YAML).expect("Embedded engine defaults YAML is corrupted")
    })
}
