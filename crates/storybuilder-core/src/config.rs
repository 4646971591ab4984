// Configuration loading and validation (storybuilder.toml).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::game::GameRules;

/// Name of the configuration file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "storybuilder.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub rules: RulesConfig,
    pub vote: VotePolicy,
}

/// Default rules for games started in a room.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RulesConfig {
    pub turn_time_limit: u32,
    pub max_entry_length: usize,
    #[serde(default)]
    pub entries_count: u32,
}

impl From<&RulesConfig> for GameRules {
    fn from(rules: &RulesConfig) -> Self {
        GameRules {
            turn_time_limit: rules.turn_time_limit,
            max_entry_length: rules.max_entry_length,
            entries_count: rules.entries_count,
        }
    }
}

/// How vote kicks are decided.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VotePolicy {
    /// Share of players that must vote for a kick, in (0, 1].
    pub acceptance_ratio: f64,
    /// Seconds before an unsuccessful vote is dismissed.
    pub time_limit: u32,
}

impl Default for VotePolicy {
    fn default() -> Self {
        VotePolicy {
            acceptance_ratio: 0.65,
            time_limit: 60,
        }
    }
}

impl Config {
    pub fn game_rules(&self) -> GameRules {
        GameRules::from(&self.rules)
    }
}

impl Default for Config {
    fn default() -> Self {
        let rules = GameRules::default();
        Config {
            rules: RulesConfig {
                turn_time_limit: rules.turn_time_limit,
                max_entry_length: rules.max_entry_length,
                entries_count: rules.entries_count,
            },
            vote: VotePolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/storybuilder.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = std::fs::read_to_string(&path).map_err(|_| ConfigError::FileNotFound {
        path: path.clone(),
    })?;
    let config = parse_config(&text).map_err(|source| ConfigError::ParseError {
        path: path.clone(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Copy `defaults/storybuilder.toml` into `config/` if it is not there yet.
/// Returns the path of the copied file, if a copy was made.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} found; run from the project root",
                target.display(),
                source.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;
    Ok(Some(target))
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying the defaults first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let ratio = config.vote.acceptance_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(ConfigError::ValidationError {
            field: "vote.acceptance_ratio".into(),
            message: format!("must be greater than 0.0 and at most 1.0, got {ratio}"),
        });
    }

    if config.vote.time_limit == 0 {
        return Err(ConfigError::ValidationError {
            field: "vote.time_limit".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
