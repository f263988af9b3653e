//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SPLITLEDGER_CURRENCY=$                                             │
//! │     SPLITLEDGER_ROUNDING=half_even                                     │
//! │     SPLITLEDGER_FORMAT=json                                            │
//! │     SPLITLEDGER_LOG=debug                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <PATH>, or                                                │
//! │     ~/.config/splitledger/config.toml (Linux)                          │
//! │     ~/Library/Application Support/dev.splitledger.splitledger/...      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [display]
//! currency_symbol = "Rs"
//! format = "text"     # text | json
//!
//! [split]
//! rounding = "truncate"   # truncate | half_up | half_even
//!
//! [log]
//! filter = "info,splitledger=debug"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use splitledger_core::report::DEFAULT_CURRENCY_SYMBOL;
use splitledger_core::Rounding;
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

// =============================================================================
// Output Format
// =============================================================================

/// How balance reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable "X owes Y" lines.
    #[default]
    Text,
    /// Balance snapshots as pretty JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(CliError::InvalidConfig(format!(
                "Unknown output format: '{}'. Valid options: text, json",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Printed in front of every amount.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default)]
    pub format: OutputFormat,
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitSettings {
    /// Rounding applied to expenses that don't pick their own.
    #[serde(default)]
    pub rounding: Rounding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,splitledger=debug".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub split: SplitSettings,

    #[serde(default)]
    pub log: LogSettings,
}

impl CliConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// file at the default location is not.
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        if self.display.currency_symbol.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "display.currency_symbol must not be empty".into(),
            ));
        }

        if self.log.filter.trim().is_empty() {
            return Err(CliError::InvalidConfig("log.filter must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `SPLITLEDGER_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("SPLITLEDGER_CURRENCY") {
            debug!(symbol = %symbol, "Overriding currency symbol from environment");
            self.display.currency_symbol = symbol;
        }

        if let Some(format) = lookup("SPLITLEDGER_FORMAT") {
            match format.parse() {
                Ok(parsed) => self.display.format = parsed,
                Err(_) => warn!(format = %format, "Unknown output format in environment"),
            }
        }

        if let Some(rounding) = lookup("SPLITLEDGER_ROUNDING") {
            match rounding.parse() {
                Ok(parsed) => {
                    debug!(rounding = %rounding, "Overriding rounding from environment");
                    self.split.rounding = parsed;
                }
                Err(_) => warn!(rounding = %rounding, "Unknown rounding mode in environment"),
            }
        }

        if let Some(filter) = lookup("SPLITLEDGER_LOG") {
            self.log.filter = filter;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "splitledger", "splitledger")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
