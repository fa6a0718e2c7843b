//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::report::{FormatVersion, HeaderAliases};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grammar: GrammarConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Report grammar configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrammarConfig {
    /// Report format version whose tables are used
    #[serde(default)]
    pub format: FormatVersion,
    /// Additional header wordings merged into the built-in tables
    #[serde(default)]
    pub aliases: HeaderAliases,
}

/// How `parse` prints its results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Entries shown in each ranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub format: OutputFormat,
}

pub fn default_top_n() -> usize {
    crate::ranking::DEFAULT_TOP_N
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            format: OutputFormat::default(),
        }
    }
}

/// Session log configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Append a record for every parsed report
    #[serde(default = "default_sessions_enabled")]
    pub enabled: bool,
    #[serde(default = "default_sessions_path")]
    pub path: String,
}

pub fn default_sessions_enabled() -> bool {
    true
}

pub fn default_sessions_path() -> String {
    "~/.local/share/swmmscan/sessions.jsonl".to_string()
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            enabled: default_sessions_enabled(),
            path: default_sessions_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

pub fn default_log_filter() -> String {
    crate::logging::DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Largest accepted `output.top_n`.
pub const MAX_TOP_N: usize = 1000;

impl Config {
    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.output.top_n == 0 || self.output.top_n > MAX_TOP_N {
            return Err(format!(
                "output.top_n must be between 1 and {}, got {}",
                MAX_TOP_N, self.output.top_n
            ));
        }
        if self.sessions.enabled && self.sessions.path.trim().is_empty() {
            return Err("sessions.path must not be empty when sessions are enabled".to_string());
        }
        if self.logging.filter.trim().is_empty() {
            return Err("logging.filter must not be empty".to_string());
        }
        self.build_grammar().map_err(|e| e.to_string())?;
        Ok(())
    }
}
