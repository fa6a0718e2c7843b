//! Configuration management for swmmscan
//!
//! The config lives at `~/.config/swmmscan/config.toml` unless `--config`
//! names another file. A missing file means defaults; a present file must
//! parse and pass [`Config::validate`].

mod types;

pub use types::*;

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::report::{GrammarError, GrammarSet};
use crate::sessions::{expand_home, SessionLog};

impl Config {
    /// Default config location under the user's home directory.
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("swmmscan").join("config.toml"))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()));
            }
        };
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .map_err(|e| anyhow!("Invalid config in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Write as TOML to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Build the grammar tables described by `[grammar]`.
    pub fn build_grammar(&self) -> Result<GrammarSet, GrammarError> {
        GrammarSet::with_aliases(self.grammar.format, &self.grammar.aliases)
    }

    /// Grammar to share across parse sessions.
    pub fn grammar(&self) -> Result<Arc<GrammarSet>, GrammarError> {
        self.build_grammar().map(Arc::new)
    }

    /// Expand ~ in the session log path
    pub fn sessions_path(&self) -> PathBuf {
        expand_home(&self.sessions.path)
    }

    /// Session log to append to, if enabled
    pub fn session_log(&self) -> Option<SessionLog> {
        self.sessions
            .enabled
            .then(|| SessionLog::new(self.sessions_path()))
    }
}
