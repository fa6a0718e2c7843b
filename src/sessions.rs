//! Append-only session log
//!
//! Each parse may record one JSON line with its headline counts. The file is
//! newline-delimited JSON so it can be appended to without rewriting.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::report::ParsedReport;

/// One logged parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// File name of the parsed report.
    pub file_id: String,
    pub flooded_node_count: usize,
    pub surcharged_conduit_count: usize,
}

impl SessionRecord {
    pub fn new(file_id: impl Into<String>, report: &ParsedReport) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            file_id: file_id.into(),
            flooded_node_count: report.summary.flooded_node_count,
            surcharged_conduit_count: report.summary.surcharged_conduit_count,
        }
    }
}

/// A session log file on disk.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file and its directory if needed.
    pub fn append(&self, record: &SessionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create session log directory: {:?}", parent)
                })?;
            }
        }

        let mut line = serde_json::to_string(record).context("Failed to serialize session")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open session log: {:?}", self.path))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to write session log: {:?}", self.path))?;
        Ok(())
    }

    /// Read every record. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<SessionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open session log: {:?}", self.path))?;

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read session log: {:?}", self.path))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).with_context(|| {
                format!("Invalid session record at {:?} line {}", self.path, idx + 1)
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
