//! Error types for report extraction.
//!
//! Only [`ReportError`] ever reaches a caller as `Err`. [`SourceError`] ends
//! a pass and is folded into the report's termination, and [`ExtractError`]
//! is recorded per row as an anomaly.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors returned by the `parse_*` entry points.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to open report {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors yielded by a line source mid-stream.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read line {line}: {source}")]
    Io {
        line: u64,
        #[source]
        source: io::Error,
    },

    #[error("Read cancelled before line {line}")]
    Cancelled { line: u64 },
}

/// Why a data-shaped row could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: String, found: usize },

    #[error("column '{column}' is not a number: '{value}'")]
    InvalidNumber { column: String, value: String },

    #[error("column '{column}' has negative hours: {value}")]
    NegativeHours { column: String, value: String },

    #[error("column '{column}' is negative: {value}")]
    NegativeValue { column: String, value: String },

    #[error("column '{column}' is not a valid time: '{value}'")]
    InvalidTime { column: String, value: String },

    #[error("row '{label}' has no values")]
    MissingValues { label: String },

    #[error("row has values but no dotted label")]
    MissingLabel,
}

impl ExtractError {
    pub(crate) fn invalid_number(column: &str, value: &str) -> Self {
        ExtractError::InvalidNumber {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_time(column: &str, value: &str) -> Self {
        ExtractError::InvalidTime {
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}
