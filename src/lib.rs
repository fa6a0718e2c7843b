//! swmmscan library
//!
//! Streaming extraction of flooding, surcharge and continuity results from
//! EPA SWMM text reports, plus the rankings, fact sheet, session log and
//! configuration used by the `swmmscan` CLI.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod facts;
pub mod logging;
pub mod ranking;
pub mod report;
pub mod sessions;

pub use cancel::CancelToken;
pub use config::Config;
pub use facts::FactSheet;
pub use report::{parse_path, parse_reader, parse_str, GrammarSet, ParsedReport, ReportParser};
pub use sessions::{SessionLog, SessionRecord};
