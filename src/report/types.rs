//! Type definitions for extracted SWMM report records.
//!
//! Everything in this module is plain data: the records produced by the
//! row extractor, the diagnostics collected along the way, and the frozen
//! [`ParsedReport`] handed to callers once a pass is over.
//!
//! # Record lifecycle
//!
//! ```text
//! ReportLine --(section detector)--> row candidate
//!            --(extractor)---------> FloodedNode | SurchargedConduit | anomaly
//!            --(aggregator)--------> ParsedReport
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ExtractError;

// ============================================================================
// Lines and Sections
// ============================================================================

/// A single line of report text with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// 1-based position in the source.
    pub number: u64,
    /// Line text without the trailing newline.
    pub text: String,
}

impl ReportLine {
    /// Create a line (convenience constructor, mostly for tests).
    pub fn new(number: u64, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// The report tables this crate knows how to read.
///
/// Determines which row grammar is active while a section is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SectionKind {
    /// Runoff / routing / groundwater / quality continuity blocks.
    ContinuitySummary,
    /// "Node Flooding Summary" table.
    FloodedNodes,
    /// "Conduit Surcharge Summary" table.
    SurchargedConduits,
}

impl SectionKind {
    /// Human-readable section name.
    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::ContinuitySummary => "continuity summary",
            SectionKind::FloodedNodes => "node flooding summary",
            SectionKind::SurchargedConduits => "conduit surcharge summary",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Elapsed simulation time, as printed in "Time of Max Occurrence" columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ElapsedTime {
    /// Canonical float-hours representation.
    pub fn total_hours(&self) -> f64 {
        self.days as f64 * 24.0
            + self.hours as f64
            + self.minutes as f64 / 60.0
            + self.seconds as f64 / 3600.0
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        write!(f, "{:02}:{:02}", self.hours, self.minutes)?;
        if self.seconds > 0 {
            write!(f, ":{:02}", self.seconds)?;
        }
        Ok(())
    }
}

/// A junction that overflowed during the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodedNode {
    pub node_id: String,
    /// Hours flooded, never negative.
    pub hours_flooded: f64,
    /// Maximum flooding rate in report flow units.
    pub max_rate: f64,
    /// Total flood volume in report volume units, never negative.
    pub total_volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_max_occurrence: Option<ElapsedTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ponded_depth: Option<f64>,
    /// Source line the record was read from.
    pub line: u64,
}

/// A conduit that ran above full-flow capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargedConduit {
    pub link_id: String,
    /// Hours both ends were full.
    pub hours_surcharged: f64,
    pub hours_full_upstream: f64,
    pub hours_full_downstream: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_above_full_normal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_capacity_limited: Option<f64>,
    pub line: u64,
}

/// Continuity error of one continuity block (or one pollutant in it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuityError {
    /// e.g. "Flow Routing" or "Runoff Quality (TSS)".
    pub category: String,
    pub error_pct: f64,
    /// Sum of the block's inflow terms, in `units`.
    pub inflow_volume: f64,
    /// Sum of the block's outflow terms, in `units`.
    pub outflow_volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub line: u64,
}

impl ContinuityError {
    pub fn direction(&self) -> ContinuityDirection {
        ContinuityDirection::of(self.error_pct)
    }
}

/// Sign of a continuity error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityDirection {
    /// Positive error: inflow exceeded outflow plus storage change.
    Excess,
    /// Negative error: more left the system than entered it.
    Deficit,
    Balanced,
}

impl ContinuityDirection {
    pub fn of(error_pct: f64) -> Self {
        if error_pct > 0.0 {
            ContinuityDirection::Excess
        } else if error_pct < 0.0 {
            ContinuityDirection::Deficit
        } else {
            ContinuityDirection::Balanced
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A row that looked like data but could not be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAnomaly {
    pub line: u64,
    pub section: SectionKind,
    /// Raw line text, untrimmed.
    pub text: String,
    pub reason: ExtractError,
}

/// A line that matched more than one section header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAmbiguity {
    pub line: u64,
    /// Header literals that matched, in grammar order.
    pub candidates: Vec<String>,
    /// The header literal that was acted on.
    pub chosen: String,
}

/// Everything that went wrong without stopping the pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub anomalies: Vec<RowAnomaly>,
    pub ambiguities: Vec<SectionAmbiguity>,
    /// No known section header appeared anywhere in the source.
    pub unrecognized_format: bool,
}

/// Why the pass stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// The source was read to the end.
    EndOfInput,
    /// The source became unreadable at `line`.
    IoFailure { line: u64, message: String },
    /// The caller cancelled the parse.
    Cancelled,
}

// ============================================================================
// Result Model
// ============================================================================

/// Run-level continuity figure chosen for the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuityOverview {
    pub category: String,
    pub error_pct: f64,
    pub magnitude: f64,
    pub direction: ContinuityDirection,
}

/// Scalar statistics computed during the pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub flooded_node_count: usize,
    pub total_flooded_volume: f64,
    /// Node with the largest total flood volume (first one on ties).
    pub worst_node: Option<String>,
    pub worst_node_volume: Option<f64>,
    pub peak_flood_rate: Option<f64>,
    pub surcharged_conduit_count: usize,
    /// Conduit with the most hours surcharged (first one on ties).
    pub longest_surcharge: Option<String>,
    pub longest_surcharge_hours: Option<f64>,
    /// Largest-magnitude continuity error in the run.
    pub overall_continuity: Option<ContinuityOverview>,
}

/// The frozen output of one parse pass.
///
/// Owns every record by value. Nothing mutates it after it is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub continuity_errors: Vec<ContinuityError>,
    pub flooded_nodes: Vec<FloodedNode>,
    pub surcharged_conduits: Vec<SurchargedConduit>,
    pub summary: ReportSummary,
    pub diagnostics: Diagnostics,
    pub lines_scanned: u64,
    pub bytes_scanned: u64,
    pub elapsed: Duration,
    /// False when the pass ended on an I/O failure or cancellation.
    pub complete: bool,
    pub termination: Termination,
}

impl ParsedReport {
    pub fn anomaly_count(&self) -> usize {
        self.diagnostics.anomalies.len()
    }

    pub fn is_unrecognized(&self) -> bool {
        self.diagnostics.unrecognized_format
    }

    /// Look up the continuity error for a category (e.g. "Flow Routing").
    pub fn continuity(&self, category: &str) -> Option<&ContinuityError> {
        self.continuity_errors
            .iter()
            .find(|c| c.category == category)
    }

    /// Same content, ignoring timing. Two passes over identical bytes
    /// compare equal under this.
    pub fn same_content(&self, other: &ParsedReport) -> bool {
        self.continuity_errors == other.continuity_errors
            && self.flooded_nodes == other.flooded_nodes
            && self.surcharged_conduits == other.surcharged_conduits
            && self.summary == other.summary
            && self.diagnostics == other.diagnostics
            && self.lines_scanned == other.lines_scanned
            && self.bytes_scanned == other.bytes_scanned
            && self.complete == other.complete
            && self.termination == other.termination
    }
}
