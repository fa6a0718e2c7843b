//! Plain-text fact sheet for downstream summarisers
//!
//! Every figure is taken verbatim from a [`ParsedReport`]. Nothing is
//! estimated here, and data problems are always spelled out so a reader
//! never mistakes a partial report for a clean one.

use std::fmt;

use crate::ranking::{top_flooded, top_surcharged, DEFAULT_TOP_N};
use crate::report::{ContinuityDirection, ParsedReport, Termination};

/// Continuity error magnitude (percent) above which a block is flagged.
pub const SEVERE_CONTINUITY_PCT: f64 = 5.0;

/// Renders a report as a deterministic fact sheet.
///
/// # Example
///
/// ```
/// use swmmscan::facts::FactSheet;
/// use swmmscan::report::parse_str;
///
/// let report = parse_str("Node Flooding Summary\nJ-14 2.35 0.0421 125000.0\n");
/// let text = FactSheet::new(&report).to_string();
/// assert!(text.contains("J-14"));
/// assert!(text.contains("0 rows could not be parsed"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FactSheet<'r> {
    report: &'r ParsedReport,
    title: Option<&'r str>,
    top_n: usize,
}

impl<'r> FactSheet<'r> {
    pub fn new(report: &'r ParsedReport) -> Self {
        Self {
            report,
            title: None,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Name the report (usually its file name) in the first line.
    pub fn titled(mut self, title: &'r str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    fn write_continuity(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        if report.continuity_errors.is_empty() {
            return writeln!(f, "Continuity errors: none reported");
        }
        writeln!(f, "Continuity errors:")?;
        for c in &report.continuity_errors {
            let direction = match c.direction() {
                ContinuityDirection::Excess => "excess",
                ContinuityDirection::Deficit => "deficit",
                ContinuityDirection::Balanced => "balanced",
            };
            write!(f, "- {}: {}% ({})", c.category, c.error_pct, direction)?;
            if c.error_pct.abs() > SEVERE_CONTINUITY_PCT {
                write!(f, " exceeds {}%", SEVERE_CONTINUITY_PCT)?;
            }
            writeln!(f)?;
        }
        if let Some(overall) = &report.summary.overall_continuity {
            writeln!(
                f,
                "Largest continuity error: {} at {}%",
                overall.category, overall.error_pct
            )?;
        }
        Ok(())
    }

    fn write_flooding(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.report.summary;
        if summary.flooded_node_count == 0 {
            return writeln!(f, "Flooded nodes: none reported");
        }
        writeln!(
            f,
            "Flooded nodes: {} (total flood volume {})",
            summary.flooded_node_count, summary.total_flooded_volume
        )?;
        if let Some(rate) = summary.peak_flood_rate {
            writeln!(f, "Peak flood rate: {}", rate)?;
        }
        writeln!(f, "Top flooded nodes by total volume:")?;
        for node in top_flooded(self.report, self.top_n) {
            write!(
                f,
                "- {}: volume {}, {} h flooded, max rate {}",
                node.node_id, node.total_volume, node.hours_flooded, node.max_rate
            )?;
            if let Some(time) = &node.time_of_max_occurrence {
                write!(f, ", peak at {}", time)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_surcharge(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.report.summary;
        if summary.surcharged_conduit_count == 0 {
            return writeln!(f, "Surcharged conduits: none reported");
        }
        writeln!(f, "Surcharged conduits: {}", summary.surcharged_conduit_count)?;
        writeln!(f, "Top surcharged conduits by hours surcharged:")?;
        for link in top_surcharged(self.report, self.top_n) {
            write!(
                f,
                "- {}: {} h surcharged, {} h full upstream, {} h full downstream",
                link.link_id,
                link.hours_surcharged,
                link.hours_full_upstream,
                link.hours_full_downstream
            )?;
            if let Some(hours) = link.hours_capacity_limited {
                write!(f, ", {} h capacity limited", hours)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn write_diagnostics(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let anomalies = report.anomaly_count();
        let noun = if anomalies == 1 { "row" } else { "rows" };
        writeln!(f, "Data quality:")?;
        writeln!(f, "- {} {} could not be parsed", anomalies, noun)?;
        for anomaly in report.diagnostics.anomalies.iter().take(self.top_n) {
            writeln!(
                f,
                "  line {} ({}): {}",
                anomaly.line, anomaly.section, anomaly.reason
            )?;
        }
        for ambiguity in &report.diagnostics.ambiguities {
            writeln!(
                f,
                "- line {} matched several section headers, read as {}",
                ambiguity.line, ambiguity.chosen
            )?;
        }
        if report.is_unrecognized() {
            writeln!(
                f,
                "- no known report sections were found; this may not be a SWMM report"
            )?;
        }
        match &report.termination {
            Termination::EndOfInput => {}
            Termination::IoFailure { line, message } => writeln!(
                f,
                "- report is incomplete: reading stopped at line {}: {}",
                line, message
            )?,
            Termination::Cancelled => writeln!(
                f,
                "- report is incomplete: parsing was cancelled after {} lines",
                report.lines_scanned
            )?,
        }
        Ok(())
    }
}

impl fmt::Display for FactSheet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.title {
            Some(title) => writeln!(f, "SWMM report facts: {}", title)?,
            None => writeln!(f, "SWMM report facts")?,
        }
        self.write_continuity(f)?;
        self.write_flooding(f)?;
        self.write_surcharge(f)?;
        self.write_diagnostics(f)
    }
}
