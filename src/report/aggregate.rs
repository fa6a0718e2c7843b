//! Accumulation of extracted rows into the final report.
//!
//! The [`Aggregator`] keeps every record in report order, maintains the
//! running totals behind [`ReportSummary`], tracks the continuity block that
//! is currently open, and collects diagnostics. All figures later shown to a
//! user are computed here and nowhere else.

use std::time::Duration;

use tracing::{debug, warn};

use super::error::ExtractError;
use super::extract::{ContinuityRow, RowOutcome};
use super::grammar::{ContinuityGrammar, GrammarSet, LabelRole};
use super::section::SectionEntry;
use super::types::{
    ContinuityError, ContinuityOverview, Diagnostics, FloodedNode, ParsedReport, ReportSummary,
    RowAnomaly, SectionAmbiguity, SectionKind, SurchargedConduit, Termination,
};

/// Running inflow/outflow sums for one value column of a continuity block.
#[derive(Debug, Clone, Default)]
struct ColumnTally {
    name: Option<String>,
    units: Option<String>,
    inflow: f64,
    outflow: f64,
}

/// A continuity block between its header and its error row.
#[derive(Debug)]
struct ContinuityBlock<'g> {
    grammar: &'g ContinuityGrammar,
    columns: Vec<ColumnTally>,
}

impl<'g> ContinuityBlock<'g> {
    fn open(grammar: &'g ContinuityGrammar, entry: &SectionEntry<'_>) -> Self {
        let columns = if grammar.per_pollutant {
            let width = entry.banner_tail.len().max(entry.header_tail.len());
            (0..width)
                .map(|i| ColumnTally {
                    name: entry.banner_tail.get(i).cloned(),
                    units: entry.header_tail.get(i).cloned(),
                    ..ColumnTally::default()
                })
                .collect()
        } else {
            vec![ColumnTally {
                units: entry.header_tail.first().cloned(),
                ..ColumnTally::default()
            }]
        };
        Self { grammar, columns }
    }

    /// Number of value columns a row contributes to.
    fn width_of(&self, row: &ContinuityRow) -> usize {
        if self.grammar.per_pollutant {
            row.values.len()
        } else {
            1
        }
    }

    fn add(&mut self, row: &ContinuityRow) {
        let width = self.width_of(row);
        if self.columns.len() < width {
            self.columns.resize_with(width, ColumnTally::default);
        }
        let role = self.grammar.role_of(&row.label);
        for (tally, value) in self.columns.iter_mut().zip(&row.values).take(width) {
            match role {
                LabelRole::Inflow => tally.inflow += value,
                LabelRole::Outflow => tally.outflow += value,
                LabelRole::ErrorPct | LabelRole::Other => {}
            }
        }
    }

    fn close(self, row: &ContinuityRow, line: u64) -> Vec<ContinuityError> {
        let width = self.width_of(row);
        let grammar = self.grammar;
        let category = &grammar.category;
        let per_pollutant = grammar.per_pollutant;
        self.columns
            .into_iter()
            .zip(&row.values)
            .take(width)
            .enumerate()
            .map(|(i, (tally, error_pct))| {
                let category = if per_pollutant {
                    let name = tally
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("pollutant {}", i + 1));
                    format!("{} ({})", category, name)
                } else {
                    category.clone()
                };
                ContinuityError {
                    category,
                    error_pct: *error_pct,
                    inflow_volume: tally.inflow,
                    outflow_volume: tally.outflow,
                    units: tally.units,
                    line,
                }
            })
            .collect()
    }
}

/// Incremental state of one parse pass.
#[derive(Debug)]
pub struct Aggregator<'g> {
    grammar: &'g GrammarSet,
    continuity: Vec<ContinuityError>,
    flooded: Vec<FloodedNode>,
    surcharged: Vec<SurchargedConduit>,
    open_block: Option<ContinuityBlock<'g>>,
    total_flooded_volume: f64,
    worst_node: Option<usize>,
    peak_flood_rate: Option<f64>,
    longest_surcharge: Option<usize>,
    anomalies: Vec<RowAnomaly>,
    ambiguities: Vec<SectionAmbiguity>,
    sections_seen: u64,
}

impl<'g> Aggregator<'g> {
    pub fn new(grammar: &'g GrammarSet) -> Self {
        Self {
            grammar,
            continuity: Vec::new(),
            flooded: Vec::new(),
            surcharged: Vec::new(),
            open_block: None,
            total_flooded_volume: 0.0,
            worst_node: None,
            peak_flood_rate: None,
            longest_surcharge: None,
            anomalies: Vec::new(),
            ambiguities: Vec::new(),
            sections_seen: 0,
        }
    }

    /// A header opened a section.
    pub fn open_section(&mut self, entry: &SectionEntry<'_>) {
        if let Some(kind) = entry.closed {
            self.close_section(kind);
        }
        if let Some(ambiguity) = &entry.ambiguity {
            self.ambiguities.push(ambiguity.clone());
        }
        self.sections_seen += 1;

        let block = entry
            .header
            .continuity
            .and_then(|idx| self.grammar.continuity(idx));
        if let Some(grammar) = block {
            self.open_block = Some(ContinuityBlock::open(grammar, entry));
        }
    }

    /// The active section ended.
    pub fn close_section(&mut self, kind: SectionKind) {
        if kind == SectionKind::ContinuitySummary {
            if let Some(block) = self.open_block.take() {
                warn!(
                    category = %block.grammar.category,
                    "continuity block ended without a continuity error row"
                );
            }
        }
    }

    /// Fold one classified row into the running state.
    pub fn accept(&mut self, outcome: RowOutcome, section: SectionKind, line: u64, text: &str) {
        match outcome {
            RowOutcome::Flooded(node) => self.push_flooded(node),
            RowOutcome::Surcharged(link) => self.push_surcharged(link),
            RowOutcome::Continuity(row) => self.push_continuity_row(row, line),
            RowOutcome::Anomaly(reason) => self.record_anomaly(section, line, text, reason),
            RowOutcome::NotData => {}
        }
    }

    pub fn record_anomaly(
        &mut self,
        section: SectionKind,
        line: u64,
        text: &str,
        reason: ExtractError,
    ) {
        debug!(line, section = %section, reason = %reason, "row extraction anomaly");
        self.anomalies.push(RowAnomaly {
            line,
            section,
            text: text.to_string(),
            reason,
        });
    }

    fn push_flooded(&mut self, node: FloodedNode) {
        self.total_flooded_volume += node.total_volume;
        let worse = match self.worst_node {
            Some(idx) => node.total_volume > self.flooded[idx].total_volume,
            None => true,
        };
        if worse {
            self.worst_node = Some(self.flooded.len());
        }
        self.peak_flood_rate = Some(match self.peak_flood_rate {
            Some(peak) => peak.max(node.max_rate),
            None => node.max_rate,
        });
        self.flooded.push(node);
    }

    fn push_surcharged(&mut self, link: SurchargedConduit) {
        let longer = match self.longest_surcharge {
            Some(idx) => link.hours_surcharged > self.surcharged[idx].hours_surcharged,
            None => true,
        };
        if longer {
            self.longest_surcharge = Some(self.surcharged.len());
        }
        self.surcharged.push(link);
    }

    fn push_continuity_row(&mut self, row: ContinuityRow, line: u64) {
        let Some(block) = self.open_block.as_mut() else {
            debug!(line, label = %row.label, "continuity row after the block closed");
            return;
        };
        if block.grammar.role_of(&row.label) == LabelRole::ErrorPct {
            if let Some(block) = self.open_block.take() {
                self.continuity.extend(block.close(&row, line));
            }
        } else {
            block.add(&row);
        }
    }

    /// Freeze into the immutable result.
    pub fn finish(
        mut self,
        termination: Termination,
        lines_scanned: u64,
        bytes_scanned: u64,
        elapsed: Duration,
    ) -> ParsedReport {
        self.close_section(SectionKind::ContinuitySummary);

        let overall_continuity = self
            .continuity
            .iter()
            .fold(None::<&ContinuityError>, |best, c| match best {
                Some(b) if b.error_pct.abs() >= c.error_pct.abs() => Some(b),
                _ => Some(c),
            })
            .map(|c| ContinuityOverview {
                category: c.category.clone(),
                error_pct: c.error_pct,
                magnitude: c.error_pct.abs(),
                direction: c.direction(),
            });

        let summary = ReportSummary {
            flooded_node_count: self.flooded.len(),
            total_flooded_volume: self.total_flooded_volume,
            worst_node: self.worst_node.map(|i| self.flooded[i].node_id.clone()),
            worst_node_volume: self.worst_node.map(|i| self.flooded[i].total_volume),
            peak_flood_rate: self.peak_flood_rate,
            surcharged_conduit_count: self.surcharged.len(),
            longest_surcharge: self
                .longest_surcharge
                .map(|i| self.surcharged[i].link_id.clone()),
            longest_surcharge_hours: self
                .longest_surcharge
                .map(|i| self.surcharged[i].hours_surcharged),
            overall_continuity,
        };

        if !self.anomalies.is_empty() {
            warn!(count = self.anomalies.len(), "rows could not be parsed");
        }

        let complete = termination == Termination::EndOfInput;
        ParsedReport {
            continuity_errors: self.continuity,
            flooded_nodes: self.flooded,
            surcharged_conduits: self.surcharged,
            summary,
            diagnostics: Diagnostics {
                anomalies: self.anomalies,
                ambiguities: self.ambiguities,
                unrecognized_format: self.sections_seen == 0,
            },
            lines_scanned,
            bytes_scanned,
            elapsed,
            complete,
            termination,
        }
    }
}
