//! Single-pass report parser.
//!
//! [`ReportParser`] is the push-style core: feed it lines in order and call
//! [`finish`](ReportParser::finish). The `parse_*` functions drive it from a
//! [`LineSource`] and are pure: no state survives between calls and nothing
//! is touched besides the given reader.
//!
//! # Example
//!
//! ```
//! use swmmscan::report::parse_str;
//!
//! let report = parse_str(
//!     "  Node Flooding Summary\n  J-14  2.35  0.0421  125000.0  02:15:30\n",
//! );
//! assert_eq!(report.flooded_nodes.len(), 1);
//! assert_eq!(report.flooded_nodes[0].node_id, "J-14");
//! ```

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use tracing::{error, info, trace};

use super::aggregate::Aggregator;
use super::error::{ReportError, SourceError};
use super::extract::{classify, looks_like_row, RowOutcome};
use super::grammar::GrammarSet;
use super::section::{ParserState, SectionDetector, Step};
use super::source::LineSource;
use super::types::{ParsedReport, ReportLine, Termination};
use crate::cancel::CancelToken;

/// Push-based parser over a shared grammar.
#[derive(Debug)]
pub struct ReportParser<'g> {
    grammar: &'g GrammarSet,
    detector: SectionDetector<'g>,
    aggregator: Aggregator<'g>,
    started: Instant,
    lines: u64,
    bytes: u64,
}

impl<'g> ReportParser<'g> {
    pub fn new(grammar: &'g GrammarSet) -> Self {
        Self {
            grammar,
            detector: SectionDetector::new(grammar),
            aggregator: Aggregator::new(grammar),
            started: Instant::now(),
            lines: 0,
            bytes: 0,
        }
    }

    /// Current state machine cursor.
    pub fn state(&self) -> &ParserState {
        self.detector.state()
    }

    pub fn lines_consumed(&self) -> u64 {
        self.lines
    }

    /// Feed the next line of text, numbering it automatically.
    ///
    /// For sources delivered in chunks: call once per complete line, in order.
    pub fn push_text(&mut self, text: &str) {
        let line = ReportLine::new(self.lines + 1, text);
        self.push_line(&line);
    }

    /// Feed the next line.
    pub fn push_line(&mut self, line: &ReportLine) {
        self.lines += 1;
        self.bytes += line.text.len() as u64 + 1;

        match self.detector.observe(line) {
            Step::Skip => {}
            Step::Enter(entry) => self.aggregator.open_section(&entry),
            Step::Exit(kind) => self.aggregator.close_section(kind),
            Step::Row { kind, probe } => {
                if probe {
                    if !looks_like_row(self.grammar, kind, &line.text) {
                        trace!(line = line.number, "heading line");
                        return;
                    }
                    self.detector.begin_data();
                }
                let outcome = classify(self.grammar, kind, line);
                if outcome != RowOutcome::NotData {
                    self.detector.note_row();
                }
                self.aggregator
                    .accept(outcome, kind, line.number, &line.text);
            }
        }
    }

    /// Close any open section and freeze the report.
    pub fn finish(self, termination: Termination) -> ParsedReport {
        let bytes = self.bytes;
        self.finish_with_bytes(termination, bytes)
    }

    fn finish_with_bytes(mut self, termination: Termination, bytes: u64) -> ParsedReport {
        if let Some(kind) = self.detector.finish() {
            self.aggregator.close_section(kind);
        }
        let elapsed = self.started.elapsed();
        let report = self
            .aggregator
            .finish(termination, self.lines, bytes, elapsed);

        info!(
            lines = report.lines_scanned,
            flooded_nodes = report.flooded_nodes.len(),
            surcharged_conduits = report.surcharged_conduits.len(),
            continuity_errors = report.continuity_errors.len(),
            anomalies = report.anomaly_count(),
            complete = report.complete,
            elapsed_ms = elapsed.as_millis() as u64,
            "report parsed"
        );
        report
    }
}

/// Run a full pass over `source`.
///
/// The source is owned by this call and dropped before it returns, on every
/// exit path.
pub fn parse_source<R: BufRead>(mut source: LineSource<R>, grammar: &GrammarSet) -> ParsedReport {
    let mut parser = ReportParser::new(grammar);
    let termination = loop {
        match source.next() {
            None => break Termination::EndOfInput,
            Some(Ok(line)) => parser.push_line(&line),
            Some(Err(SourceError::Cancelled { line })) => {
                info!(line, "parse cancelled");
                break Termination::Cancelled;
            }
            Some(Err(SourceError::Io { line, source: e })) => {
                error!(line, error = %e, "report source failed");
                break Termination::IoFailure {
                    line,
                    message: e.to_string(),
                };
            }
        }
    };
    let bytes = source.bytes_read();
    drop(source);
    parser.finish_with_bytes(termination, bytes)
}

/// Parse a report file with the standard grammar.
///
/// # Errors
///
/// Returns [`ReportError::Open`] if the file cannot be opened. Failures after
/// that are reported through [`ParsedReport::termination`].
pub fn parse_path<P: AsRef<Path>>(path: P) -> Result<ParsedReport, ReportError> {
    parse_path_with(path, GrammarSet::standard(), &CancelToken::new())
}

/// Parse a report file with an explicit grammar and cancellation token.
pub fn parse_path_with<P: AsRef<Path>>(
    path: P,
    grammar: &GrammarSet,
    cancel: &CancelToken,
) -> Result<ParsedReport, ReportError> {
    let source = LineSource::from_path(path)?.with_cancel(cancel.clone());
    Ok(parse_source(source, grammar))
}

/// Parse from any buffered reader with the standard grammar.
pub fn parse_reader<R: BufRead>(reader: R) -> ParsedReport {
    parse_source(LineSource::from_reader(reader), GrammarSet::standard())
}

/// Parse from any buffered reader with an explicit grammar and cancellation token.
pub fn parse_reader_with<R: BufRead>(
    reader: R,
    grammar: &GrammarSet,
    cancel: &CancelToken,
) -> ParsedReport {
    parse_source(
        LineSource::from_reader(reader).with_cancel(cancel.clone()),
        grammar,
    )
}

/// Parse an in-memory report with the standard grammar.
pub fn parse_str(text: &str) -> ParsedReport {
    parse_source(LineSource::from_text(text), GrammarSet::standard())
}
