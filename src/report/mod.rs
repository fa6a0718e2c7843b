//! SWMM report extraction
//!
//! Streams a plain-text SWMM `.rpt` file once, top to bottom, and produces a
//! [`ParsedReport`]: continuity errors, flooded nodes and surcharged
//! conduits, together with summary statistics and diagnostics.
//!
//! The pipeline is:
//! - [`LineSource`] yields numbered lines and honours a [`CancelToken`],
//! - [`SectionDetector`] tracks which section is active,
//! - [`classify`] turns a candidate row into a record or an anomaly,
//! - an aggregator folds records into running totals.
//!
//! Extraction never fails as a whole once the file is open. Bad rows become
//! [`RowAnomaly`] entries, and early ends are visible through
//! [`ParsedReport::complete`] and [`ParsedReport::termination`].
//!
//! [`CancelToken`]: crate::cancel::CancelToken

mod aggregate;
mod error;
mod extract;
mod grammar;
mod parser;
mod section;
mod source;
mod types;

pub use error::{ExtractError, ReportError, SourceError};
pub use extract::{classify, looks_like_row, parse_clock, parse_hours, parse_number, ContinuityRow, RowOutcome};
pub use grammar::{
    Column, ContinuityGrammar, FormatVersion, GrammarError, GrammarSet, HeaderAliases, LabelRole,
    RowLayout, SectionHeader, CONTINUITY_ERROR_LABEL, FLOOD_COMPACT, FLOOD_SWMM5, SURCHARGE,
};
pub use parser::{
    parse_path, parse_path_with, parse_reader, parse_reader_with, parse_source, parse_str,
    ReportParser,
};
pub use section::{is_banner, is_divider, ParserState, Region, SectionDetector, SectionEntry, Step};
pub use source::LineSource;
pub use types::{
    ContinuityDirection, ContinuityError, ContinuityOverview, Diagnostics, ElapsedTime,
    FloodedNode, ParsedReport, ReportLine, ReportSummary, RowAnomaly, SectionAmbiguity,
    SectionKind, SurchargedConduit, Termination,
};
