//! Section detection state machine.
//!
//! The detector looks at one line at a time and decides whether it is a
//! structural marker (header, banner, divider, blank) or a candidate row of
//! the active table. It never counts lines: every transition is driven by a
//! marker.
//!
//! # States
//!
//! ```text
//!              header                       blank / divider / banner
//!   Idle ----------------> In<Section>:Header ... In<Section>:Data ---------> Idle
//!                            |   2nd divider or row-shaped line  ^
//!                            +-------------------------------------+
//! ```
//!
//! A header line always switches directly to its section, closing whatever
//! was active. In the header region a second banner means an unrelated
//! section began, so the detector falls back to `Idle`.

use tracing::{debug, warn};

use super::grammar::{GrammarSet, SectionHeader};
use super::types::{ReportLine, SectionAmbiguity, SectionKind};

/// Whether the active table is still in its heading block or in its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Header,
    Data,
}

/// Finite-state-machine cursor for one parse pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    /// Active section, `None` when idle.
    pub section: Option<SectionKind>,
    pub region: Region,
    banners_seen: u32,
    dividers_seen: u32,
    rows_seen: u64,
}

impl ParserState {
    fn entered(kind: SectionKind) -> Self {
        Self {
            section: Some(kind),
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.section.is_none()
    }
}

/// A section opened by a header line.
#[derive(Debug)]
pub struct SectionEntry<'g> {
    pub header: &'g SectionHeader,
    /// Tokens after the header literal (units for continuity blocks).
    pub header_tail: Vec<String>,
    /// Tokens after the asterisks of the banner right above the header.
    pub banner_tail: Vec<String>,
    /// Section that was active when the header appeared.
    pub closed: Option<SectionKind>,
    pub ambiguity: Option<SectionAmbiguity>,
}

/// What the detector decided about a line.
#[derive(Debug)]
pub enum Step<'g> {
    /// Structural line or a line outside any section.
    Skip,
    Enter(SectionEntry<'g>),
    /// Candidate row of `kind`. `probe` is set while still in the heading
    /// block: the caller decides whether the line is row-shaped.
    Row { kind: SectionKind, probe: bool },
    /// The active section ended on a marker.
    Exit(SectionKind),
}

/// Line-by-line section state machine over a shared grammar.
#[derive(Debug)]
pub struct SectionDetector<'g> {
    grammar: &'g GrammarSet,
    state: ParserState,
    last_banner: Option<Vec<String>>,
    headers_seen: u64,
}

impl<'g> SectionDetector<'g> {
    pub fn new(grammar: &'g GrammarSet) -> Self {
        Self {
            grammar,
            state: ParserState::default(),
            last_banner: None,
            headers_seen: 0,
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Number of section headers recognised so far.
    pub fn headers_seen(&self) -> u64 {
        self.headers_seen
    }

    /// Classify the next line and advance the state.
    pub fn observe(&mut self, line: &ReportLine) -> Step<'g> {
        let trimmed = line.text.trim();
        if trimmed.is_empty() {
            return self.on_blank();
        }
        if is_banner(trimmed) {
            return self.on_banner(trimmed);
        }
        if is_divider(trimmed) {
            return self.on_divider();
        }
        if self.grammar.is_header(&line.text) {
            return self.on_header(line);
        }

        self.last_banner = None;
        match self.state.section {
            None => Step::Skip,
            Some(kind) => Step::Row {
                kind,
                probe: self.state.region == Region::Header,
            },
        }
    }

    /// A probed line turned out to be row-shaped: rows start here.
    pub fn begin_data(&mut self) {
        if self.state.section.is_some() && self.state.region == Region::Header {
            debug!(section = ?self.state.section, "data rows begin without divider");
            self.state.region = Region::Data;
        }
    }

    /// Record that a row of the active section was consumed.
    pub fn note_row(&mut self) {
        self.state.rows_seen += 1;
    }

    /// End of input: close whatever is still open.
    pub fn finish(&mut self) -> Option<SectionKind> {
        self.last_banner = None;
        std::mem::take(&mut self.state).section
    }

    fn exit(&mut self) -> Step<'g> {
        match std::mem::take(&mut self.state).section {
            Some(kind) => {
                debug!(section = %kind, "section closed");
                Step::Exit(kind)
            }
            None => Step::Skip,
        }
    }

    fn on_blank(&mut self) -> Step<'g> {
        if self.state.region == Region::Data && self.state.rows_seen > 0 {
            return self.exit();
        }
        Step::Skip
    }

    fn on_banner(&mut self, trimmed: &str) -> Step<'g> {
        let tail: Vec<String> = trimmed
            .trim_start_matches('*')
            .split_whitespace()
            .filter(|t| !t.chars().all(|c| c == '-' || c == '*'))
            .map(str::to_string)
            .collect();
        self.last_banner = Some(tail);

        if self.state.section.is_none() {
            return Step::Skip;
        }
        match self.state.region {
            Region::Data => self.exit(),
            Region::Header => {
                self.state.banners_seen += 1;
                if self.state.banners_seen >= 2 {
                    self.exit()
                } else {
                    Step::Skip
                }
            }
        }
    }

    fn on_divider(&mut self) -> Step<'g> {
        self.last_banner = None;
        if self.state.section.is_none() {
            return Step::Skip;
        }
        match self.state.region {
            Region::Data if self.state.rows_seen > 0 => self.exit(),
            Region::Data => Step::Skip,
            Region::Header => {
                self.state.dividers_seen += 1;
                if self.state.dividers_seen >= 2 {
                    self.state.region = Region::Data;
                }
                Step::Skip
            }
        }
    }

    fn on_header(&mut self, line: &ReportLine) -> Step<'g> {
        let matches = self.grammar.match_headers(&line.text);
        let Some(header) = pick_most_specific(&matches) else {
            return Step::Skip;
        };

        let ambiguity = if matches.len() > 1 {
            let candidates: Vec<String> = matches.iter().map(|h| h.literal.clone()).collect();
            warn!(
                line = line.number,
                candidates = ?candidates,
                chosen = %header.literal,
                "line matches more than one section header"
            );
            Some(SectionAmbiguity {
                line: line.number,
                candidates,
                chosen: header.literal.clone(),
            })
        } else {
            None
        };

        let header_tail = line
            .text
            .trim_start()
            .get(header.literal.len()..)
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let banner_tail = self.last_banner.take().unwrap_or_default();
        let closed = self.state.section;

        debug!(line = line.number, header = %header.literal, "section opened");
        self.headers_seen += 1;
        self.state = ParserState::entered(header.kind);

        Step::Enter(SectionEntry {
            header,
            header_tail,
            banner_tail,
            closed,
            ambiguity,
        })
    }
}

/// Longest header literal wins; ties keep grammar order.
fn pick_most_specific<'g>(matches: &[&'g SectionHeader]) -> Option<&'g SectionHeader> {
    let mut best: Option<&'g SectionHeader> = None;
    for header in matches {
        match best {
            Some(b) if b.literal.len() >= header.literal.len() => {}
            _ => best = Some(header),
        }
    }
    best
}

/// A line of asterisks framing a section title (may carry column labels).
pub fn is_banner(trimmed: &str) -> bool {
    trimmed.starts_with("***")
}

/// A rule of dashes or equals signs.
pub fn is_divider(trimmed: &str) -> bool {
    let mut marks = 0;
    for c in trimmed.chars() {
        match c {
            '-' | '=' => marks += 1,
            ' ' | '\t' => {}
            _ => return false,
        }
    }
    marks >= 3
}
