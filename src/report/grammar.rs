//! Grammar tables: section headers and row layouts.
//!
//! A [`GrammarSet`] is built once, never mutated, and shared by reference
//! (or `Arc`) across every parse session in the process. The standard SWMM 5
//! tables are available through [`GrammarSet::standard`]; callers that need
//! extra header wordings build their own set with
//! [`GrammarSet::with_aliases`].

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

use super::types::SectionKind;

/// Report format versions with their own grammar tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVersion {
    /// EPA SWMM 5.0 - 5.2 text reports.
    #[default]
    Swmm5,
}

/// Extra header wordings, keyed by the table they open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderAliases {
    /// Continuity category (e.g. "Flow Routing") to additional headers.
    #[serde(default)]
    pub continuity: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub flooded_nodes: Vec<String>,
    #[serde(default)]
    pub surcharged_conduits: Vec<String>,
}

/// Errors building a grammar set.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("Unknown continuity category in header aliases: '{0}'")]
    UnknownCategory(String),

    #[error("Empty header alias for {0}")]
    EmptyAlias(SectionKind),

    #[error("Invalid header pattern: {0}")]
    Pattern(#[from] regex::Error),
}

// ============================================================================
// Continuity Blocks
// ============================================================================

/// Label tables for one kind of continuity block.
#[derive(Debug, Clone)]
pub struct ContinuityGrammar {
    /// Category name used in records ("Runoff Quantity", "Flow Routing", ...).
    pub category: String,
    /// Quality blocks report one column per pollutant.
    pub per_pollutant: bool,
    /// Row labels summed into the inflow volume.
    pub inflow: Vec<&'static str>,
    /// Row labels summed into the outflow volume.
    pub outflow: Vec<&'static str>,
}

/// How a continuity row label contributes to the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    Inflow,
    Outflow,
    ErrorPct,
    /// Storage terms and anything else; validated, not summed.
    Other,
}

impl ContinuityGrammar {
    pub fn role_of(&self, label: &str) -> LabelRole {
        if label.starts_with(CONTINUITY_ERROR_LABEL) {
            LabelRole::ErrorPct
        } else if self.inflow.iter().any(|l| *l == label) {
            LabelRole::Inflow
        } else if self.outflow.iter().any(|l| *l == label) {
            LabelRole::Outflow
        } else {
            LabelRole::Other
        }
    }
}

/// Label of the row that closes every continuity block.
pub const CONTINUITY_ERROR_LABEL: &str = "Continuity Error";

// ============================================================================
// Row Layouts
// ============================================================================

/// Typed column of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Trimmed identifier.
    Id(&'static str),
    /// Non-negative hours, as a float or `hh:mm`.
    Hours(&'static str),
    /// Signed float in raw report units.
    Number(&'static str),
    /// Whole days preceding a clock time.
    Days(&'static str),
    /// `hh:mm` or `hh:mm:ss`.
    Clock(&'static str),
}

impl Column {
    pub fn name(&self) -> &'static str {
        match *self {
            Column::Id(n)
            | Column::Hours(n)
            | Column::Number(n)
            | Column::Days(n)
            | Column::Clock(n) => n,
        }
    }
}

/// An ordered column grammar. Trailing columns past `required` are optional.
#[derive(Debug, Clone, Copy)]
pub struct RowLayout {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub required: usize,
}

impl RowLayout {
    pub fn arity(&self) -> RangeInclusive<usize> {
        self.required..=self.columns.len()
    }

    pub fn accepts(&self, token_count: usize) -> bool {
        self.arity().contains(&token_count)
    }
}

/// `Node  Hours  Rate  days hr:min  Volume  [Ponded Depth]`, as SWMM 5 prints it.
pub const FLOOD_SWMM5: RowLayout = RowLayout {
    name: "swmm5",
    columns: &[
        Column::Id("node_id"),
        Column::Hours("hours_flooded"),
        Column::Number("max_rate"),
        Column::Days("days_of_max"),
        Column::Clock("time_of_max"),
        Column::Number("total_volume"),
        Column::Number("max_ponded_depth"),
    ],
    required: 6,
};

/// `Node  Hours  Rate  Volume  [hh:mm[:ss]]`.
pub const FLOOD_COMPACT: RowLayout = RowLayout {
    name: "compact",
    columns: &[
        Column::Id("node_id"),
        Column::Hours("hours_flooded"),
        Column::Number("max_rate"),
        Column::Number("total_volume"),
        Column::Clock("time_of_max"),
    ],
    required: 4,
};

/// `Conduit  Both-Ends  Upstream  Dnstream  [Above-Full-Normal  [Capacity-Limited]]`.
pub const SURCHARGE: RowLayout = RowLayout {
    name: "surcharge",
    columns: &[
        Column::Id("link_id"),
        Column::Hours("hours_surcharged"),
        Column::Hours("hours_full_upstream"),
        Column::Hours("hours_full_downstream"),
        Column::Hours("hours_above_full_normal"),
        Column::Hours("hours_capacity_limited"),
    ],
    required: 4,
};

// ============================================================================
// Headers
// ============================================================================

/// A recognised section header.
#[derive(Debug, Clone)]
pub struct SectionHeader {
    /// Literal header text, e.g. "Node Flooding Summary".
    pub literal: String,
    pub kind: SectionKind,
    /// Index into the continuity tables for continuity headers.
    pub continuity: Option<usize>,
}

/// Read-only grammar configuration for one report format version.
#[derive(Debug)]
pub struct GrammarSet {
    version: FormatVersion,
    headers: Vec<SectionHeader>,
    header_patterns: RegexSet,
    continuity: Vec<ContinuityGrammar>,
    continuity_row: Regex,
    flooded_layouts: Vec<RowLayout>,
    surcharged_layouts: Vec<RowLayout>,
}

static STANDARD: OnceLock<GrammarSet> = OnceLock::new();

impl GrammarSet {
    /// The built-in SWMM 5 grammar, initialised on first use.
    pub fn standard() -> &'static GrammarSet {
        STANDARD.get_or_init(|| {
            GrammarSet::new(FormatVersion::Swmm5, &HeaderAliases::default())
                .expect("built-in grammar patterns compile")
        })
    }

    /// Build the grammar for `version` with no aliases.
    pub fn for_version(version: FormatVersion) -> Result<Self, GrammarError> {
        Self::new(version, &HeaderAliases::default())
    }

    /// Build the grammar for `version`, adding the given header wordings.
    pub fn with_aliases(
        version: FormatVersion,
        aliases: &HeaderAliases,
    ) -> Result<Self, GrammarError> {
        Self::new(version, aliases)
    }

    fn new(version: FormatVersion, aliases: &HeaderAliases) -> Result<Self, GrammarError> {
        let continuity = match version {
            FormatVersion::Swmm5 => swmm5_continuity(),
        };

        let mut headers = Vec::new();
        for (idx, block) in continuity.iter().enumerate() {
            headers.push(SectionHeader {
                literal: format!("{} Continuity", block.category),
                kind: SectionKind::ContinuitySummary,
                continuity: Some(idx),
            });
        }
        headers.push(SectionHeader {
            literal: "Node Flooding Summary".to_string(),
            kind: SectionKind::FloodedNodes,
            continuity: None,
        });
        headers.push(SectionHeader {
            literal: "Conduit Surcharge Summary".to_string(),
            kind: SectionKind::SurchargedConduits,
            continuity: None,
        });

        for (category, literals) in &aliases.continuity {
            let idx = continuity
                .iter()
                .position(|c| &c.category == category)
                .ok_or_else(|| GrammarError::UnknownCategory(category.clone()))?;
            for literal in literals {
                headers.push(alias_header(literal, SectionKind::ContinuitySummary, Some(idx))?);
            }
        }
        for literal in &aliases.flooded_nodes {
            headers.push(alias_header(literal, SectionKind::FloodedNodes, None)?);
        }
        for literal in &aliases.surcharged_conduits {
            headers.push(alias_header(literal, SectionKind::SurchargedConduits, None)?);
        }

        let header_patterns = RegexSet::new(headers.iter().map(|h| header_pattern(&h.literal)))?;
        let continuity_row = Regex::new(r"^\s*(?P<label>\S.*?)\s*\.{2,}\s*(?P<values>.*)$")?;

        Ok(Self {
            version,
            headers,
            header_patterns,
            continuity,
            continuity_row,
            flooded_layouts: vec![FLOOD_COMPACT, FLOOD_SWMM5],
            surcharged_layouts: vec![SURCHARGE],
        })
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn headers(&self) -> &[SectionHeader] {
        &self.headers
    }

    /// Cheap check used before [`match_headers`](Self::match_headers).
    pub fn is_header(&self, line: &str) -> bool {
        self.header_patterns.is_match(line)
    }

    /// All headers matching `line`, in grammar order.
    pub fn match_headers(&self, line: &str) -> Vec<&SectionHeader> {
        self.header_patterns
            .matches(line)
            .into_iter()
            .map(|idx| &self.headers[idx])
            .collect()
    }

    pub fn continuity(&self, idx: usize) -> Option<&ContinuityGrammar> {
        self.continuity.get(idx)
    }

    /// Split a dot-leader row into its label and value text.
    pub fn split_continuity_row<'l>(&self, line: &'l str) -> Option<(&'l str, &'l str)> {
        let caps = self.continuity_row.captures(line)?;
        let label = caps.name("label")?.as_str();
        let values = caps.name("values").map_or("", |m| m.as_str());
        Some((label, values))
    }

    /// Row layouts for a table section (empty for continuity).
    pub fn layouts(&self, kind: SectionKind) -> &[RowLayout] {
        match kind {
            SectionKind::FloodedNodes => &self.flooded_layouts,
            SectionKind::SurchargedConduits => &self.surcharged_layouts,
            SectionKind::ContinuitySummary => &[],
        }
    }
}

fn alias_header(
    literal: &str,
    kind: SectionKind,
    continuity: Option<usize>,
) -> Result<SectionHeader, GrammarError> {
    let literal = literal.trim();
    if literal.is_empty() {
        return Err(GrammarError::EmptyAlias(kind));
    }
    Ok(SectionHeader {
        literal: literal.to_string(),
        kind,
        continuity,
    })
}

/// Header text anchored at line start, followed by whitespace or end of line.
fn header_pattern(literal: &str) -> String {
    format!(r"^\s*{}(?:\s|$)", regex::escape(literal))
}

fn swmm5_continuity() -> Vec<ContinuityGrammar> {
    const ROUTING_INFLOW: [&str; 5] = [
        "Dry Weather Inflow",
        "Wet Weather Inflow",
        "Groundwater Inflow",
        "RDII Inflow",
        "External Inflow",
    ];

    vec![
        ContinuityGrammar {
            category: "Runoff Quantity".to_string(),
            per_pollutant: false,
            inflow: vec!["Total Precipitation", "Outfall Runon"],
            outflow: vec![
                "Evaporation Loss",
                "Infiltration Loss",
                "Surface Runoff",
                "LID Drainage",
                "Snow Removed",
            ],
        },
        ContinuityGrammar {
            category: "Runoff Quality".to_string(),
            per_pollutant: true,
            inflow: vec!["Initial Buildup", "Surface Buildup", "Wet Deposition"],
            outflow: vec![
                "Sweeping Removal",
                "Infiltration Loss",
                "BMP Removal",
                "Surface Runoff",
            ],
        },
        ContinuityGrammar {
            category: "Groundwater".to_string(),
            per_pollutant: false,
            inflow: vec!["Infiltration"],
            outflow: vec![
                "Upper Zone ET",
                "Lower Zone ET",
                "Deep Percolation",
                "Groundwater Flow",
            ],
        },
        ContinuityGrammar {
            category: "Flow Routing".to_string(),
            per_pollutant: false,
            inflow: ROUTING_INFLOW.to_vec(),
            outflow: vec![
                "External Outflow",
                "Internal Outflow",
                "Flooding Loss",
                "Evaporation Loss",
                "Exfiltration Loss",
                "Storage Losses",
            ],
        },
        ContinuityGrammar {
            category: "Quality Routing".to_string(),
            per_pollutant: true,
            inflow: ROUTING_INFLOW.to_vec(),
            outflow: vec![
                "External Outflow",
                "Internal Outflow",
                "Flooding Loss",
                "Exfiltration Loss",
                "Mass Reacted",
            ],
        },
    ]
}
