//! Row classification and typed field extraction.
//!
//! Given a line of an active section, [`classify`] returns exactly one of:
//! - a typed record,
//! - [`RowOutcome::NotData`] for heading continuations (no layout fits and no
//!   numeric token),
//! - [`RowOutcome::Anomaly`] for rows that look like data but fail the grammar.
//!
//! # Numeric Notation
//!
//! Floats accept sign, decimals, scientific form and Fortran `D` exponents.
//! Non-finite values are rejected. Hours columns also accept `hh:mm`, which
//! is converted to float hours.

use super::error::ExtractError;
use super::grammar::{Column, GrammarSet, RowLayout};
use super::types::{ElapsedTime, FloodedNode, ReportLine, SectionKind, SurchargedConduit};

/// A labelled row of a continuity block.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Result of classifying one candidate row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Flooded(FloodedNode),
    Surcharged(SurchargedConduit),
    Continuity(ContinuityRow),
    NotData,
    Anomaly(ExtractError),
}

/// Whether a line in a table's heading block is shaped like a data row.
///
/// Table rows must fit a layout's column count and carry at least one
/// numeric value; continuity rows must carry a dot leader.
pub fn looks_like_row(grammar: &GrammarSet, kind: SectionKind, text: &str) -> bool {
    match kind {
        SectionKind::ContinuitySummary => grammar.split_continuity_row(text).is_some(),
        _ => {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            if !grammar.layouts(kind).iter().any(|l| l.accepts(tokens.len())) {
                return false;
            }
            tokens[1..].iter().any(|t| is_numeric_like(t))
        }
    }
}

/// Classify a candidate row of `kind`.
pub fn classify(grammar: &GrammarSet, kind: SectionKind, line: &ReportLine) -> RowOutcome {
    match kind {
        SectionKind::ContinuitySummary => classify_continuity(grammar, line),
        SectionKind::FloodedNodes | SectionKind::SurchargedConduits => {
            classify_table(grammar.layouts(kind), kind, line)
        }
    }
}

fn classify_continuity(grammar: &GrammarSet, line: &ReportLine) -> RowOutcome {
    let Some((label, values)) = grammar.split_continuity_row(&line.text) else {
        return if line.text.split_whitespace().any(is_numeric_like) {
            RowOutcome::Anomaly(ExtractError::MissingLabel)
        } else {
            RowOutcome::NotData
        };
    };

    let parsed: Result<Vec<f64>, ExtractError> = values
        .split_whitespace()
        .map(|t| parse_number(label, t))
        .collect();
    match parsed {
        Ok(values) if values.is_empty() => RowOutcome::Anomaly(ExtractError::MissingValues {
            label: label.to_string(),
        }),
        Ok(values) => RowOutcome::Continuity(ContinuityRow {
            label: label.to_string(),
            values,
        }),
        Err(e) => RowOutcome::Anomaly(e),
    }
}

fn classify_table(layouts: &[RowLayout], kind: SectionKind, line: &ReportLine) -> RowOutcome {
    let tokens: Vec<&str> = line.text.split_whitespace().collect();
    // Rows that fit a layout are always coerced.
    let Some(layout) = layouts.iter().find(|l| l.accepts(tokens.len())) else {
        if tokens.len() < 2 || !tokens[1..].iter().any(|t| is_numeric_like(t)) {
            return RowOutcome::NotData;
        }
        return RowOutcome::Anomaly(ExtractError::ColumnCount {
            expected: describe_arity(layouts),
            found: tokens.len(),
        });
    };

    let built = read_cells(layout, &tokens).and_then(|cells| match kind {
        SectionKind::FloodedNodes => build_flooded(&cells, line.number).map(RowOutcome::Flooded),
        _ => build_surcharged(&cells, line.number).map(RowOutcome::Surcharged),
    });
    built.unwrap_or_else(RowOutcome::Anomaly)
}

// ============================================================================
// Cells
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Cell {
    Number(f64),
    Days(u32),
    Clock(ElapsedTime),
}

/// Coerced cells of one row, addressed by column name.
struct Cells<'t> {
    id: &'t str,
    values: Vec<(&'static str, Cell)>,
}

impl<'t> Cells<'t> {
    fn get(&self, name: &str) -> Option<Cell> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, cell)| *cell)
    }

    fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Cell::Number(v)) => Some(v),
            _ => None,
        }
    }

    fn required(&self, name: &str) -> Result<f64, ExtractError> {
        self.number(name).ok_or_else(|| ExtractError::InvalidNumber {
            column: name.to_string(),
            value: String::new(),
        })
    }

    fn time(&self, clock: &str, days: &str) -> Option<ElapsedTime> {
        let mut time = match self.get(clock) {
            Some(Cell::Clock(t)) => t,
            _ => return None,
        };
        if let Some(Cell::Days(d)) = self.get(days) {
            time.days = d;
        }
        Some(time)
    }
}

fn read_cells<'t>(layout: &RowLayout, tokens: &[&'t str]) -> Result<Cells<'t>, ExtractError> {
    let mut id = "";
    let mut values = Vec::with_capacity(tokens.len());
    for (column, token) in layout.columns.iter().zip(tokens) {
        match *column {
            Column::Id(_) => id = *token,
            Column::Hours(name) => values.push((name, Cell::Number(parse_hours(name, token)?))),
            Column::Number(name) => values.push((name, Cell::Number(parse_number(name, token)?))),
            Column::Days(name) => {
                let days = token
                    .parse::<u32>()
                    .map_err(|_| ExtractError::invalid_number(name, token))?;
                values.push((name, Cell::Days(days)));
            }
            Column::Clock(name) => values.push((name, Cell::Clock(parse_clock(name, token)?))),
        }
    }
    Ok(Cells { id, values })
}

fn build_flooded(cells: &Cells<'_>, line: u64) -> Result<FloodedNode, ExtractError> {
    let total_volume = cells.required("total_volume")?;
    if total_volume < 0.0 {
        return Err(ExtractError::NegativeValue {
            column: "total_volume".to_string(),
            value: total_volume.to_string(),
        });
    }
    Ok(FloodedNode {
        node_id: cells.id.to_string(),
        hours_flooded: cells.required("hours_flooded")?,
        max_rate: cells.required("max_rate")?,
        total_volume,
        time_of_max_occurrence: cells.time("time_of_max", "days_of_max"),
        max_ponded_depth: cells.number("max_ponded_depth"),
        line,
    })
}

fn build_surcharged(cells: &Cells<'_>, line: u64) -> Result<SurchargedConduit, ExtractError> {
    Ok(SurchargedConduit {
        link_id: cells.id.to_string(),
        hours_surcharged: cells.required("hours_surcharged")?,
        hours_full_upstream: cells.required("hours_full_upstream")?,
        hours_full_downstream: cells.required("hours_full_downstream")?,
        hours_above_full_normal: cells.number("hours_above_full_normal"),
        hours_capacity_limited: cells.number("hours_capacity_limited"),
        line,
    })
}

fn describe_arity(layouts: &[RowLayout]) -> String {
    layouts
        .iter()
        .map(|l| format!("{}-{}", l.required, l.columns.len()))
        .collect::<Vec<_>>()
        .join(" or ")
}

// ============================================================================
// Coercion
// ============================================================================

/// Parse a report float. Accepts `1.5`, `-0.029`, `1.2E+03`, `1.2D+03`.
pub fn parse_number(column: &str, token: &str) -> Result<f64, ExtractError> {
    let normalized;
    let text = if token.contains(['D', 'd']) {
        normalized = token.replace(['D', 'd'], "E");
        normalized.as_str()
    } else {
        token
    };
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ExtractError::invalid_number(column, token)),
    }
}

/// Parse a non-negative hours value, as a float or as `hh:mm[:ss]`.
pub fn parse_hours(column: &str, token: &str) -> Result<f64, ExtractError> {
    let hours = if token.contains(':') {
        parse_clock(column, token)?.total_hours()
    } else {
        parse_number(column, token)?
    };
    if hours < 0.0 {
        return Err(ExtractError::NegativeHours {
            column: column.to_string(),
            value: token.to_string(),
        });
    }
    Ok(hours)
}

/// Parse `hh:mm` or `hh:mm:ss`.
pub fn parse_clock(column: &str, token: &str) -> Result<ElapsedTime, ExtractError> {
    let parts: Vec<&str> = token.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(ExtractError::invalid_time(column, token));
    }
    let mut fields = [0u32; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ExtractError::invalid_time(column, token));
        }
        *slot = part
            .parse()
            .map_err(|_| ExtractError::invalid_time(column, token))?;
    }
    let [hours, minutes, seconds] = fields;
    if minutes >= 60 || seconds >= 60 {
        return Err(ExtractError::invalid_time(column, token));
    }
    Ok(ElapsedTime {
        days: 0,
        hours,
        minutes,
        seconds,
    })
}

fn is_numeric_like(token: &str) -> bool {
    parse_number("", token).is_ok() || (token.contains(':') && parse_clock("", token).is_ok())
}
