//! Severity rankings over a parsed report
//!
//! Both rankings are stable: records with equal keys keep report order.

use crate::report::{FloodedNode, ParsedReport, SurchargedConduit};

/// Default number of entries in a ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Flooded nodes ordered by total volume, largest first.
pub fn top_flooded(report: &ParsedReport, top_n: usize) -> Vec<&FloodedNode> {
    let mut ranked: Vec<&FloodedNode> = report.flooded_nodes.iter().collect();
    ranked.sort_by(|a, b| b.total_volume.total_cmp(&a.total_volume));
    ranked.truncate(top_n);
    ranked
}

/// Surcharged conduits ordered by hours surcharged, longest first.
pub fn top_surcharged(report: &ParsedReport, top_n: usize) -> Vec<&SurchargedConduit> {
    let mut ranked: Vec<&SurchargedConduit> = report.surcharged_conduits.iter().collect();
    ranked.sort_by(|a, b| b.hours_surcharged.total_cmp(&a.hours_surcharged));
    ranked.truncate(top_n);
    ranked
}
