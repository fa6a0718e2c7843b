//! Unit tests for the fact sheet

use swmmscan::facts::FactSheet;
use swmmscan::report::{parse_reader_with, parse_str, GrammarSet};
use swmmscan::CancelToken;

use crate::helpers::load_fixture;

#[test]
fn full_report_fact_sheet() {
    let report = parse_str(&load_fixture("swmm5_full.rpt"));
    let text = FactSheet::new(&report).titled("swmm5_full.rpt").to_string();

    assert!(text.starts_with("SWMM report facts: swmm5_full.rpt\n"));
    assert!(text.contains("- Flow Routing: 0.25% (excess)"));
    assert!(text.contains("- Runoff Quantity: -0.029% (deficit)"));
    assert!(text.contains("Largest continuity error: Flow Routing at 0.25%"));
    assert!(text.contains("Flooded nodes: 3"));
    assert!(text.contains("- J-14: volume 12.5"));
    assert!(text.contains("Surcharged conduits: 2"));
    assert!(text.contains("- C-22: 4.1 h surcharged"));
    assert!(text.contains("- 0 rows could not be parsed"));
    assert!(!text.contains("incomplete"));
}

#[test]
fn fact_sheet_lists_anomalies() {
    let report = parse_str(&load_fixture("malformed.rpt"));
    let text = FactSheet::new(&report).to_string();
    assert!(text.contains("- 1 row could not be parsed"));
    assert!(text.contains("line 8"));
    assert!(text.contains("hours_flooded"));
}

#[test]
fn fact_sheet_states_cancellation() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let report = parse_reader_with(
        load_fixture("compact.rpt").as_bytes(),
        GrammarSet::standard(),
        &cancel,
    );
    let text = FactSheet::new(&report).to_string();
    assert!(text.contains("report is incomplete: parsing was cancelled after 0 lines"));
}

#[test]
fn severe_continuity_is_flagged() {
    let report = parse_str(
        "Flow Routing Continuity\n\
         Wet Weather Inflow ..... 10.0\n\
         External Outflow ....... 9.0\n\
         Continuity Error (%) ... 7.5\n",
    );
    let text = FactSheet::new(&report).to_string();
    assert!(text.contains("- Flow Routing: 7.5% (excess) exceeds 5%"));
}

#[test]
fn top_n_limits_listed_entries() {
    let report = parse_str(&load_fixture("swmm5_full.rpt"));
    let text = FactSheet::new(&report).top_n(1).to_string();
    assert!(text.contains("- J-14:"));
    assert!(!text.contains("- J7:"));
}
