//! Performance test module.
//!
//! This module contains helpers shared across performance tests.

#![allow(dead_code)]

/// A report-shaped document of about `total_lines` lines.
///
/// Each block of 1,000 lines carries one ten-row flooding table and one
/// continuity block; everything else is unstructured filler of roughly
/// 100 bytes per line, so 1,000,000 lines come to about 100 MB.
pub fn generate_report(total_lines: usize) -> String {
    let filler = "  Link C-000 ........ routing step summary with ordinary words and numbers 12 34 56 78 90 ....";
    let mut out = String::with_capacity(total_lines * 100);
    let mut line = 0usize;
    while line < total_lines {
        let block = line / 1000;
        out.push_str("  *********************\n  Node Flooding Summary\n  *********************\n");
        out.push_str("  ------------------------------------------------\n");
        out.push_str("  Node       Hours   Rate    Volume\n");
        out.push_str("  ------------------------------------------------\n");
        for row in 0..10 {
            out.push_str(&format!(
                "  J{}-{}     1.50    0.250   {}.125\n",
                block,
                row,
                row * 10
            ));
        }
        out.push('\n');
        out.push_str("  Flow Routing Continuity        acre-feet\n");
        out.push_str("  Wet Weather Inflow .......         3.455\n");
        out.push_str("  External Outflow .........         3.401\n");
        out.push_str("  Continuity Error (%) .....         0.150\n");
        out.push('\n');
        line += 22;
        while line % 1000 != 0 && line < total_lines {
            out.push_str(filler);
            out.push('\n');
            line += 1;
        }
    }
    out
}

/// Same line count with no report structure at all.
pub fn generate_noise(total_lines: usize) -> String {
    let filler = "  Link C-000 ........ routing step summary with ordinary words and numbers 12 34 56 78 90 ....";
    let mut out = String::with_capacity(total_lines * 100);
    for _ in 0..total_lines {
        out.push_str(filler);
        out.push('\n');
    }
    out
}
