//! Throughput and memory bounds of a single parse pass.
//!
//! Requirements:
//! - about 1,000,000 lines / 100 MB parsed in under 4 seconds (release build)
//! - retained output grows with record count only

use std::time::Instant;

use swmmscan::report::parse_str;

use crate::helpers::{generate_noise, generate_report};

#[test]
fn million_lines_under_four_seconds() {
    let text = generate_report(1_000_000);
    assert!(text.len() > 90_000_000);

    let start = Instant::now();
    let report = parse_str(&text);
    let elapsed = start.elapsed();

    println!(
        "parsed {} lines ({} bytes) in {:?}",
        report.lines_scanned, report.bytes_scanned, elapsed
    );
    assert!(report.complete);
    assert_eq!(report.flooded_nodes.len(), 10_000);
    assert_eq!(report.continuity_errors.len(), 1_000);
    assert_eq!(report.anomaly_count(), 0);

    if cfg!(debug_assertions) {
        println!("debug build: timing bound not enforced");
    } else {
        assert!(
            elapsed.as_secs_f64() < 4.0,
            "parse took {:?}, expected under 4s",
            elapsed
        );
    }
}

#[test]
fn output_size_tracks_records_not_input() {
    let noise = parse_str(&generate_noise(200_000));
    assert_eq!(noise.lines_scanned, 200_000);
    assert!(noise.flooded_nodes.is_empty());
    assert!(noise.continuity_errors.is_empty());
    assert!(noise.diagnostics.anomalies.is_empty());

    let small = parse_str(&generate_report(20_000));
    let large = parse_str(&generate_report(200_000));
    assert_eq!(small.flooded_nodes.len() * 10, large.flooded_nodes.len());
    assert_eq!(
        small.continuity_errors.len() * 10,
        large.continuity_errors.len()
    );

    // the serialized result scales with records, not with the 10x larger input
    let small_json = serde_json::to_vec(&small).unwrap().len();
    let large_json = serde_json::to_vec(&large).unwrap().len();
    let ratio = large_json as f64 / small_json as f64;
    assert!(ratio < 11.0, "output grew {:.1}x", ratio);
}
