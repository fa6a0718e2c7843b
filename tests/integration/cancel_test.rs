//! Cancellation of a running parse

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use swmmscan::report::{parse_reader_with, GrammarSet, Termination};
use swmmscan::CancelToken;

use crate::helpers::GeneratedReport;

#[test]
fn cancel_after_first_thousand_lines() {
    let cancel = CancelToken::new();
    let source = GeneratedReport::new(1_000_000).cancel_after(1_000, cancel.clone());
    let served = source.served.clone();
    let dropped = source.dropped.clone();

    let report = parse_reader_with(source, GrammarSet::standard(), &cancel);

    assert_eq!(report.termination, Termination::Cancelled);
    assert!(!report.complete);
    assert_eq!(report.lines_scanned, 1_000);
    assert_eq!(served.load(Ordering::SeqCst), 1_000);
    assert!(dropped.load(Ordering::SeqCst), "source released on return");

    // 20 tables of 41 rows fit in the first 1,000 lines
    assert_eq!(report.flooded_nodes.len(), 20 * 41);
    assert!(report.flooded_nodes.iter().all(|n| n.line <= 1_000));
}

#[test]
fn source_is_released_after_full_read() {
    let source = GeneratedReport::new(500);
    let dropped = source.dropped.clone();
    let report = parse_reader_with(source, GrammarSet::standard(), &CancelToken::new());
    assert!(report.complete);
    assert_eq!(report.lines_scanned, 500);
    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn cancel_from_another_thread() {
    let cancel = CancelToken::new();
    let source = GeneratedReport::new(u64::MAX);
    let served = source.served.clone();

    let worker = {
        let cancel = cancel.clone();
        thread::spawn(move || parse_reader_with(source, GrammarSet::standard(), &cancel))
    };

    while served.load(Ordering::SeqCst) < 10_000 {
        thread::sleep(Duration::from_millis(1));
    }
    cancel.cancel();

    let report = worker.join().unwrap();
    assert_eq!(report.termination, Termination::Cancelled);
    assert!(report.lines_scanned >= 10_000);
    assert!(!report.flooded_nodes.is_empty());
}

#[test]
fn pre_cancelled_token_reads_nothing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let source = GeneratedReport::new(1_000);
    let served = source.served.clone();
    let report = parse_reader_with(source, GrammarSet::standard(), &cancel);
    assert_eq!(report.lines_scanned, 0);
    assert_eq!(served.load(Ordering::SeqCst), 0);
    assert!(!report.complete);
}
