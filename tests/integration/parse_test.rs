//! End-to-end parsing of report files on disk

use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use tempfile::TempDir;

use swmmscan::report::{
    parse_path, parse_path_with, parse_reader, parse_str, FormatVersion, GrammarSet,
    HeaderAliases, ReportError, Termination,
};
use swmmscan::CancelToken;

use crate::helpers::{fixture_path, load_fixture};

#[test]
fn flooding_surcharge_and_routing_scenario() {
    let report = parse_str(
        "  Flow Routing Continuity\n\
         \x20 Wet Weather Inflow ....... 10.000\n\
         \x20 External Outflow ......... 9.975\n\
         \x20 Continuity Error (%) ..... 0.25\n\
         \n\
         \x20 Node Flooding Summary\n\
         \x20 J-14  2.35  0.0421  125000.0  02:15:30\n\
         \n\
         \x20 Conduit Surcharge Summary\n\
         \x20 C-22  4.10  1.50  0.00\n",
    );

    assert_eq!(report.flooded_nodes.len(), 1);
    let node = &report.flooded_nodes[0];
    assert_eq!(node.node_id, "J-14");
    assert_eq!(node.hours_flooded, 2.35);
    assert_eq!(node.max_rate, 0.0421);
    assert_eq!(node.total_volume, 125000.0);

    assert_eq!(report.surcharged_conduits.len(), 1);
    assert_eq!(report.surcharged_conduits[0].link_id, "C-22");
    assert_eq!(report.surcharged_conduits[0].hours_surcharged, 4.10);

    let routing = report.continuity("Flow Routing").unwrap();
    assert_eq!(routing.error_pct, 0.25);
    assert_eq!(report.summary.worst_node.as_deref(), Some("J-14"));
    assert_eq!(report.summary.total_flooded_volume, 125000.0);
    assert!(report.complete);
}

#[test]
fn parse_path_reads_fixture() {
    let report = parse_path(fixture_path("swmm5_full.rpt")).unwrap();
    let expected = fs::metadata(fixture_path("swmm5_full.rpt")).unwrap().len();
    assert_eq!(report.bytes_scanned, expected);
    assert_eq!(
        report.lines_scanned,
        load_fixture("swmm5_full.rpt").lines().count() as u64
    );
    assert_eq!(report.flooded_nodes.len(), 3);
}

#[test]
fn parsing_is_idempotent() {
    let path = fixture_path("swmm5_full.rpt");
    let first = parse_path(&path).unwrap();
    let second = parse_path(&path).unwrap();
    assert!(first.same_content(&second));

    let from_reader = parse_reader(BufReader::new(fs::File::open(&path).unwrap()));
    assert!(first.same_content(&from_reader));
}

#[test]
fn missing_file_is_the_only_error() {
    let dir = TempDir::new().unwrap();
    let err = parse_path(dir.path().join("absent.rpt")).unwrap_err();
    let ReportError::Open { path, .. } = &err;
    assert!(path.ends_with("absent.rpt"));
    assert!(err.to_string().contains("absent.rpt"));
}

#[test]
fn empty_file_is_unrecognized() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.rpt");
    fs::write(&path, "").unwrap();
    let report = parse_path(&path).unwrap();
    assert!(report.is_unrecognized());
    assert!(report.complete);
}

/// Reader that fails after yielding a prefix.
struct FailAfter {
    inner: BufReader<io::Cursor<Vec<u8>>>,
    limit: usize,
    read: usize,
}

impl Read for FailAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.fill_buf()?.len().min(buf.len());
        buf[..n].copy_from_slice(&self.fill_buf()?[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for FailAfter {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.read >= self.limit {
            return Err(io::Error::new(io::ErrorKind::Other, "device unplugged"));
        }
        let limit = self.limit - self.read;
        let buf = self.inner.fill_buf()?;
        Ok(&buf[..buf.len().min(limit)])
    }

    fn consume(&mut self, amt: usize) {
        self.read += amt;
        self.inner.consume(amt);
    }
}

#[test]
fn io_failure_keeps_partial_records() {
    let text = load_fixture("compact.rpt");
    // cut inside the surcharge table, after C-22
    let cut = text.find("C-3").unwrap();
    let reader = FailAfter {
        inner: BufReader::new(io::Cursor::new(text.into_bytes())),
        limit: cut,
        read: 0,
    };
    let report = parse_reader(reader);

    assert!(!report.complete);
    assert!(matches!(
        report.termination,
        Termination::IoFailure { ref message, .. } if message.contains("device unplugged")
    ));
    assert_eq!(report.flooded_nodes.len(), 3);
    assert_eq!(report.surcharged_conduits.len(), 1);
    assert_eq!(report.surcharged_conduits[0].link_id, "C-22");
}

#[test]
fn ambiguous_header_is_recorded() {
    let mut aliases = HeaderAliases::default();
    aliases
        .surcharged_conduits
        .push("Conduit Surcharge".to_string());
    let grammar = GrammarSet::with_aliases(FormatVersion::Swmm5, &aliases).unwrap();

    let text = "Conduit Surcharge Summary\nC1 1.0 1.0 1.0\n";
    let report = swmmscan::report::parse_reader_with(text.as_bytes(), &grammar, &CancelToken::new());

    assert_eq!(report.surcharged_conduits.len(), 1);
    assert_eq!(report.diagnostics.ambiguities.len(), 1);
    let amb = &report.diagnostics.ambiguities[0];
    assert_eq!(amb.line, 1);
    assert_eq!(amb.chosen, "Conduit Surcharge Summary");
}

#[test]
fn parallel_sessions_share_one_grammar() {
    let grammar = std::sync::Arc::new(GrammarSet::for_version(FormatVersion::Swmm5).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let grammar = grammar.clone();
            std::thread::spawn(move || {
                parse_path_with(fixture_path("swmm5_full.rpt"), &grammar, &CancelToken::new())
                    .unwrap()
            })
        })
        .collect();
    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for report in &reports[1..] {
        assert!(report.same_content(&reports[0]));
    }
}
