//! Shared helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::io::{self, BufRead, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use swmmscan::cancel::CancelToken;

/// Get the path to the fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Reader that synthesises a report of `total_lines` lines on the fly.
///
/// Every 50 lines a flooding table is opened, so the parser has real work.
/// Counts lines handed out and flags when it is dropped.
pub struct GeneratedReport {
    total_lines: u64,
    next_line: u64,
    buf: Vec<u8>,
    pos: usize,
    cancel_at: Option<(u64, CancelToken)>,
    pub served: Arc<AtomicU64>,
    pub dropped: Arc<AtomicBool>,
}

impl GeneratedReport {
    pub fn new(total_lines: u64) -> Self {
        Self {
            total_lines,
            next_line: 0,
            buf: Vec::new(),
            pos: 0,
            cancel_at: None,
            served: Arc::new(AtomicU64::new(0)),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel `token` as soon as line `line` has been handed out.
    pub fn cancel_after(mut self, line: u64, token: CancelToken) -> Self {
        self.cancel_at = Some((line, token));
        self
    }

    fn line_text(n: u64) -> String {
        match n % 50 {
            0 => "  Node Flooding Summary".to_string(),
            1 => "  ------------------------------".to_string(),
            2 => "  Node   Hours   Rate   Volume".to_string(),
            3 => "  ------------------------------".to_string(),
            4..=44 => format!("  J{}   1.25   0.040   {}.5", n, n % 1000),
            45 => String::new(),
            _ => format!("  free text line {} with no structure", n),
        }
    }
}

impl Read for GeneratedReport {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for GeneratedReport {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.buf.len() && self.next_line < self.total_lines {
            self.buf.clear();
            self.pos = 0;
            self.buf
                .extend_from_slice(Self::line_text(self.next_line).as_bytes());
            self.buf.push(b'\n');
            self.next_line += 1;
            let served = self.served.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((line, token)) = &self.cancel_at {
                if served == *line {
                    token.cancel();
                }
            }
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}

impl Drop for GeneratedReport {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}
