//! Sequential, bounded-memory line source.
//!
//! [`LineSource`] wraps any [`BufRead`] and yields one [`ReportLine`] per
//! call to `next`, reusing a single byte buffer. Nothing past the current
//! line is ever read, so dropping the iterator early leaves the rest of the
//! source untouched.
//!
//! # Encoding
//!
//! Reports are nominally ASCII. Bytes that are not valid UTF-8 are replaced
//! with U+FFFD rather than failing the pass.
//!
//! # Errors
//!
//! A read failure yields [`SourceError::Io`] once, after which the iterator
//! is exhausted. A cancelled [`CancelToken`] yields
//! [`SourceError::Cancelled`] before the next read.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

use super::error::{ReportError, SourceError};
use super::types::ReportLine;
use crate::cancel::CancelToken;

/// Read buffer size for file-backed sources.
const FILE_BUFFER_BYTES: usize = 256 * 1024;

/// Lazy iterator over the lines of a report.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
    lines: u64,
    bytes: u64,
    cancel: CancelToken,
    finished: bool,
}

impl LineSource<BufReader<File>> {
    /// Open a report file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Open`] if the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::with_capacity(
            FILE_BUFFER_BYTES,
            file,
        )))
    }
}

impl<'a> LineSource<&'a [u8]> {
    /// Read lines from an in-memory buffer.
    pub fn from_text(text: &'a str) -> Self {
        Self::from_reader(text.as_bytes())
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            lines: 0,
            bytes: 0,
            cancel: CancelToken::new(),
            finished: false,
        }
    }

    /// Stop reading once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Lines handed out so far.
    pub fn lines_read(&self) -> u64 {
        self.lines
    }

    /// Bytes consumed from the reader so far, line terminators included.
    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<ReportLine, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.finished = true;
            return Some(Err(SourceError::Cancelled {
                line: self.lines + 1,
            }));
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.finished = true;
                None
            }
            Ok(n) => {
                self.bytes += n as u64;
                self.lines += 1;
                let mut end = self.buf.len();
                if end > 0 && self.buf[end - 1] == b'\n' {
                    end -= 1;
                }
                if end > 0 && self.buf[end - 1] == b'\r' {
                    end -= 1;
                }
                let text = String::from_utf8_lossy(&self.buf[..end]).into_owned();
                Some(Ok(ReportLine {
                    number: self.lines,
                    text,
                }))
            }
            Err(source) => {
                self.finished = true;
                Some(Err(SourceError::Io {
                    line: self.lines + 1,
                    source,
                }))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for LineSource<R> {}
