//! Time index over a single log file
//!
//! Locates, by binary search over byte offsets, the first line whose
//! timestamp falls at or after a cutoff. Only a handful of lines are read
//! per lookup, so the cost grows with the logarithm of the file size rather
//! than with the number of records.
//!
//! Comparison is made at minute granularity: a record in the same minute as
//! the cutoff counts as inside the window even if its seconds are earlier.
//! Files are assumed to be append-only and therefore sorted by timestamp.

mod boundary;

pub use boundary::{align_to_line_start, read_line_at, DEFAULT_SCAN_BUFFER_SIZE};

use std::io::{self, Read, Seek, SeekFrom};
use chrono::{DateTime, TimeZone};
use tracing::{debug, trace};

use crate::error::Result;
use crate::record::{epoch_minute, parse_timestamp};

/// Result of a time index lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexOutcome {
    /// Byte offset of the first line at or after the cutoff; always a line start
    Found(u64),
    /// Every record in the file predates the cutoff
    NotFound,
}

impl IndexOutcome {
    /// The found offset, if any
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Found(offset) => Some(*offset),
            Self::NotFound => None,
        }
    }

    /// Whether a boundary was found
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Binary-search time index over a seekable, line-oriented reader
#[derive(Debug)]
pub struct TimeIndexer<R> {
    /// Underlying file or buffer
    reader: R,
    /// Length of the data in bytes, captured once at construction
    len: u64,
    /// Step size of the backward line-start scan
    scan_buffer_size: usize,
    /// Lines probed by the last lookup
    probes: usize,
}

impl<R: Read + Seek> TimeIndexer<R> {
    /// Create an indexer over `reader`
    pub fn new(mut reader: R) -> io::Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        Ok(Self {
            reader,
            len,
            scan_buffer_size: DEFAULT_SCAN_BUFFER_SIZE,
            probes: 0,
        })
    }

    /// Set the number of bytes read per backward scan step
    pub fn with_scan_buffer_size(mut self, size: usize) -> Self {
        self.scan_buffer_size = size.max(1);
        self
    }

    /// Length of the indexed data in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check if there is nothing to index
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of lines probed by the most recent lookup
    pub fn probes(&self) -> usize {
        self.probes
    }

    /// Give back the underlying reader; its cursor position is unspecified
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Find the offset of the first line whose minute is at or after the cutoff's minute.
    ///
    /// The search window `[top, bottom)` only ever shrinks. Every line starting
    /// before `top` is older than the cutoff, and `bottom` is either the end of
    /// the data or the start of a line known to be inside the window, so the
    /// two meet exactly on the boundary line. Blank lines are ordered after
    /// every record, like end of data, so a search that ends on a blank tail
    /// finds nothing.
    ///
    /// Fails with a format error when a probed line does not parse.
    pub fn index_time<Tz: TimeZone>(&mut self, cutoff: &DateTime<Tz>) -> Result<IndexOutcome> {
        let cutoff_minute = epoch_minute(cutoff);
        let (mut top, mut bottom) = (0u64, self.len);
        self.probes = 0;

        while top < bottom {
            let middle = top + (bottom - top) / 2;
            let offset = align_to_line_start(&mut self.reader, middle, self.scan_buffer_size)?;
            let (line, next) = read_line_at(&mut self.reader, offset)?;
            self.probes += 1;

            if reaches_cutoff(&line, cutoff_minute)? {
                bottom = offset;
            } else {
                top = next;
            }

            trace!(middle, offset, next, top, bottom, "probed line");
        }

        // A blank tail is end of data, not a boundary
        let outcome = if top < self.len && !self.blank_from(top)? {
            IndexOutcome::Found(top)
        } else {
            IndexOutcome::NotFound
        };

        debug!(len = self.len, probes = self.probes, ?outcome, "time index resolved");

        Ok(outcome)
    }

    /// Whether every line from `offset` to the end is blank
    fn blank_from(&mut self, mut offset: u64) -> io::Result<bool> {
        while offset < self.len {
            let (line, next) = read_line_at(&mut self.reader, offset)?;
            if !is_blank(&line) {
                return Ok(false);
            }
            offset = next;
        }
        Ok(true)
    }
}

fn is_blank(raw: &[u8]) -> bool {
    String::from_utf8_lossy(raw).trim().is_empty()
}

/// Whether a raw line sorts at or after the cutoff minute
fn reaches_cutoff(raw: &[u8], cutoff_minute: i64) -> Result<bool> {
    if is_blank(raw) {
        return Ok(true);
    }

    let line = String::from_utf8_lossy(raw);
    let timestamp = parse_timestamp(&line)?;
    Ok(epoch_minute(&timestamp) >= cutoff_minute)
}
