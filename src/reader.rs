//! Log stream orchestration
//!
//! Picks the rotated file that holds the cutoff boundary, seeks it with the
//! time index, then streams its tail and every newer file in order.
//!
//! Files are handled strictly one after another: each is opened right before
//! use and closed before the next is opened, and every line is forwarded to
//! the sink as soon as it is read.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ScanConfig;
use crate::dir::{list_log_files, LogFile};
use crate::error::{Error, Result};
use crate::index::{IndexOutcome, TimeIndexer};
use crate::metrics::ScanMetrics;

/// Reads the records of a log directory written in the last N minutes
pub struct LogReader {
    /// Scan configuration
    config: ScanConfig,
    /// Files in ascending modification order
    files: Vec<LogFile>,
    /// Reference clock for the cutoff
    clock: Arc<dyn Clock>,
    /// Metrics collector
    metrics: Arc<ScanMetrics>,
}

impl LogReader {
    /// Validate `config` and list its directory
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let files = list_log_files(&config.directory)?;
        Self::from_files(config, files)
    }

    /// Build a reader over an already listed, oldest-first set of files
    pub fn from_files(config: ScanConfig, files: Vec<LogFile>) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(ScanMetrics::new());
        metrics.set_files_listed(files.len());

        Ok(Self {
            config,
            files,
            clock: Arc::new(SystemClock),
            metrics,
        })
    }

    /// Replace the reference clock
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Get the scan configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Get the listed files, oldest first
    pub fn files(&self) -> &[LogFile] {
        &self.files
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<ScanMetrics> {
        self.metrics.clone()
    }

    /// Earliest timestamp eligible for output: now minus the lookback window
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.clock.now() - self.config.lookback()
    }

    /// Stream every record of the window to `sink`, oldest first.
    ///
    /// Lines already written stay written if a later file fails.
    pub fn print<W: Write>(&self, sink: &mut W) -> Result<()> {
        self.write(sink)
            .and_then(|()| sink.flush().map_err(Error::from))
            .inspect_err(|err| warn!(error = %err, "log scan aborted"))
    }

    /// Like [`print`](Self::print), but does nothing once `cancel` is set.
    ///
    /// The flag is checked a single time before any file is touched.
    pub fn print_cancellable<W: Write>(&self, sink: &mut W, cancel: &AtomicBool) -> Result<()> {
        if cancel.load(Ordering::SeqCst) {
            debug!("log scan cancelled before start");
            return Ok(());
        }
        self.print(sink)
    }

    fn write<W: Write>(&self, sink: &mut W) -> Result<()> {
        let cutoff = self.cutoff();

        // Ascending order: the first recent enough file holds the boundary
        let Some(idx) = self.files.iter().position(|f| f.modified_since(&cutoff)) else {
            debug!(%cutoff, "no file modified since cutoff");
            return Ok(());
        };
        let current = &self.files[idx];
        let rest = &self.files[idx + 1..];

        let file = File::open(&current.path).map_err(|e| Error::open(&current.path, e))?;
        let started = Instant::now();
        let mut indexer = TimeIndexer::new(file)
            .map_err(|e| Error::read(&current.path, e))?
            .with_scan_buffer_size(self.config.scan_buffer_size);
        let outcome = indexer
            .index_time(&cutoff)
            .map_err(|e| Error::index(&current.path, e))?;
        self.metrics.record_index(indexer.probes(), started.elapsed());

        debug!(
            file = %current.name,
            %cutoff,
            ?outcome,
            remaining = rest.len(),
            "boundary file indexed"
        );

        match outcome {
            IndexOutcome::NotFound => {
                drop(indexer);
                match rest.first() {
                    Some(next) if next.modified_since(&cutoff) => self.stream_files(rest, sink),
                    _ => Ok(()),
                }
            }
            IndexOutcome::Found(offset) => {
                let mut file = indexer.into_inner();
                file.seek(SeekFrom::Start(offset))
                    .map_err(|e| Error::read(&current.path, e))?;
                self.stream(&current.path, file, sink)?;
                self.stream_files(rest, sink)
            }
        }
    }

    fn stream_files<W: Write>(&self, files: &[LogFile], sink: &mut W) -> Result<()> {
        for log_file in files {
            let file = File::open(&log_file.path).map_err(|e| Error::open(&log_file.path, e))?;
            self.stream(&log_file.path, file, sink)?;
        }
        Ok(())
    }

    /// Copy `file` from its current position to `sink`, line by line
    fn stream<W: Write>(&self, path: &Path, file: File, sink: &mut W) -> Result<()> {
        let started = Instant::now();
        let mut reader = BufReader::with_capacity(self.config.read_buffer_size, file);
        let mut line = Vec::new();
        let (mut lines, mut bytes) = (0usize, 0usize);

        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| Error::read(path, e))?;
            if read == 0 {
                break;
            }
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }

            sink.write_all(&line)?;
            lines += 1;
            bytes += line.len();
        }

        self.metrics.record_stream(lines, bytes, started.elapsed());
        debug!(path = %path.display(), lines, bytes, "streamed file");

        Ok(())
    }
}
