//! Scan metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use parking_lot::Mutex;
use serde::Serialize;

/// Counters and timings gathered while scanning a log directory
#[derive(Debug)]
pub struct ScanMetrics {
    // File counts
    /// Number of files in the directory listing
    files_listed: AtomicUsize,
    /// Number of files binary-searched
    files_indexed: AtomicUsize,
    /// Number of files (or file tails) streamed to the sink
    files_streamed: AtomicUsize,

    // Data metrics
    /// Lines probed during binary search
    probes: AtomicUsize,
    /// Lines written to the sink
    lines_written: AtomicUsize,
    /// Bytes written to the sink
    bytes_written: AtomicUsize,

    // Timing metrics
    /// Total indexing duration in nanoseconds
    index_duration_ns: AtomicU64,
    /// Total streaming duration in nanoseconds
    stream_duration_ns: AtomicU64,
    /// Duration of the most recent index lookup
    last_index_duration: Mutex<Duration>,

    // Internal state
    /// Start time of the metrics collector
    start_time: Instant,
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Files in the directory listing
    pub files_listed: usize,
    /// Files binary-searched
    pub files_indexed: usize,
    /// Files streamed to the sink
    pub files_streamed: usize,
    /// Lines probed during binary search
    pub probes: usize,
    /// Lines written to the sink
    pub lines_written: usize,
    /// Bytes written to the sink
    pub bytes_written: usize,
    /// Total indexing time in microseconds
    pub index_micros: u64,
    /// Total streaming time in microseconds
    pub stream_micros: u64,
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            files_listed: AtomicUsize::new(0),
            files_indexed: AtomicUsize::new(0),
            files_streamed: AtomicUsize::new(0),

            probes: AtomicUsize::new(0),
            lines_written: AtomicUsize::new(0),
            bytes_written: AtomicUsize::new(0),

            index_duration_ns: AtomicU64::new(0),
            stream_duration_ns: AtomicU64::new(0),
            last_index_duration: Mutex::new(Duration::from_secs(0)),

            start_time: Instant::now(),
        }
    }

    /// Set the size of the directory listing
    pub fn set_files_listed(&self, count: usize) {
        self.files_listed.store(count, Ordering::Relaxed);
    }

    /// Record one completed index lookup
    pub fn record_index(&self, probes: usize, duration: Duration) {
        self.files_indexed.fetch_add(1, Ordering::Relaxed);
        self.probes.fetch_add(probes, Ordering::Relaxed);
        self.index_duration_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        *self.last_index_duration.lock() = duration;
    }

    /// Record one streamed file
    pub fn record_stream(&self, lines: usize, bytes: usize, duration: Duration) {
        self.files_streamed.fetch_add(1, Ordering::Relaxed);
        self.lines_written.fetch_add(lines, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.stream_duration_ns.fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Get last index lookup duration
    pub fn get_last_index_duration(&self) -> Duration {
        *self.last_index_duration.lock()
    }

    /// Get uptime of the metrics collector
    pub fn get_uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Copy all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            files_listed: self.files_listed.load(Ordering::Relaxed),
            files_indexed: self.files_indexed.load(Ordering::Relaxed),
            files_streamed: self.files_streamed.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            lines_written: self.lines_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            index_micros: self.index_duration_ns.load(Ordering::Relaxed) / 1_000,
            stream_micros: self.stream_duration_ns.load(Ordering::Relaxed) / 1_000,
        }
    }

    /// Get a report of all metrics
    pub fn get_report(&self) -> String {
        let snapshot = self.snapshot();
        let mut report = String::new();

        report.push_str("=== Timeseek Scan Report ===\n\n");

        report.push_str("Files:\n");
        report.push_str(&format!("  Listed: {}\n", snapshot.files_listed));
        report.push_str(&format!("  Indexed: {}\n", snapshot.files_indexed));
        report.push_str(&format!("  Streamed: {}\n\n", snapshot.files_streamed));

        report.push_str("Data Metrics:\n");
        report.push_str(&format!("  Probes: {}\n", snapshot.probes));
        report.push_str(&format!("  Lines Written: {}\n", snapshot.lines_written));
        report.push_str(&format!("  Bytes Written: {}\n\n", snapshot.bytes_written));

        report.push_str("Performance Metrics:\n");
        report.push_str(&format!("  Index Time: {}µs\n", snapshot.index_micros));
        report.push_str(&format!("  Last Index Time: {:?}\n", self.get_last_index_duration()));
        report.push_str(&format!("  Stream Time: {}µs\n", snapshot.stream_micros));
        report.push_str(&format!("  Uptime: {:?}\n", self.get_uptime()));

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_metrics_recording() {
        let metrics = ScanMetrics::new();

        metrics.set_files_listed(3);
        metrics.record_index(12, Duration::from_millis(2));
        metrics.record_stream(4, 400, Duration::from_millis(1));
        metrics.record_stream(2, 200, Duration::from_millis(1));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.files_listed, 3);
        assert_eq!(snapshot.files_indexed, 1);
        assert_eq!(snapshot.files_streamed, 2);
        assert_eq!(snapshot.probes, 12);
        assert_eq!(snapshot.lines_written, 6);
        assert_eq!(snapshot.bytes_written, 600);
        assert_eq!(snapshot.index_micros, 2_000);
        assert_eq!(snapshot.stream_micros, 2_000);
        assert_eq!(metrics.get_last_index_duration(), Duration::from_millis(2));
    }

    #[test]
    fn test_metrics_report() {
        let metrics = ScanMetrics::new();
        metrics.record_stream(1, 10, Duration::from_micros(5));

        let report = metrics.get_report();
        assert!(report.contains("Files:"));
        assert!(report.contains("Lines Written: 1"));
        assert!(report.contains("Performance Metrics:"));
        assert!(report.contains("Uptime:"));

        let json = serde_json::to_string(&metrics.snapshot()).unwrap();
        assert!(json.contains("\"bytes_written\":10"));
    }

    #[test]
    fn test_metrics_thread_safety() {
        let metrics = Arc::new(ScanMetrics::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.record_stream(1, 10, Duration::from_nanos(1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().lines_written, 800);
        assert_eq!(metrics.snapshot().bytes_written, 8000);
    }
}
