//! Configuration for Timeseek
//!
//! This module provides the options consumed by [`LogReader`](crate::LogReader).

use std::fs;
use std::path::{Path, PathBuf};
use chrono::Duration;
use serde::{Serialize, Deserialize};

use crate::error::{Result, Error};

/// Ten years of minutes; larger windows overflow nothing but make no sense
const MAX_LOOKBACK_MINUTES: u32 = 10 * 365 * 24 * 60;

/// Configuration options for a log scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ScanConfig {
    /// Directory holding the rotated log files
    pub directory: PathBuf,
    /// How many minutes back from the reference time records are emitted
    pub lookback_minutes: u32,

    // Performance tuning
    /// Bytes read per step when scanning backward for a line start
    pub scan_buffer_size: usize,
    /// Capacity of the buffered reader used when streaming files
    pub read_buffer_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            lookback_minutes: 1,
            scan_buffer_size: 4096,
            read_buffer_size: 64 * 1024, // 64KB
        }
    }
}

impl ScanConfig {
    /// Create a new scan configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log directory
    pub fn with_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.directory = path.as_ref().to_path_buf();
        self
    }

    /// Set the lookback window in minutes
    pub fn with_lookback_minutes(mut self, minutes: u32) -> Self {
        self.lookback_minutes = minutes;
        self
    }

    /// Set the backward scan step size
    pub fn with_scan_buffer_size(mut self, size: usize) -> Self {
        self.scan_buffer_size = size;
        self
    }

    /// Set the streaming reader capacity
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(Error::config("Directory must not be empty"));
        }

        if self.lookback_minutes < 1 || self.lookback_minutes > MAX_LOOKBACK_MINUTES {
            return Err(Error::config(format!(
                "Lookback must be between 1 and {} minutes",
                MAX_LOOKBACK_MINUTES
            )));
        }

        if self.scan_buffer_size < 1 || self.scan_buffer_size > 1024 * 1024 {
            return Err(Error::config(
                "Scan buffer size must be between 1 byte and 1MB"
            ));
        }

        if self.read_buffer_size < 1024 || self.read_buffer_size > 16 * 1024 * 1024 {
            return Err(Error::config(
                "Read buffer size must be between 1KB and 16MB"
            ));
        }

        Ok(())
    }

    /// Get the lookback window as a Duration
    pub fn lookback(&self) -> Duration {
        Duration::minutes(i64::from(self.lookback_minutes))
    }

    /// Create a human-readable string representation of the configuration
    pub fn to_string_pretty(&self) -> String {
        let mut result = String::new();

        result.push_str("=== Timeseek Configuration ===\n\n");

        result.push_str("Scan:\n");
        result.push_str(&format!("  Directory: {:?}\n", self.directory));
        result.push_str(&format!("  Lookback: {} minutes\n", self.lookback_minutes));

        result.push_str("\nPerformance Tuning:\n");
        result.push_str(&format!("  Scan Buffer Size: {} bytes\n", self.scan_buffer_size));
        result.push_str(&format!("  Read Buffer Size: {} KB\n", self.read_buffer_size / 1024));

        result
    }

    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::open(path, e))?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }
}
