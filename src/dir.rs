//! Rotated log file discovery
//!
//! Lists the regular files of a log directory ordered by modification time,
//! which is the coarse chronological key between rotated files.

use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};

/// A log file found in the scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// File name within the directory
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Last modification time
    pub modified: DateTime<Utc>,
    /// Size in bytes at listing time
    pub size: u64,
}

impl LogFile {
    /// Whether the file was modified at or after `at`
    pub fn modified_since(&self, at: &DateTime<Utc>) -> bool {
        self.modified >= *at
    }
}

/// List the regular files of `dir`, oldest modification first.
///
/// Subdirectories are skipped and symlinks are followed. Files sharing a
/// modification time are ordered by name so repeated listings agree.
pub fn list_log_files<P: AsRef<Path>>(dir: P) -> Result<Vec<LogFile>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| Error::directory(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::directory(dir, e))?;
        let path = entry.path();

        // Follows symlinks; dangling links are treated as unreadable files
        let metadata = fs::metadata(&path).map_err(|e| Error::open(&path, e))?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified().map_err(|e| Error::open(&path, e))?;

        files.push(LogFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            modified: DateTime::<Utc>::from(modified),
            size: metadata.len(),
        });
    }

    files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));

    debug!(directory = %dir.display(), count = files.len(), "listed log files");

    Ok(files)
}
