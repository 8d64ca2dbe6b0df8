//! Timeseek - last-N-minutes extraction from rotated access logs
//!
//! Finds, in a directory of rotated, append-only log files, every record
//! written within the last N minutes and streams them oldest first, without
//! reading any file in full.
//!
//! # Components
//!
//! - [`list_log_files`]: regular files of a directory, oldest modification first
//! - [`Record`]: parser for the common log format line grammar
//! - [`TimeIndexer`]: binary search for the first record at or after a cutoff
//! - [`LogReader`]: picks the boundary file, seeks it, and streams it plus every newer file
//!
//! # Example
//!
//! ```rust,no_run
//! use timeseek_rs::{LogReader, ScanConfig};
//!
//! let config = ScanConfig::new()
//!     .with_directory("/var/log/httpd")
//!     .with_lookback_minutes(5);
//!
//! let reader = LogReader::new(config)?;
//! reader.print(&mut std::io::stdout().lock())?;
//! # Ok::<(), timeseek_rs::Error>(())
//! ```

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod dir;
pub mod error;
pub mod index;
pub mod metrics;
pub mod reader;
pub mod record;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ScanConfig;
pub use dir::{list_log_files, LogFile};
pub use error::{Error, Result};
pub use index::{IndexOutcome, TimeIndexer};
pub use metrics::{MetricsSnapshot, ScanMetrics};
pub use reader::LogReader;
pub use record::{parse_timestamp, Record, TIMESTAMP_FORMAT};
