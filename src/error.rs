//! Error handling for Timeseek
//!
//! This module provides error types and result aliases for Timeseek operations.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in Timeseek operations
#[derive(Error, Debug)]
pub enum Error {
    /// Errors related to I/O operations (seek, read, or writing to the sink)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A log file could not be opened
    #[error("failed to open {path:?}: {source}")]
    Open {
        /// File that could not be opened
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// A log file could not be read while streaming
    #[error("failed to read {path:?}: {source}")]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// The log directory could not be listed
    #[error("failed to list directory {path:?}: {source}")]
    Directory {
        /// Directory being listed
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// A line does not match the access log grammar
    #[error("invalid log format on line '{line}'")]
    InvalidFormat {
        /// The offending raw line
        line: String,
    },

    /// The timestamp section of a line matched the grammar but is not a real date
    #[error("invalid timestamp '{timestamp}' on line '{line}': {source}")]
    InvalidTimestamp {
        /// The offending raw line
        line: String,
        /// The bracketed timestamp text
        timestamp: String,
        /// Why chrono rejected it
        #[source]
        source: chrono::ParseError,
    },

    /// Indexing a specific file failed
    #[error("failed to index {path:?}: {source}")]
    Index {
        /// File being indexed
        path: PathBuf,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Timeseek operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new open error
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a new read error
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a new directory listing error
    pub fn directory(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Directory {
            path: path.into(),
            source,
        }
    }

    /// Create a new format error for a raw line
    pub fn invalid_format(line: impl Into<String>) -> Self {
        Self::InvalidFormat { line: line.into() }
    }

    /// Wrap an error raised while indexing `path`
    pub fn index(path: &Path, source: Error) -> Self {
        Self::Index {
            path: path.to_path_buf(),
            source: Box::new(source),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is an I/O error of any kind
    pub fn is_io_error(&self) -> bool {
        match self {
            Self::Io(_) | Self::Open { .. } | Self::Read { .. } | Self::Directory { .. } => true,
            Self::Index { source, .. } => source.is_io_error(),
            _ => false,
        }
    }

    /// Check if this is a record format error
    pub fn is_format_error(&self) -> bool {
        match self {
            Self::InvalidFormat { .. } | Self::InvalidTimestamp { .. } => true,
            Self::Index { source, .. } => source.is_format_error(),
            _ => false,
        }
    }

    /// The raw line that failed to parse, if this is a format error
    pub fn offending_line(&self) -> Option<&str> {
        match self {
            Self::InvalidFormat { line } | Self::InvalidTimestamp { line, .. } => Some(line),
            Self::Index { source, .. } => source.offending_line(),
            _ => None,
        }
    }

    fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::Io(err) => Some(err),
            Self::Open { source, .. }
            | Self::Read { source, .. }
            | Self::Directory { source, .. } => Some(source),
            Self::Index { source, .. } => source.io_source(),
            _ => None,
        }
    }

    /// Get a user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<String> {
        if let Some(err) = self.io_source() {
            return match err.kind() {
                io::ErrorKind::NotFound => {
                    Some("The specified file or directory does not exist".to_string())
                }
                io::ErrorKind::PermissionDenied => Some(
                    "You don't have permission to access this file or directory".to_string(),
                ),
                io::ErrorKind::BrokenPipe => {
                    Some("The output was closed before all records were written".to_string())
                }
                _ => None,
            };
        }

        match self {
            _ if self.is_format_error() => Some(
                "Every line must use the common log format, e.g. \
                 127.0.0.1 - frank [04/Mar/2022:05:30:00 +0000] \"GET / HTTP/1.0\" 200 123"
                    .to_string(),
            ),
            Self::Config(_) => Some("Check the command line flags or the config file".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let open_err = Error::open("/path/to/nothing/http.log", io::ErrorKind::NotFound.into());
        assert!(matches!(open_err, Error::Open { .. }));
        assert!(open_err.is_io_error());

        let format_err = Error::invalid_format("some invalid log");
        assert_eq!(format_err.to_string(), "invalid log format on line 'some invalid log'");
        assert!(format_err.is_format_error());
        assert!(!format_err.is_io_error());

        let config_err = Error::config("lookback must be positive");
        assert!(matches!(config_err, Error::Config(_)));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_io_error());

        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_index_error_keeps_line() {
        let err = Error::index(Path::new("logs/bad.log"), Error::invalid_format("garbage"));

        assert!(err.is_format_error());
        assert_eq!(err.offending_line(), Some("garbage"));
        assert!(err.to_string().contains("bad.log"));
        assert!(err.to_string().contains("invalid log format on line 'garbage'"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = Error::directory("/nope", io::ErrorKind::NotFound.into());
        assert!(err.suggestion().unwrap().contains("does not exist"));

        let err = Error::index(
            Path::new("a.log"),
            Error::read("a.log", io::ErrorKind::PermissionDenied.into()),
        );
        assert!(err.suggestion().unwrap().contains("permission"));

        let err = Error::invalid_format("x");
        assert!(err.suggestion().unwrap().contains("common log format"));

        let err = Error::Io(io::ErrorKind::Other.into());
        assert!(err.suggestion().is_none());
    }
}
