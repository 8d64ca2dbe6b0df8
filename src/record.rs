//! Access log record parsing
//!
//! Records use the common log format, one per line:
//!
//! ```text
//! 127.0.0.1 user-identifier frank [04/Mar/2022:05:30:00 +0000] "GET /api/endpoint HTTP/1.0" 500 123
//! ```
//!
//! A line either matches the whole grammar or parsing fails; there is no
//! best-effort extraction of the timestamp from a partially valid line.

use chrono::{DateTime, FixedOffset, TimeZone};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// `chrono` format of the bracketed timestamp, e.g. `04/Mar/2022:05:30:00 +0000`
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Full common log format grammar.
static RECORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<addr>\S+) (?P<ident>\S+) (?P<user>\S+) ",
        r"\[(?P<timestamp>\d{2}/[A-Za-z]{3}/\d{4}:\d{2}:\d{2}:\d{2} [+\-]\d{4})\] ",
        r#""(?P<method>\S+)\s?(?P<path>\S+)?\s?(?P<protocol>\S+)?" "#,
        r"(?P<status>\d{3}|-) (?P<size>\d+|-)$",
    ))
    .unwrap_or_else(|_| unreachable!())
});

/// A parsed view over one log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    /// Client address
    pub addr: &'a str,
    /// RFC 1413 identity of the client, usually `-`
    pub ident: &'a str,
    /// Authenticated user, usually `-`
    pub user: &'a str,
    /// When the request was received
    pub timestamp: DateTime<FixedOffset>,
    /// Request method
    pub method: &'a str,
    /// Request target, absent for malformed requests such as `"-"`
    pub path: Option<&'a str>,
    /// Protocol version
    pub protocol: Option<&'a str>,
    /// Response status; `None` when logged as `-`
    pub status: Option<u16>,
    /// Response size in bytes; `None` when logged as `-`
    pub size: Option<u64>,
}

impl<'a> Record<'a> {
    /// Parse every field of a line
    pub fn parse(line: &'a str) -> Result<Self> {
        let line = line.trim();
        let caps = capture(line)?;
        let timestamp = timestamp_of(line, &caps)?;

        let group = |name: &str| caps.name(name).map(|m| m.as_str());
        let status = match group("status") {
            Some("-") | None => None,
            Some(code) => Some(code.parse().map_err(|_| Error::invalid_format(line))?),
        };
        let size = match group("size") {
            Some("-") | None => None,
            Some(bytes) => Some(bytes.parse().map_err(|_| Error::invalid_format(line))?),
        };

        Ok(Self {
            addr: group("addr").unwrap_or_default(),
            ident: group("ident").unwrap_or_default(),
            user: group("user").unwrap_or_default(),
            timestamp,
            method: group("method").unwrap_or_default(),
            path: group("path"),
            protocol: group("protocol"),
            status,
            size,
        })
    }
}

/// Parse only the timestamp of a line
pub fn parse_timestamp(line: &str) -> Result<DateTime<FixedOffset>> {
    let line = line.trim();
    let caps = capture(line)?;
    timestamp_of(line, &caps)
}

/// Whole minutes since the Unix epoch; seconds are truncated
pub fn epoch_minute<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> i64 {
    timestamp.timestamp().div_euclid(60)
}

fn capture(line: &str) -> Result<Captures<'_>> {
    RECORD_REGEX
        .captures(line)
        .ok_or_else(|| Error::invalid_format(line))
}

fn timestamp_of(line: &str, caps: &Captures<'_>) -> Result<DateTime<FixedOffset>> {
    let raw = caps
        .name("timestamp")
        .map(|m| m.as_str())
        .ok_or_else(|| Error::invalid_format(line))?;

    DateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|source| Error::InvalidTimestamp {
        line: line.to_string(),
        timestamp: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    const SAMPLE: &str = r#"127.0.0.1 user-identifier frank [04/Mar/2022:05:30:00 +0000] "GET /api/endpoint HTTP/1.0" 500 123"#;

    #[test]
    fn test_parse_full_record() {
        let record = Record::parse(SAMPLE).unwrap();

        assert_eq!(record.addr, "127.0.0.1");
        assert_eq!(record.ident, "user-identifier");
        assert_eq!(record.user, "frank");
        assert_eq!(record.method, "GET");
        assert_eq!(record.path, Some("/api/endpoint"));
        assert_eq!(record.protocol, Some("HTTP/1.0"));
        assert_eq!(record.status, Some(500));
        assert_eq!(record.size, Some(123));
        assert_eq!(
            record.timestamp.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2022, 3, 4, 5, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_dashes_and_short_request() {
        let line = r#"10.0.0.7 - - [31/Dec/2021:23:59:59 -0700] "-" - -"#;
        let record = Record::parse(line).unwrap();

        assert_eq!(record.method, "-");
        assert_eq!(record.path, None);
        assert_eq!(record.protocol, None);
        assert_eq!(record.status, None);
        assert_eq!(record.size, None);
        assert_eq!(record.timestamp.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(
            record.timestamp.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2022, 1, 1, 6, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_parse_trims_line_endings() {
        let line = format!("{}\r\n", SAMPLE);
        let ts = parse_timestamp(&line).unwrap();
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn test_invalid_format_names_line() {
        let err = parse_timestamp("some invalid log").unwrap_err();
        assert_eq!(err.to_string(), "invalid log format on line 'some invalid log'");

        // Status must be three digits
        let line = r#"127.0.0.1 - frank [04/Mar/2022:05:30:00 +0000] "GET / HTTP/1.0" 50 123"#;
        assert!(matches!(Record::parse(line), Err(Error::InvalidFormat { .. })));

        // Timestamp shape is fixed width
        let line = r#"127.0.0.1 - frank [4/Mar/2022:05:30:00 +0000] "GET / HTTP/1.0" 200 1"#;
        assert!(matches!(parse_timestamp(line), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_invalid_timestamp() {
        let line = r#"127.0.0.1 - frank [31/Feb/2022:05:30:00 +0000] "GET / HTTP/1.0" 200 1"#;
        let err = parse_timestamp(line).unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidTimestamp { ref timestamp, .. } if timestamp == "31/Feb/2022:05:30:00 +0000"
        ));
        assert_eq!(err.offending_line(), Some(line));

        let line = r#"127.0.0.1 - frank [04/Foo/2022:05:30:00 +0000] "GET / HTTP/1.0" 200 1"#;
        assert!(parse_timestamp(line).unwrap_err().is_format_error());
    }

    #[test]
    fn test_epoch_minute_truncates_seconds() {
        let a = Utc.with_ymd_and_hms(2022, 3, 3, 2, 44, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2022, 3, 3, 2, 44, 59).unwrap();
        let c = Utc.with_ymd_and_hms(2022, 3, 3, 2, 45, 0).unwrap();

        assert_eq!(epoch_minute(&a), epoch_minute(&b));
        assert_eq!(epoch_minute(&a) + 1, epoch_minute(&c));

        // Offsets are normalised before truncation
        let local =
            DateTime::parse_from_str("03/Mar/2022:08:14:30 +0530", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(epoch_minute(&local), epoch_minute(&a));
    }
}
