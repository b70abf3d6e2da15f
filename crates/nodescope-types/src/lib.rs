//! Shared types for nodescope
//!
//! This crate contains data structures used across multiple nodescope crates.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Cluster Types
// ============================================================================

/// One addressable member of the cluster, as listed in a status report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    /// Node address, usually an IP
    pub address: String,

    /// Datacenter the node belongs to (empty when the report names none)
    pub group: String,
}

impl Source {
    pub fn new(address: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            group: group.into(),
        }
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level, ordered from least to most severe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Raised when a leading token is not one of the known severity names
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid log level: {0}")]
pub struct InvalidSeverity(pub String);

impl Severity {
    /// All levels in ascending order
    pub const ALL: [Severity; 4] = [Self::Debug, Self::Info, Self::Warn, Self::Error];

    /// Token as it appears at the start of a log line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl FromStr for Severity {
    type Err = InvalidSeverity;

    /// Exact, case-sensitive match on the level token
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(InvalidSeverity(other.to_string())),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log entry, rebuilt from a header line and its continuation lines
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Level taken from the header line
    pub severity: Severity,

    /// Timestamp embedded in the header line (millisecond precision)
    pub timestamp: NaiveDateTime,

    /// 1-based line number of the header line
    pub line_number: u64,

    /// Address of the node whose log produced this entry
    pub source_address: String,

    /// Log file the entry was read from
    pub origin_path: PathBuf,

    /// Header line plus any continuation lines, joined with '\n'
    pub text: String,
}

impl Entry {
    /// Append a continuation line to the message
    pub fn push_line(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }
}

/// Counts per severity
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub debug: usize,
    pub info: usize,
    pub warn: usize,
    pub error: usize,
}

impl LevelCounts {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.severity {
                Severity::Debug => counts.debug += 1,
                Severity::Info => counts.info += 1,
                Severity::Warn => counts.warn += 1,
                Severity::Error => counts.error += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.debug + self.info + self.warn + self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(severity: Severity, text: &str) -> Entry {
        Entry {
            severity,
            timestamp: NaiveDate::from_ymd_opt(2023, 7, 14)
                .unwrap()
                .and_hms_milli_opt(16, 0, 0, 658)
                .unwrap(),
            line_number: 1,
            source_address: "10.0.0.1".to_string(),
            origin_path: PathBuf::from("/tmp/system.log"),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_severity_tokens() {
        for level in Severity::ALL {
            assert_eq!(level.as_str().parse::<Severity>(), Ok(level));
        }
        assert_eq!(
            "INVALID".parse::<Severity>(),
            Err(InvalidSeverity("INVALID".to_string()))
        );
        // Case matters
        assert!("info".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_order_is_declaration_order() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_push_line() {
        let mut e = entry(Severity::Error, "ERROR first");
        e.push_line("\tat Foo.bar");
        assert_eq!(e.text, "ERROR first\n\tat Foo.bar");
    }

    #[test]
    fn test_level_counts() {
        let entries = vec![
            entry(Severity::Error, "a"),
            entry(Severity::Info, "b"),
            entry(Severity::Error, "c"),
        ];
        let counts = LevelCounts::from_entries(&entries);
        assert_eq!(counts.error, 2);
        assert_eq!(counts.info, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_entry_serializes_severity_token() {
        let json = serde_json::to_value(entry(Severity::Warn, "x")).unwrap();
        assert_eq!(json["severity"], "WARN");
        assert_eq!(json["line_number"], 1);
        assert_eq!(json["timestamp"], "2023-07-14T16:00:00.658");
    }
}
