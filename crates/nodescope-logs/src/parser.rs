use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use nodescope_types::{InvalidSeverity, Severity};

/// Leading word followed by whitespace: the shape of an entry's first line
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)^(\w+)\s").expect("header pattern is valid"));

/// Embedded timestamp, e.g. `2023-07-05 13:03:37,128`
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2},\d{3}")
        .expect("timestamp pattern is valid")
});

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Why a header-shaped line could not start an entry
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    InvalidSeverity(#[from] InvalidSeverity),

    #[error("no timestamp found")]
    MissingTimestamp,

    #[error("invalid timestamp '{text}': {source}")]
    InvalidTimestamp {
        text: String,
        source: chrono::ParseError,
    },
}

/// Severity and timestamp pulled from an entry's first line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryHeader {
    pub severity: Severity,
    pub timestamp: NaiveDateTime,
}

/// Outcome of classifying one physical line
#[derive(Debug)]
pub enum LineKind {
    /// Starts a new entry
    Header(EntryHeader),

    /// Belongs to the message of the previous entry
    Continuation,

    /// Looks like a header but carries no usable level or timestamp
    Malformed(ClassifyError),
}

/// Classifier for Cassandra-style `LEVEL [thread] yyyy-MM-dd HH:mm:ss,SSS ...` lines
pub struct LineClassifier;

impl LineClassifier {
    /// Classify a single physical line
    pub fn classify(line: &str) -> LineKind {
        let Some(caps) = HEADER_RE.captures(line) else {
            return LineKind::Continuation;
        };

        match Self::parse_header(&caps[1], line) {
            Ok(header) => LineKind::Header(header),
            Err(e) => LineKind::Malformed(e),
        }
    }

    /// Whether the line starts with a word token followed by whitespace
    pub fn is_header_shaped(line: &str) -> bool {
        HEADER_RE.is_match(line)
    }

    fn parse_header(token: &str, line: &str) -> Result<EntryHeader, ClassifyError> {
        let severity = Self::parse_severity(token)?;
        let text = TIMESTAMP_RE
            .find(line)
            .ok_or(ClassifyError::MissingTimestamp)?
            .as_str();
        let timestamp = Self::parse_timestamp(text)?;
        Ok(EntryHeader {
            severity,
            timestamp,
        })
    }

    /// Map a level token (`DEBUG`, `INFO`, `WARN`, `ERROR`) to a severity
    pub fn parse_severity(token: &str) -> Result<Severity, ClassifyError> {
        Ok(token.parse::<Severity>()?)
    }

    /// Parse a `yyyy-MM-dd HH:mm:ss,SSS` timestamp
    pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, ClassifyError> {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|source| {
            ClassifyError::InvalidTimestamp {
                text: text.to_string(),
                source,
            }
        })
    }
}
