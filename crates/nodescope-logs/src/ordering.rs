use std::cmp::Ordering;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use nodescope_types::Entry;

/// Criterion used to order the collected entries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum SortKey {
    /// Oldest timestamp first
    #[default]
    Date,
    /// DEBUG first, ERROR last
    LogLevel,
    /// Line number within the file, regardless of which node it came from
    LineNumber,
    /// Node address, numerically for IP addresses
    NodeIp,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid sort option: {0} (expected date, loglevel, linenumber or nodeip)")]
pub struct UnknownSortKey(pub String);

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::LogLevel => "loglevel",
            Self::LineNumber => "linenumber",
            Self::NodeIp => "nodeip",
        }
    }

    /// Three-way comparison implementing this criterion
    pub fn comparator(self) -> fn(&Entry, &Entry) -> Ordering {
        match self {
            Self::Date => |a: &Entry, b: &Entry| a.timestamp.cmp(&b.timestamp),
            Self::LogLevel => |a: &Entry, b: &Entry| a.severity.cmp(&b.severity),
            Self::LineNumber => |a: &Entry, b: &Entry| a.line_number.cmp(&b.line_number),
            Self::NodeIp => {
                |a: &Entry, b: &Entry| compare_addresses(&a.source_address, &b.source_address)
            }
        }
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "loglevel" => Ok(Self::LogLevel),
            "linenumber" => Ok(Self::LineNumber),
            "nodeip" => Ok(Self::NodeIp),
            other => Err(UnknownSortKey(other.to_string())),
        }
    }
}

impl TryFrom<String> for SortKey {
    type Error = UnknownSortKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable sort of `entries` by `key`
pub fn sort_entries(entries: &mut [Entry], key: SortKey) {
    entries.sort_by(key.comparator());
}

/// Compare node addresses
///
/// Two IP addresses compare by value (IPv4 in its IPv6-mapped form), so
/// `10.0.0.2` comes before `10.0.0.10`. Anything that does not parse as an
/// IP compares byte-wise against other unparseable addresses and sorts after
/// every IP address.
pub fn compare_addresses(a: &str, b: &str) -> Ordering {
    match (ip_octets(a), ip_octets(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.as_bytes().cmp(b.as_bytes()),
    }
}

fn ip_octets(address: &str) -> Option<[u8; 16]> {
    match address.parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => Some(v4.to_ipv6_mapped().octets()),
        IpAddr::V6(v6) => Some(v6.octets()),
    }
}
