//! Log processing for nodescope
//!
//! This crate provides line classification, query filtering, per-node
//! scanning, concurrent aggregation and ordering of log entries.

mod aggregator;
mod filter;
mod layout;
mod ordering;
mod parser;
mod scanner;

pub use aggregator::{Aggregation, SourceFailure, aggregate};
pub use filter::QueryChain;
pub use layout::LogLayout;
pub use ordering::{SortKey, UnknownSortKey, compare_addresses, sort_entries};
pub use parser::{ClassifyError, EntryHeader, LineClassifier, LineKind};
pub use scanner::{ScanError, ScanStats, SourceScanner};

// Re-export types used in our public API
pub use nodescope_types::{Entry, LevelCounts, Severity, Source};
