//! Cluster topology for nodescope
//!
//! This crate turns a `nodetool status` style report into the list of nodes
//! to scan, grouped by datacenter.

mod status;

pub use status::{Topology, TopologyError, parse_group_list};

// Re-export types that are used in our public API
pub use nodescope_types::Source;
