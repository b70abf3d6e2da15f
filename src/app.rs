//! Run pipeline: topology, node selection, aggregation, ordering

use std::path::PathBuf;

use anyhow::{Context, Result};

use nodescope_logs::{Aggregation, LogLayout, QueryChain, SortKey, aggregate, sort_entries};
use nodescope_topology::Topology;

/// Fully resolved options for one run
#[derive(Clone, Debug)]
pub struct Options {
    /// `nodetool status` output describing the cluster
    pub status_file: PathBuf,
    pub mode: Mode,
}

#[derive(Clone, Debug)]
pub enum Mode {
    /// Only list the datacenters found in the status file
    ListGroups,
    Extract(ExtractOptions),
}

#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Root directory of the diagnostics bundle
    pub root: PathBuf,
    pub groups: Vec<String>,
    pub query: QueryChain,
    pub sort: SortKey,
    pub layout: LogLayout,
}

/// Result of a run, ready for rendering
#[derive(Debug)]
pub enum Outcome {
    Groups(Vec<String>),
    Entries(Aggregation),
}

pub async fn run(options: Options) -> Result<Outcome> {
    let topology = Topology::from_path(&options.status_file).with_context(|| {
        format!(
            "Error while parsing the nodetool status output {}",
            options.status_file.display()
        )
    })?;

    let extract = match options.mode {
        Mode::ListGroups => {
            let groups = topology.groups().into_iter().map(str::to_string).collect();
            return Ok(Outcome::Groups(groups));
        }
        Mode::Extract(extract) => extract,
    };

    let sources = topology.select(&extract.groups);
    if sources.is_empty() {
        tracing::warn!(datacenters = ?extract.groups, "no nodes found in the selected datacenters");
    }

    let mut aggregation =
        aggregate(&sources, &extract.root, &extract.layout, extract.query).await;
    sort_entries(&mut aggregation.entries, extract.sort);

    Ok(Outcome::Entries(aggregation))
}
