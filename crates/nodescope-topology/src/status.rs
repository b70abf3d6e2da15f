use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use nodescope_types::Source;

/// Two-letter status/state codes that start a node row
const STATUS_CODES: [&str; 7] = ["UN", "DN", "UL", "DL", "UU", "UJ", "UM"];

const DATACENTER_PREFIX: &str = "Datacenter:";

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("no nodes found in nodetool status output")]
    NoSourcesFound,

    #[error("failed to read status report: {0}")]
    Io(#[from] std::io::Error),
}

/// Nodes listed in a status report, in the order they were encountered
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    sources: Vec<Source>,
}

impl Topology {
    /// Parse a status report
    ///
    /// `Datacenter:` lines set the group for the node rows that follow them.
    /// Rows starting with a status code contribute one source each, using the
    /// second whitespace-separated field as the address. Everything else is
    /// ignored.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, TopologyError> {
        let mut sources = Vec::new();
        let mut datacenter = String::new();

        for line in reader.lines() {
            let line = line?;

            if line.starts_with(DATACENTER_PREFIX) {
                if let Some(name) = line.split_whitespace().nth(1) {
                    datacenter = name.to_string();
                }
            } else if STATUS_CODES.iter().any(|code| line.starts_with(code)) {
                if let Some(address) = line.split_whitespace().nth(1) {
                    sources.push(Source::new(address, datacenter.as_str()));
                }
            }
        }

        if sources.is_empty() {
            return Err(TopologyError::NoSourcesFound);
        }

        tracing::debug!(nodes = sources.len(), "parsed status report");
        Ok(Self { sources })
    }

    /// Read and parse a status report from disk
    pub fn from_path(path: &Path) -> Result<Self, TopologyError> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Distinct datacenter names, sorted
    pub fn groups(&self) -> BTreeSet<&str> {
        self.sources.iter().map(|s| s.group.as_str()).collect()
    }

    /// Sources belonging to any of the given datacenters, in report order
    pub fn select<S: AsRef<str>>(&self, groups: &[S]) -> Vec<Source> {
        let wanted: HashSet<&str> = groups.iter().map(|g| g.as_ref()).collect();
        self.sources
            .iter()
            .filter(|s| wanted.contains(s.group.as_str()))
            .cloned()
            .collect()
    }
}

/// Split a comma-delimited list, trimming items and dropping empty ones
pub fn parse_group_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(input: &str) -> Result<Topology, TopologyError> {
        Topology::parse(input.as_bytes())
    }

    #[test]
    fn test_single_node() {
        let topo = parse("Datacenter: DC1\nUN 127.0.0.1\n").unwrap();
        assert_eq!(topo.sources(), &[Source::new("127.0.0.1", "DC1")]);
    }

    #[test]
    fn test_multiple_datacenters() {
        let topo = parse(
            "Datacenter: DC1\nUN 127.0.0.1\nUN 127.0.0.2\nDatacenter: DC2\nUN 127.0.1.1\n",
        )
        .unwrap();
        assert_eq!(
            topo.sources(),
            &[
                Source::new("127.0.0.1", "DC1"),
                Source::new("127.0.0.2", "DC1"),
                Source::new("127.0.1.1", "DC2"),
            ]
        );
    }

    #[test]
    fn test_all_status_codes() {
        let topo = parse(
            "Datacenter: DC1\nDN 127.0.0.1\nUN 127.0.0.2\nUJ 127.0.0.3\nUM 127.0.0.4\nUL 127.0.0.5\nDL 127.0.0.6\nUU 127.0.0.7\n",
        )
        .unwrap();
        assert_eq!(topo.sources().len(), 7);
        assert!(topo.sources().iter().all(|s| s.group == "DC1"));
    }

    #[test]
    fn test_realistic_report() {
        let report = "\
Datacenter: us-east
===================
Status=Up/Down
|/ State=Normal/Leaving/Joining/Moving
--  Address    Load       Tokens  Owns (effective)  Host ID                               Rack
UN  10.0.0.10  1.2 GiB    256     33.3%             6d9d3f4c-2a51-4f8c-9d3a-0a1b2c3d4e5f  r1
DN  10.0.0.2   1.1 GiB    256     33.3%             7e0e4f5d-3b62-4a9d-8e4b-1b2c3d4e5f6a  r1
Datacenter: eu-west
===================
UN  10.1.0.1   900 MiB    256     33.3%             8f1f5a6e-4c73-4bae-9f5c-2c3d4e5f6a7b  r2
";
        let topo = parse(report).unwrap();
        assert_eq!(
            topo.sources(),
            &[
                Source::new("10.0.0.10", "us-east"),
                Source::new("10.0.0.2", "us-east"),
                Source::new("10.1.0.1", "eu-west"),
            ]
        );
    }

    #[test]
    fn test_row_before_any_datacenter_has_empty_group() {
        let topo = parse("UN 10.0.0.1\nDatacenter: DC1\nUN 10.0.0.2\n").unwrap();
        assert_eq!(topo.sources()[0].group, "");
        assert_eq!(topo.sources()[1].group, "DC1");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let topo = parse("Datacenter: DC1\nUN 10.0.0.1\nUN 10.0.0.1\n").unwrap();
        assert_eq!(topo.sources().len(), 2);
    }

    #[test]
    fn test_no_nodes() {
        assert!(matches!(
            parse("bad input format\n"),
            Err(TopologyError::NoSourcesFound)
        ));
        // A status code with no address is not a node row
        assert!(matches!(
            parse("Datacenter: DC1\nUN\n"),
            Err(TopologyError::NoSourcesFound)
        ));
    }

    #[test]
    fn test_groups_are_distinct_and_sorted() {
        let topo = parse(
            "Datacenter: DC2\nUN 10.0.0.1\nDatacenter: DC1\nUN 10.0.0.2\nDatacenter: DC2\nUN 10.0.0.3\n",
        )
        .unwrap();
        assert_eq!(topo.groups().into_iter().collect::<Vec<_>>(), vec!["DC1", "DC2"]);
    }

    #[test]
    fn test_select() {
        let topo = parse(
            "Datacenter: dc1\nUN 192.168.1.1\nUN 192.168.1.2\nDatacenter: dc2\nUN 192.168.1.3\nDatacenter: dc3\nUN 192.168.1.4\n",
        )
        .unwrap();
        let selected = topo.select(&["dc1", "dc3"]);
        assert_eq!(
            selected,
            vec![
                Source::new("192.168.1.1", "dc1"),
                Source::new("192.168.1.2", "dc1"),
                Source::new("192.168.1.4", "dc3"),
            ]
        );
        assert!(topo.select(&["nope"]).is_empty());
    }

    #[test]
    fn test_parse_group_list() {
        assert_eq!(parse_group_list("DC1, DC2,,"), vec!["DC1", "DC2"]);
        assert!(parse_group_list("").is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Datacenter: DC1").unwrap();
        writeln!(file, "UN 10.0.0.1").unwrap();
        let topo = Topology::from_path(file.path()).unwrap();
        assert_eq!(topo.sources().len(), 1);

        let missing = Topology::from_path(Path::new("/nonexistent/status.txt"));
        assert!(matches!(missing, Err(TopologyError::Io(_))));
    }
}
