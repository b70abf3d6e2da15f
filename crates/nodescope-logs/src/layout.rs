use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Where each node's log file lives inside a diagnostics bundle
///
/// Files are found at `<root>/nodes/<address>/logs/<subsystem>/<file_name>`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogLayout {
    pub subsystem: String,
    pub file_name: String,
}

impl Default for LogLayout {
    fn default() -> Self {
        Self {
            subsystem: "cassandra".to_string(),
            file_name: "system.log".to_string(),
        }
    }
}

impl LogLayout {
    /// Path of the log file for the node with the given address
    pub fn resolve(&self, root: &Path, address: &str) -> PathBuf {
        root.join("nodes")
            .join(address)
            .join("logs")
            .join(&self.subsystem)
            .join(&self.file_name)
    }
}
