//! Settings file for nodescope
//!
//! An optional TOML file supplies defaults that command-line flags override:
//!
//! ```toml
//! sort = "nodeip"
//! format = "json"
//!
//! [layout]
//! subsystem = "cassandra"
//! file_name = "system.log"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use nodescope_logs::{LogLayout, SortKey};

use crate::render::OutputFormat;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub sort: Option<SortKey>,
    pub format: Option<OutputFormat>,
    pub layout: LogLayout,
}

impl Settings {
    /// Load settings from `path`, or fall back to the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
