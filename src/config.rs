//! Configuration types.
//!
//! - [`SpyderConfig`] - where output goes and which collaborator to use,
//!   loadable from a TOML file
//! - [`CrawlOptions`] - which artifacts a history crawl produces
//!
//! # Example
//!
//! ```rust
//! use tgspyder::config::{CrawlOptions, SpyderConfig};
//!
//! let config = SpyderConfig::new().with_output_root("out");
//! let options = CrawlOptions::new().with_transcript(true).with_links(true);
//!
//! assert!(options.is_active());
//! assert_eq!(config.output_root.to_str(), Some("out"));
//! ```
//!
//! A TOML file may set any subset of the fields:
//!
//! ```toml
//! output_root = "/srv/osint/TGSpyder Output"
//! name_max_len = 60
//! snapshot_dir = "/srv/osint/snapshot"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpyderError};

/// Default directory, relative to the working directory, for all output.
pub const DEFAULT_OUTPUT_ROOT: &str = "TGSpyder Output";

/// Default maximum length of the sanitized entity name in file names.
pub const DEFAULT_NAME_MAX_LEN: usize = 80;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpyderConfig {
    /// Root of the output tree (default: `TGSpyder Output`)
    pub output_root: PathBuf,

    /// Maximum length of the entity name in output file names (default: 80)
    pub name_max_len: usize,

    /// Snapshot directory used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for SpyderConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            name_max_len: DEFAULT_NAME_MAX_LEN,
            snapshot_dir: None,
        }
    }
}

impl SpyderConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a TOML file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| SpyderError::config(path, e.to_string()))?;
        Self::from_toml(&content).map_err(|e| SpyderError::config(path, e.to_string()))
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    #[must_use]
    pub fn with_name_max_len(mut self, len: usize) -> Self {
        self.name_max_len = len;
        self
    }

    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }
}

/// Selects the artifacts of a history crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlOptions {
    /// Write the message transcript (`chats/messages_*.csv`)
    pub transcript: bool,

    /// Write discovered invite links (`crawled_links/crawled_links_*.csv`)
    pub links: bool,
}

impl CrawlOptions {
    /// Creates options with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Both artifacts selected.
    pub fn all() -> Self {
        Self {
            transcript: true,
            links: true,
        }
    }

    #[must_use]
    pub fn with_transcript(mut self, enabled: bool) -> Self {
        self.transcript = enabled;
        self
    }

    #[must_use]
    pub fn with_links(mut self, enabled: bool) -> Self {
        self.links = enabled;
        self
    }

    /// Returns `true` if at least one artifact is selected.
    pub fn is_active(&self) -> bool {
        self.transcript || self.links
    }
}
