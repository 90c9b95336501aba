//! Output directory layout and file naming.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::config::{DEFAULT_NAME_MAX_LEN, SpyderConfig};
use crate::error::Result;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("name pattern is valid"));

/// Name used when sanitizing leaves nothing.
pub const FALLBACK_NAME: &str = "target";

/// The three artifacts a run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Members,
    Transcript,
    Links,
}

impl Artifact {
    /// Subdirectory under the output root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Artifact::Members => "members",
            Artifact::Transcript => "chats",
            Artifact::Links => "crawled_links",
        }
    }

    /// File name prefix.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Artifact::Members => "members",
            Artifact::Transcript => "messages",
            Artifact::Links => "crawled_links",
        }
    }

    /// Header row, written once when the file is created.
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Artifact::Members => &["user_id", "username", "name", "profile_link", "phone"],
            Artifact::Transcript => &["message_id", "date", "sender", "text"],
            Artifact::Links => &["invite_link"],
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Artifact::Members => write!(f, "members list"),
            Artifact::Transcript => write!(f, "chat messages"),
            Artifact::Links => write!(f, "crawled invite links"),
        }
    }
}

/// Sanitizes an entity name for use in a file name.
///
/// Runs of characters outside `[A-Za-z0-9_]` become `_`, leading and trailing
/// underscores are dropped, and the result is cut to `max_len` characters.
///
/// ```
/// use tgspyder::core::output::safe_name;
///
/// assert_eq!(safe_name("  OSINT Chat! 2024 ", 80), "OSINT_Chat_2024");
/// assert_eq!(safe_name("!!!", 80), "target");
/// assert_eq!(safe_name("abcdef", 3), "abc");
/// ```
pub fn safe_name(raw: &str, max_len: usize) -> String {
    let replaced = UNSAFE_CHARS.replace_all(raw.trim(), "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    // Only ASCII survives the replacement, so byte length equals char count.
    trimmed[..trimmed.len().min(max_len)].to_string()
}

/// Timestamp component of file names: `YYYYMMDD_HHMMSS`.
pub fn stamp(at: DateTime<Local>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Where output files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    name_max_len: usize,
}

impl OutputLayout {
    /// Creates a layout rooted at `root` with the default name length.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name_max_len: DEFAULT_NAME_MAX_LEN,
        }
    }

    /// Creates a layout from the configuration.
    pub fn from_config(config: &SpyderConfig) -> Self {
        Self {
            root: config.output_root.clone(),
            name_max_len: config.name_max_len,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sanitizes `name` with this layout's length limit.
    pub fn file_name_part(&self, name: &str) -> String {
        safe_name(name, self.name_max_len)
    }

    /// Path of an artifact file for `name` at time `at`. Does not touch the disk.
    pub fn path_for(&self, artifact: Artifact, name: &str, at: DateTime<Local>) -> PathBuf {
        self.root.join(artifact.dir_name()).join(format!(
            "{}_{}_{}.csv",
            artifact.file_prefix(),
            self.file_name_part(name),
            stamp(at)
        ))
    }

    /// Creates the artifact directory if needed and returns its path.
    pub fn ensure_dir(&self, artifact: Artifact) -> Result<PathBuf> {
        let dir = self.root.join(artifact.dir_name());
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
