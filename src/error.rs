//! Unified error types for tgspyder.
//!
//! Collaborator calls report [`ApiError`] kinds; the operations built on top
//! of them (resolve a target, enumerate members, crawl history, resolve a
//! sticker pack, look up a user) turn those into a [`SpyderError`] carrying
//! the identifier that failed and the remote message.
//!
//! # Taxonomy
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | [`Resolution`](SpyderError::Resolution) | a target, pack, or user cannot be mapped to an entity |
//! | [`RemoteProtocol`](SpyderError::RemoteProtocol) | the remote side failed in the middle of an operation |
//! | [`UnresolvableProfile`](SpyderError::UnresolvableProfile) | a profile is hidden by privacy limits |
//! | [`Parse`](SpyderError::Parse) | malformed user input, e.g. a sticker-pack link |
//! | [`Unexpected`](SpyderError::Unexpected) | anything else |
//!
//! "Already a participant" is not an error at this level: the entity
//! resolver consumes [`ApiError::AlreadyParticipant`] and falls back.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::client::ApiError;

/// A specialized [`Result`] type for tgspyder operations.
pub type Result<T> = std::result::Result<T, SpyderError>;

/// The error type for all tgspyder operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpyderError {
    /// An I/O error occurred, typically while creating output files.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The target could not be mapped to an entity.
    #[error("Unable to resolve '{target}': {source}")]
    Resolution {
        /// What the user asked for
        target: String,
        #[source]
        source: ApiError,
    },

    /// The remote side reported a failure mid-operation.
    #[error("Remote error while {operation} '{target}': {source}")]
    RemoteProtocol {
        /// What was being done, e.g. "listing members of"
        operation: &'static str,
        /// Identifier the operation was working on
        target: String,
        #[source]
        source: ApiError,
    },

    /// The profile exists but privacy settings hide it.
    #[error("Profile {id} could not be resolved (Telegram limitation)")]
    UnresolvableProfile {
        /// Numeric id that failed
        id: i64,
    },

    /// Malformed user input.
    #[error("Unable to parse {what} from '{input}': {message}")]
    Parse {
        /// Kind of input, e.g. "sticker pack short name"
        what: &'static str,
        /// The raw input
        input: String,
        /// What is wrong with it
        message: String,
    },

    /// The configuration file is unreadable or invalid.
    #[error("Invalid config file {}: {message}", path.display())]
    Config {
        path: PathBuf,
        message: String,
    },

    /// The snapshot directory is unreadable or invalid.
    #[error("Invalid snapshot {}: {message}", path.display())]
    Snapshot {
        path: PathBuf,
        message: String,
    },

    /// Catch-all.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl SpyderError {
    /// Creates a resolution error.
    pub fn resolution(target: impl Into<String>, source: ApiError) -> Self {
        SpyderError::Resolution {
            target: target.into(),
            source,
        }
    }

    /// Creates a remote protocol error.
    pub fn remote(operation: &'static str, target: impl Into<String>, source: ApiError) -> Self {
        SpyderError::RemoteProtocol {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(what: &'static str, input: impl Into<String>, message: impl Into<String>) -> Self {
        SpyderError::Parse {
            what,
            input: input.into(),
            message: message.into(),
        }
    }

    /// Creates a config error.
    pub fn config(path: &Path, message: impl Into<String>) -> Self {
        SpyderError::Config {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a snapshot error.
    pub fn snapshot(path: &Path, message: impl Into<String>) -> Self {
        SpyderError::Snapshot {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is an I/O or CSV error.
    pub fn is_io(&self) -> bool {
        matches!(self, SpyderError::Io(_) | SpyderError::Csv(_))
    }

    /// Returns `true` if this is a resolution error.
    pub fn is_resolution(&self) -> bool {
        matches!(self, SpyderError::Resolution { .. })
    }

    /// Returns `true` if this is a remote protocol error.
    pub fn is_remote(&self) -> bool {
        matches!(self, SpyderError::RemoteProtocol { .. })
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, SpyderError::Parse { .. })
    }

    /// Returns the remote failure behind this error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SpyderError::Resolution { source, .. } | SpyderError::RemoteProtocol { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
