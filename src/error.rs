//! Error types for randpath.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, RandPathError>;

/// Errors raised by the directory set, the scanner, the picker and the watcher.
#[derive(Error, Debug)]
pub enum RandPathError {
    /// The given path is missing or is not a directory.
    #[error("invalid directory {path}: {reason}")]
    Validation { path: String, reason: String },

    /// The directory is already tracked.
    #[error("directory already in list: {0}")]
    Duplicate(String),

    /// Neither an index nor a tracked path matched the selector.
    #[error("no directory matches: {0}")]
    NotFound(String),

    /// There was nothing to pick from.
    #[error("no files found")]
    EmptySelection,

    /// A directory could not be read or watched; the caller skips it.
    #[error("access denied to {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The watch channel failed; only the watcher stops.
    #[error("watcher stopped: {0}")]
    FatalWatch(String),

    /// The last shown file no longer exists.
    #[error("file not found, it may have been moved or deleted: {}", .0.display())]
    FileGone(PathBuf),

    /// The default-application launcher could not be run.
    #[error("failed to run {program}: {reason}")]
    Launch { program: String, reason: String },

    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RandPathError {
    /// Access errors skip one subtree or subscription and never abort the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Access { .. })
    }

    pub(crate) fn validation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
