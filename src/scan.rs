use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Serialize;

use crate::dirs::DirectoryPath;
use crate::error::RandPathError;

/// A regular file found under one of the tracked directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileRecord(PathBuf);

impl FileRecord {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn exists(&self) -> bool {
        self.0.exists()
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for FileRecord {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Result of one full scan.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub files: Vec<FileRecord>,
    /// Subtrees that could not be read and were left out.
    pub skipped: usize,
}

/// Walk every live directory depth-first and collect regular files.
///
/// Symlinks, sockets, fifos and devices are ignored. A subdirectory that
/// can't be opened is skipped with a warning; its siblings are still walked.
pub fn enumerate(dirs: &[DirectoryPath]) -> Enumeration {
    let mut result = Enumeration::default();

    for dir in dirs.iter().filter(|dir| dir.is_live_dir()) {
        walk_into(dir.as_path(), &mut result);
    }

    tracing::debug!(
        "Enumerated {} files ({} subtrees skipped)",
        result.files.len(),
        result.skipped
    );
    result
}

fn walk_into(root: &Path, result: &mut Enumeration) {
    // No ignore rules, hidden files included, links not followed
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                if is_file {
                    result.files.push(FileRecord::new(entry.into_path()));
                }
            }
            Err(err) => {
                let warning = access_error(root, err);
                tracing::warn!("{}. Skipping.", warning);
                result.skipped += 1;
            }
        }
    }
}

fn access_error(root: &Path, err: ignore::Error) -> RandPathError {
    let path = error_path(&err).unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));
    RandPathError::Access { path, source }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        _ => None,
    }
}
