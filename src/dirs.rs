//! The tracked directory list and its flat-file persistence.
//!
//! Paths are kept exactly as the user typed them. Two spellings of the same
//! directory (for example with and without a trailing slash) are distinct
//! entries.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RandPathError, Result};

/// A directory the user asked us to scan and watch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryPath(String);

impl DirectoryPath {
    /// Accept `raw` only if it currently names an existing directory.
    pub fn validate(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(RandPathError::validation(raw, "path is empty"));
        }
        match fs::metadata(raw) {
            Ok(meta) if meta.is_dir() => Ok(Self(raw.to_string())),
            Ok(_) => Err(RandPathError::validation(raw, "not a directory")),
            Err(err) => Err(RandPathError::validation(raw, err.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// True if the path still names a directory right now.
    pub fn is_live_dir(&self) -> bool {
        self.as_path().is_dir()
    }
}

impl fmt::Display for DirectoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for DirectoryPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// The newline-delimited file backing a [`DirectorySet`].
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    path: PathBuf,
}

impl DirectoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort read. A missing file is created empty; any other read
    /// failure yields no entries.
    pub fn load(&self) -> Vec<DirectoryPath> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse_entries(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if let Err(err) = fs::File::create(&self.path) {
                    tracing::debug!("Could not create {}: {}", self.path.display(), err);
                }
                Vec::new()
            }
            Err(err) => {
                tracing::warn!("Could not read {}: {}", self.path.display(), err);
                Vec::new()
            }
        }
    }

    /// Overwrite the file with one path per line.
    pub fn save(&self, entries: &[DirectoryPath]) -> Result<()> {
        let mut file = fs::File::create(&self.path)?;
        for entry in entries {
            writeln!(file, "{}", entry)?;
        }
        file.flush()?;
        Ok(())
    }
}

fn parse_entries(contents: &str) -> Vec<DirectoryPath> {
    // `lines` strips both "\n" and "\r\n"
    contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| DirectoryPath(line.to_string()))
        .collect()
}

/// Ordered, duplicate-free list of tracked directories.
///
/// Every mutation rewrites the store. A failed write is logged and the
/// in-memory list keeps the change.
#[derive(Debug, Clone)]
pub struct DirectorySet {
    entries: Vec<DirectoryPath>,
    store: DirectoryStore,
}

impl DirectorySet {
    pub fn load(store: DirectoryStore) -> Self {
        let entries = store.load();
        tracing::debug!("Loaded {} directories from {}", entries.len(), store.path().display());
        Self { entries, store }
    }

    /// Re-read the store, replacing the in-memory list.
    pub fn reload(&mut self) {
        self.entries = self.store.load();
    }

    pub fn list(&self) -> &[DirectoryPath] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.entries.iter().any(|entry| entry.as_str() == raw)
    }

    /// Owned copy handed to the watcher at start.
    pub fn snapshot(&self) -> Vec<DirectoryPath> {
        self.entries.clone()
    }

    pub fn add(&mut self, raw: &str) -> Result<&DirectoryPath> {
        let dir = DirectoryPath::validate(raw)?;
        if self.contains(raw) {
            return Err(RandPathError::Duplicate(raw.to_string()));
        }

        self.entries.push(dir);
        self.persist();
        tracing::info!("Added directory: {}", raw);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove by 1-based index, falling back to an exact path match.
    pub fn remove(&mut self, selector: &str) -> Result<DirectoryPath> {
        let position = self
            .index_of(selector)
            .or_else(|| self.entries.iter().position(|entry| entry.as_str() == selector))
            .ok_or_else(|| RandPathError::NotFound(selector.to_string()))?;

        let removed = self.entries.remove(position);
        self.persist();
        tracing::info!("Removed directory: {}", removed);
        Ok(removed)
    }

    fn index_of(&self, selector: &str) -> Option<usize> {
        let index = selector.trim().parse::<usize>().ok()?;
        (1..=self.entries.len()).contains(&index).then(|| index - 1)
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.entries) {
            tracing::warn!(
                "Could not save directory list to {}: {}",
                self.store.path().display(),
                err
            );
        }
    }
}
