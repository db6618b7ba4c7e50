use std::collections::{HashMap, HashSet};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use super::events::{WatchEvent, WatchEventKind};
use crate::dirs::DirectoryPath;

struct Subscription {
    directory: DirectoryPath,
    /// Names of subdirectories, so a directory renamed away is still
    /// recognised after it no longer exists.
    child_dirs: HashSet<OsString>,
}

impl Subscription {
    fn new(directory: DirectoryPath) -> Self {
        let child_dirs = fs::read_dir(directory.as_path())
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
                    .map(|entry| entry.file_name())
                    .collect::<HashSet<_>>()
            })
            .unwrap_or_default();
        Self {
            directory,
            child_dirs,
        }
    }
}

/// Live watch registrations keyed by absolute path, the form notify
/// reports event paths in.
#[derive(Default)]
pub struct SubscriptionTable {
    subscriptions: HashMap<PathBuf, Subscription>,
    /// Rename cookies of directories moved away, so the matching
    /// move-in is recognised even if the directory is already gone.
    dir_moves: HashSet<usize>,
}

impl SubscriptionTable {
    /// Register a non-recursive watch for every directory in `snapshot`.
    /// Directories that can't be watched are logged and skipped.
    pub fn register<W: Watcher>(watcher: &mut W, snapshot: &[DirectoryPath]) -> Self {
        let mut table = Self::default();

        for directory in snapshot {
            let key = watch_key(directory.as_path());
            if table.subscriptions.contains_key(&key) {
                tracing::debug!("Already watching {}", directory);
                continue;
            }

            match watcher.watch(&key, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    tracing::debug!("Started watching: {}", directory);
                    table
                        .subscriptions
                        .insert(key, Subscription::new(directory.clone()));
                }
                Err(err) => {
                    tracing::warn!("Could not watch {}: {}. Skipping.", directory, err);
                }
            }
        }

        table
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn lookup(&self, path: &Path) -> Option<&DirectoryPath> {
        self.subscriptions
            .get(&watch_key(path))
            .map(|sub| &sub.directory)
    }

    /// Drop every registration from the watcher.
    pub fn release<W: Watcher>(&mut self, watcher: &mut W) {
        for (path, sub) in self.subscriptions.drain() {
            if let Err(err) = watcher.unwatch(&path) {
                tracing::debug!("Unwatch {} failed: {}", sub.directory, err);
            }
        }
    }

    /// Turn a raw notify event into file-level notifications.
    ///
    /// Events about a watched directory itself, or about subdirectories
    /// inside it, produce nothing.
    pub fn decode(&mut self, event: &Event) -> Vec<WatchEvent> {
        let Some(kind) = classify(&event.kind) else {
            return Vec::new();
        };

        let mut decoded = Vec::new();
        for path in &event.paths {
            if self.subscriptions.contains_key(path.as_path()) {
                continue;
            }
            let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
                continue;
            };
            let Some(sub) = self.subscriptions.get_mut(parent) else {
                continue;
            };

            let is_dir = match (kind, &event.kind) {
                (_, EventKind::Create(CreateKind::Folder)) => {
                    sub.child_dirs.insert(name.to_os_string());
                    true
                }
                (_, EventKind::Create(CreateKind::File)) => false,
                (_, EventKind::Remove(RemoveKind::File)) => false,
                (WatchEventKind::Created, _) => {
                    let is_dir = path.is_dir();
                    if is_dir {
                        sub.child_dirs.insert(name.to_os_string());
                    }
                    is_dir
                }
                (WatchEventKind::Deleted, _) => sub.child_dirs.remove(name),
                (WatchEventKind::RenamedFrom, _) => {
                    let is_dir = sub.child_dirs.remove(name);
                    if let (true, Some(cookie)) = (is_dir, event.tracker()) {
                        self.dir_moves.insert(cookie);
                    }
                    is_dir
                }
                (WatchEventKind::RenamedTo, _) => {
                    let moved_dir = event
                        .tracker()
                        .is_some_and(|cookie| self.dir_moves.remove(&cookie));
                    let is_dir = moved_dir || path.is_dir();
                    if is_dir {
                        sub.child_dirs.insert(name.to_os_string());
                    }
                    is_dir
                }
            };

            if is_dir {
                tracing::debug!("Ignoring directory event for {}", path.display());
                continue;
            }

            decoded.push(WatchEvent::new(
                name.to_string_lossy(),
                sub.directory.clone(),
                kind,
            ));
        }
        decoded
    }
}

/// Resolve a relative directory against the working directory the same way
/// notify does before it installs the watch.
fn watch_key(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(err) => {
            tracing::warn!("Could not resolve {}: {}", path.display(), err);
            path.to_path_buf()
        }
    }
}

fn classify(kind: &EventKind) -> Option<WatchEventKind> {
    match kind {
        EventKind::Create(_) => Some(WatchEventKind::Created),
        EventKind::Remove(_) => Some(WatchEventKind::Deleted),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(WatchEventKind::RenamedFrom),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(WatchEventKind::RenamedTo),
        // `Both` repeats a From/To pair we've already reported
        _ => None,
    }
}
