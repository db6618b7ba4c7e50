pub mod cli;
pub mod config;
pub mod console;
pub mod dirs;
pub mod error;
pub mod opener;
pub mod picker;
pub mod scan;
pub mod shell;
pub mod watch;

pub use dirs::{DirectoryPath, DirectorySet, DirectoryStore};
pub use error::{RandPathError, Result};
pub use picker::RandomPicker;
pub use scan::{enumerate, Enumeration, FileRecord};
pub use watch::{WatchEvent, WatchEventKind, WatchHandle, WatchService, WatchState};
