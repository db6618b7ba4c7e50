use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dirs::DirectoryPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchEventKind {
    Created,
    Deleted,
    RenamedFrom,
    RenamedTo,
}

impl WatchEventKind {
    /// Single-character code used by the compact output format.
    pub fn code(&self) -> char {
        match self {
            Self::Created => 'C',
            Self::Deleted => 'D',
            Self::RenamedFrom => '<',
            Self::RenamedTo => '>',
        }
    }
}

/// One file-level change inside a watched directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    /// Entry name only, not the full path
    pub name: String,
    /// Watched directory the entry lives in
    pub directory: DirectoryPath,
    pub kind: WatchEventKind,
    pub timestamp: DateTime<Utc>,
}

impl WatchEvent {
    pub fn new(name: impl Into<String>, directory: DirectoryPath, kind: WatchEventKind) -> Self {
        Self {
            name: name.into(),
            directory,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Human-readable notification line.
    pub fn message(&self) -> String {
        match self.kind {
            WatchEventKind::Created => format!("[+] {} gestures a salutation!", self.name),
            WatchEventKind::Deleted => format!("[-] {} bid farewell.", self.name),
            WatchEventKind::RenamedFrom => format!("[?] {} had changed its identity.", self.name),
            WatchEventKind::RenamedTo => format!("    ==> {}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> DirectoryPath {
        serde_json::from_str("\"/watched\"").unwrap()
    }

    #[test]
    fn test_message_names_entry_and_kind() {
        let created = WatchEvent::new("test.txt", dir(), WatchEventKind::Created);
        assert_eq!(created.message(), "[+] test.txt gestures a salutation!");

        let deleted = WatchEvent::new("test.txt", dir(), WatchEventKind::Deleted);
        assert!(deleted.message().starts_with("[-] test.txt"));

        let to = WatchEvent::new("new.txt", dir(), WatchEventKind::RenamedTo);
        assert!(to.message().ends_with("==> new.txt"));
    }

    #[test]
    fn test_json_shape() {
        let event = WatchEvent::new("a.txt", dir(), WatchEventKind::RenamedFrom);
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["name"], "a.txt");
        assert_eq!(value["directory"], "/watched");
        assert_eq!(value["kind"], "RenamedFrom");
        assert!(value["timestamp"].is_string());
    }
}
