//! Filesystem watching
//!
//! Contains the background watcher, its subscription table, decoded events
//! and the sinks that report them.

pub mod events;
pub mod service;
pub mod sink;
pub mod subscriptions;

// Re-export main types
pub use events::{WatchEvent, WatchEventKind};
pub use service::{WatchHandle, WatchService, WatchState};
pub use sink::{ConsoleSink, EventSink};
pub use subscriptions::SubscriptionTable;
