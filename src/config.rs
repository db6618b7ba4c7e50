//! Configuration management for randpath
//!
//! This module provides configuration structures and defaults for the
//! directory store, the watcher, the random picker and the console.

use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Global configuration for randpath
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory list persistence
    pub store: StoreConfig,
    /// Background watcher configuration
    pub watcher: WatcherConfig,
    /// Random picker configuration
    pub picker: PickerConfig,
    /// Console configuration
    pub ui: UiConfig,
}

/// Where the directory list lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Flat newline-delimited list of directories
    pub dirs_file: PathBuf,
}

/// Configuration for the background watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Start the watcher at all
    pub enabled: bool,
    /// How long shutdown waits for the watcher before aborting it
    pub shutdown_grace_ms: u64,
}

/// Configuration for random selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Fixed seed; the clock is used when absent
    pub seed: Option<u64>,
}

/// Configuration for the interactive console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Emit ANSI colors
    pub color: bool,
    /// How often the command loop re-checks for shutdown while waiting for input
    pub input_poll_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            watcher: WatcherConfig::default(),
            picker: PickerConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dirs_file: PathBuf::from("dirs.txt"),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shutdown_grace_ms: 2000,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            input_poll_ms: 100,
        }
    }
}

impl WatcherConfig {
    /// Get shutdown grace duration
    pub fn shutdown_grace_duration(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl UiConfig {
    /// Get input poll duration
    pub fn input_poll_duration(&self) -> Duration {
        Duration::from_millis(self.input_poll_ms)
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RANDPATH_DIRS_FILE") {
            if !val.is_empty() {
                config.store.dirs_file = PathBuf::from(val);
            }
        }

        if let Ok(val) = std::env::var("RANDPATH_SEED") {
            if let Ok(seed) = val.parse::<u64>() {
                config.picker.seed = Some(seed);
            }
        }

        if let Ok(val) = std::env::var("RANDPATH_NO_WATCH") {
            if matches!(val.as_str(), "1" | "true" | "yes") {
                config.watcher.enabled = false;
            }
        }

        if let Ok(val) = std::env::var("RANDPATH_INPUT_POLL_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                config.ui.input_poll_ms = ms;
            }
        }

        // https://no-color.org: any non-empty value disables color
        if std::env::var("NO_COLOR").is_ok_and(|val| !val.is_empty()) {
            config.ui.color = false;
        }

        config
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.store.dirs_file.as_os_str().is_empty() {
            return Err("dirs_file must not be empty".to_string());
        }

        if self.ui.input_poll_ms == 0 {
            return Err("input_poll_ms must be greater than 0".to_string());
        }

        if self.watcher.shutdown_grace_ms == 0 {
            return Err("shutdown_grace_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.store.dirs_file, PathBuf::from("dirs.txt"));
        assert!(config.watcher.enabled);
        assert!(config.picker.seed.is_none());
        assert_eq!(config.ui.input_poll_ms, 100);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.ui.input_poll_ms = 0;
        assert!(config.validate().is_err());

        config.ui.input_poll_ms = 100;
        config.store.dirs_file = PathBuf::new();
        assert!(config.validate().is_err());

        config.store.dirs_file = PathBuf::from("dirs.txt");
        config.watcher.shutdown_grace_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_conversions() {
        let config = AppConfig::default();

        assert_eq!(config.ui.input_poll_duration(), Duration::from_millis(100));
        assert_eq!(config.watcher.shutdown_grace_duration(), Duration::from_secs(2));
    }

    #[test]
    fn test_env_config_loading() {
        std::env::set_var("RANDPATH_DIRS_FILE", "/tmp/randpath-dirs.txt");
        std::env::set_var("RANDPATH_SEED", "42");
        std::env::set_var("RANDPATH_NO_WATCH", "1");

        let config = AppConfig::from_env();

        assert_eq!(config.store.dirs_file, PathBuf::from("/tmp/randpath-dirs.txt"));
        assert_eq!(config.picker.seed, Some(42));
        assert!(!config.watcher.enabled);

        // Cleanup
        std::env::remove_var("RANDPATH_DIRS_FILE");
        std::env::remove_var("RANDPATH_SEED");
        std::env::remove_var("RANDPATH_NO_WATCH");
    }
}
