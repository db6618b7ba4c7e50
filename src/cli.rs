use std::path::PathBuf;
use clap::{Parser, ValueEnum};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "randpath")]
#[command(author = "randpath Team")]
#[command(version = "0.1.0")]
#[command(about = "Shows a random file from your directories and reports changes inside them")]
#[command(long_about = "randpath keeps a list of directories, shows a random file from them every time you press Enter, and prints a line whenever a file is created, deleted or renamed inside one of them.")]
pub struct Cli {
    /// File holding the directory list
    #[arg(long, value_name = "PATH", help = "Directory list file (defaults to dirs.txt)")]
    pub dirs_file: Option<PathBuf>,

    /// Fixed random seed
    #[arg(long, help = "Seed for reproducible picks")]
    pub seed: Option<u64>,

    /// Do not start the background watcher
    #[arg(long, help = "Disable change notifications")]
    pub no_watch: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    /// Format of change notifications
    #[arg(long, default_value = "text", help = "Notification format")]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Timestamped human-readable lines (default)
    Text,
    /// JSON output for scripting
    Json,
    /// Compact single-line format
    Compact,
}

impl Cli {
    /// Layer command-line flags over an environment-derived config.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(ref path) = self.dirs_file {
            config.store.dirs_file = path.clone();
        }
        if self.seed.is_some() {
            config.picker.seed = self.seed;
        }
        if self.no_watch {
            config.watcher.enabled = false;
        }
        if self.no_color {
            config.ui.color = false;
        }
        config
    }

    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.dirs_file {
            if path.as_os_str().is_empty() {
                return Err("Directory list path must not be empty".to_string());
            }
            if path.is_dir() {
                return Err(format!("Directory list path is a directory: {}", path.display()));
            }
        }

        Ok(())
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            dirs_file: None,
            seed: None,
            no_watch: false,
            verbose: false,
            no_color: false,
            output: OutputFormat::Text,
        }
    }
}
