#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters and size calculations cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Dotaudit - Audit Trail for Configuration File Mutations
//!
//! Dotaudit records every change a configuration tool makes to the files it
//! manages, keeps the records in an append-only log, and explains them later
//! as readable diffs and reports.
//!
//! ## Features
//!
//! - **Snapshot Tracking**: Files are hashed with xxHash3 before and after each mutation
//! - **Append-Only Log**: One JSON object per line, safe for concurrent writers in a process
//! - **Structural Diffs**: JSON bodies are compared key by key instead of line by line
//! - **Audit Reports**: Per-day timelines with summary statistics, as text or Markdown
//!
//! ## Architecture
//!
//! - [`tracking`]: The [`tracking::Tracker`] and file snapshots
//! - [`storage`]: Event records, filters and the [`storage::EventWriter`] stores
//! - [`diff`]: Snapshot comparison and value rendering
//! - [`report`]: Summary statistics and timeline rendering
//! - [`config`]: Configuration parsing and validation
//! - [`commands`]: Command implementations behind the CLI
//! - [`output`]: Status messages
//! - [`utils`]: Utility functions and helpers
//!
//! ## Example Usage
//!
//! ```no_run
//! use dotaudit::AuditContext;
//! use dotaudit::storage::{EventFilters, EventWriter, Scope};
//! use dotaudit::tracking::Tracker;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = AuditContext::new()?;
//! let tracker = Tracker::from_context(&ctx);
//!
//! tracker.record_file_write("theme switch", "/tmp/settings.json", Scope::User, || {
//!     std::fs::write("/tmp/settings.json", r#"{"theme":"dark"}"#)
//! })?;
//!
//! let recent = ctx.event_log().query(&EventFilters::new().with_limit(10))?;
//! println!("{} events", recent.len());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Snapshot comparison (structural, coarse, hash-only and unified diffs).
pub mod diff;

/// Output formatting for status messages.
pub mod output;

/// Audit report generation and rendering.
pub mod report;

/// Event records, query filters and event stores.
pub mod storage;

/// Tracker and file snapshots.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the dotaudit binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/dotaudit/config";

/// Default event log path relative to home directory.
pub const DEFAULT_LOG_PATH: &str = ".dotaudit/events.jsonl";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "DOTAUDIT_CONFIG_PATH";

/// Environment variable overriding `core.log_path`.
pub const LOG_PATH_ENV: &str = "DOTAUDIT_LOG_PATH";

/// Environment variable that disables tracking when set to `1` or `true`.
pub const DISABLE_ENV: &str = "DOTAUDIT_DISABLE";

/// Central context for all dotaudit operations.
///
/// Holds the resolved event log location and the loaded configuration.
///
/// # Examples
///
/// ```no_run
/// use dotaudit::AuditContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Create context with default paths
/// let ctx = AuditContext::new()?;
///
/// // Create context with custom paths (for testing)
/// let ctx = AuditContext::new_explicit(
///     "/tmp/audit/events.jsonl".into(),
///     "/tmp/audit/config".into()
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuditContext {
    /// Path to the JSONL event log.
    pub log_path: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Set when `DOTAUDIT_DISABLE` turns tracking off regardless of config.
    pub disabled_by_env: bool,
}

impl AuditContext {
    /// Creates a new `AuditContext` by loading the configuration from the default path.
    ///
    /// `DOTAUDIT_CONFIG_PATH`, `DOTAUDIT_LOG_PATH` and `DOTAUDIT_DISABLE`
    /// override the defaults and the file.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the configuration
    /// file cannot be read or created.
    pub fn new() -> Result<Self> {
        // Check environment variable for config path first
        let config_path = if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

        // Validate configuration and warn about issues
        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            eprintln!("Warning: Configuration validation failed: {e}");
        }

        // Allow environment variable to override config log_path
        let log_path = if let Ok(path) = std::env::var(LOG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            config.core.log_path.clone()
        };

        let disabled_by_env = std::env::var(DISABLE_ENV)
            .is_ok_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true"));

        Ok(Self {
            log_path: utils::paths::expand_tilde(&log_path)?,
            config_path,
            config,
            disabled_by_env,
        })
    }

    /// Creates a new `AuditContext` with explicit paths, ignoring the environment.
    ///
    /// A missing config file is created with defaults.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(log_path: PathBuf, config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            config::Config::load(&config_path)?
        } else {
            let mut config = config::Config::default();
            config.core.log_path.clone_from(&log_path);
            config.save(&config_path)?;
            config
        };

        Ok(Self {
            log_path,
            config_path,
            config,
            disabled_by_env: false,
        })
    }

    /// Whether mutations should be recorded at all
    #[must_use]
    pub const fn tracking_enabled(&self) -> bool {
        self.config.core.enabled && !self.disabled_by_env
    }

    /// The event log at `log_path`, for reading.
    ///
    /// Does not touch the filesystem; a missing log reads as empty.
    #[must_use]
    pub fn event_log(&self) -> storage::JsonlEventLog {
        storage::JsonlEventLog::new(&self.log_path)
    }
}
