/// TOML loading and value validation
pub mod parser;
/// Unknown-key warnings for config files
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Largest accepted `snapshot.max_content_size` (64 MiB)
pub const MAX_CONTENT_SIZE_LIMIT: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    /// What snapshots keep of each file
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoreConfig {
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Files of this size or larger are hashed only
    #[serde(default = "default_max_content_size")]
    pub max_content_size: u64,
    /// Extensions (without dot) whose bodies are stored
    #[serde(default = "default_content_extensions")]
    pub content_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            enabled: true,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_content_size: default_max_content_size(),
            content_extensions: default_content_extensions(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - A value is out of range
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Every settable key with its current value, in file order
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, name) = key.split_once('.')?;

        match (section, name) {
            ("core", "log_path") => Some(self.core.log_path.display().to_string()),
            ("core", "enabled") => Some(self.core.enabled.to_string()),
            ("snapshot", "max_content_size") => Some(self.snapshot.max_content_size.to_string()),
            ("snapshot", "content_extensions") => Some(self.snapshot.content_extensions.join(",")),
            ("report", "color") => Some(self.report.color.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// `snapshot.content_extensions` takes a comma-separated list.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match (section, name) {
            ("core", "log_path") => self.core.log_path = PathBuf::from(value),
            ("core", "enabled") => {
                self.core.enabled = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("snapshot", "max_content_size") => {
                let size: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid number: {value}"))?;
                parser::validate_max_content_size(size)?;
                self.snapshot.max_content_size = size;
            }
            ("snapshot", "content_extensions") => {
                let extensions: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|ext| !ext.is_empty())
                    .map(str::to_string)
                    .collect();
                parser::validate_extensions(&extensions)?;
                self.snapshot.content_extensions = extensions;
            }
            ("report", "color") => {
                self.report.color = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }

    /// Reset a configuration value to its default
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or unknown
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match (section, name) {
            ("core", "log_path") => self.core.log_path = default_log_path(),
            ("core", "enabled") => self.core.enabled = default_enabled(),
            ("snapshot", "max_content_size") => {
                self.snapshot.max_content_size = default_max_content_size();
            }
            ("snapshot", "content_extensions") => {
                self.snapshot.content_extensions = default_content_extensions();
            }
            ("report", "color") => self.report.color = default_color(),
            _ => return Err(anyhow::anyhow!("Cannot unset configuration key: {key}")),
        }
        Ok(())
    }
}

/// Settable keys, in the order they appear in the file
pub const KEYS: [&str; 5] = [
    "core.log_path",
    "core.enabled",
    "snapshot.max_content_size",
    "snapshot.content_extensions",
    "report.color",
];

// Default functions for serde
fn default_log_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join(crate::DEFAULT_LOG_PATH)
}

const fn default_enabled() -> bool {
    true
}

const fn default_max_content_size() -> u64 {
    crate::tracking::snapshot::DEFAULT_MAX_CONTENT_SIZE
}

fn default_content_extensions() -> Vec<String> {
    vec!["json".to_string()]
}

const fn default_color() -> bool {
    true
}
