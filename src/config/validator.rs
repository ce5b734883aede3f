use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// Checks config files for keys dotaudit does not recognize
pub struct ConfigValidator {
    /// Set of valid configuration fields
    known_fields: HashSet<String>,
    /// Set of section names
    known_sections: HashSet<String>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields: HashSet<String> = super::KEYS.iter().map(|k| (*k).to_string()).collect();
        let known_sections = known_fields
            .iter()
            .filter_map(|key| key.split_once('.').map(|(section, _)| section.to_string()))
            .collect();

        Self {
            known_fields,
            known_sections,
        }
    }

    /// Validate a config file and warn about unknown fields
    ///
    /// Returns the unknown field paths, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<Vec<String>> {
        if !config_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let parsed: toml::Value = toml::from_str(&content)?;

        let mut unknown_fields = Vec::new();
        self.check_table(&parsed, "", &mut unknown_fields);
        unknown_fields.sort();

        if !unknown_fields.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for field in &unknown_fields {
                warn!(field = %field, "Unknown configuration field");
                eprintln!("  Unknown configuration field: {}", field.yellow());
            }
            eprintln!();
        }

        Ok(unknown_fields)
    }

    /// Recursively collects unknown field paths below `prefix`
    fn check_table(&self, table: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        if let toml::Value::Table(map) = table {
            for (key, value) in map {
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };

                match value {
                    toml::Value::Table(_) if prefix.is_empty() && self.known_sections.contains(key) => {
                        self.check_table(value, &full_key, unknown);
                    }
                    _ if self.known_fields.contains(&full_key) => {}
                    _ => unknown.push(full_key),
                }
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
