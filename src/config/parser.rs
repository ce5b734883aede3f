use super::{Config, MAX_CONTENT_SIZE_LIMIT};
use anyhow::{Context, Result};
use std::path::Path;

/// Reads, parses and validates a config file
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validate and return validation errors directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    validate_max_content_size(config.snapshot.max_content_size)?;
    validate_extensions(&config.snapshot.content_extensions)?;
    Ok(())
}

/// Checks `snapshot.max_content_size`
pub fn validate_max_content_size(size: u64) -> Result<()> {
    if size == 0 {
        anyhow::bail!("snapshot.max_content_size must be at least 1 byte");
    }
    if size > MAX_CONTENT_SIZE_LIMIT {
        anyhow::bail!("snapshot.max_content_size cannot exceed 64 MiB");
    }
    Ok(())
}

/// Checks `snapshot.content_extensions`
pub fn validate_extensions(extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        anyhow::bail!("snapshot.content_extensions must list at least one extension");
    }
    if let Some(bad) = extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.starts_with('.'))
    {
        anyhow::bail!("Invalid extension {bad:?}: use the bare extension, e.g. \"json\"");
    }
    Ok(())
}
