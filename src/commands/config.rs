use crate::AuditContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set or unset configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut AuditContext,
    key: Option<&str>,
    value: Option<String>,
    unset: bool,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    if list || key.is_none() {
        show_all_config(ctx);
        return Ok(());
    }

    let key =
        key.ok_or_else(|| anyhow::anyhow!("Key must be provided when not using --list flag"))?;

    if unset {
        ctx.config.unset(key)?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Reset {key} to its default"));
    } else if let Some(val) = value {
        ctx.config.set(key, val.clone())?;
        ctx.config.save(&ctx.config_path)?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        output::warning(&format!("Unknown configuration key '{key}'"));
    }

    Ok(())
}

/// Show all configuration values, grouped by section
fn show_all_config(ctx: &AuditContext) {
    let mut current_section = "";
    for (key, value) in ctx.config.entries() {
        let (section, name) = key.split_once('.').unwrap_or(("", key));
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("{}", format!("[{section}]").bold());
            current_section = section;
        }
        println!("  {name} = {value}");
    }

    if ctx.disabled_by_env {
        println!();
        output::warning(&format!("Tracking disabled by {}", crate::DISABLE_ENV));
    }
    if ctx.log_path != ctx.config.core.log_path {
        output::info(&format!("Effective log path: {}", ctx.log_path.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_persists() -> Result<()> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config");
        let mut ctx = AuditContext::new_explicit(dir.path().join("events.jsonl"), config_path.clone())?;

        execute(&mut ctx, Some("report.color"), Some("false".to_string()), false, false)?;

        let reloaded = crate::config::Config::load(&config_path)?;
        assert!(!reloaded.report.color);
        Ok(())
    }

    #[test]
    fn test_unset_restores_default() -> Result<()> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config");
        let mut ctx = AuditContext::new_explicit(dir.path().join("events.jsonl"), config_path.clone())?;

        execute(&mut ctx, Some("snapshot.max_content_size"), Some("10".to_string()), false, false)?;
        execute(&mut ctx, Some("snapshot.max_content_size"), None, true, false)?;

        let reloaded = crate::config::Config::load(&config_path)?;
        assert_eq!(reloaded.snapshot.max_content_size, 1_048_576);
        Ok(())
    }

    #[test]
    fn test_invalid_value_is_error() -> Result<()> {
        let dir = tempdir()?;
        let mut ctx = AuditContext::new_explicit(
            dir.path().join("events.jsonl"),
            dir.path().join("config"),
        )?;
        assert!(execute(&mut ctx, Some("core.enabled"), Some("nah".to_string()), false, false).is_err());
        Ok(())
    }
}
