use crate::AuditContext;
use crate::diff::{UnifiedDiffConfig, diff_snapshots, generate_unified_diff};
use crate::output;
use crate::storage::{EventFilters, EventWriter};
use anyhow::{Result, bail};
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Execute show command - explain the `index`-th most recent matching event
///
/// # Errors
///
/// Returns an error if:
/// - The event log cannot be read
/// - No event exists at `index`
/// - Writing the unified diff fails
pub fn execute(
    ctx: &AuditContext,
    index: usize,
    filters: &EventFilters,
    full: bool,
    unified: bool,
) -> Result<()> {
    // Position is counted over every match, not a limited window
    let filters = EventFilters {
        limit: None,
        ..filters.clone()
    };
    let events = ctx.event_log().query(&filters)?;

    let Some(event) = events.get(index) else {
        if events.is_empty() {
            bail!("No matching events recorded");
        }
        bail!(
            "No event at index {index} ({} matching event{})",
            events.len(),
            if events.len() == 1 { "" } else { "s" }
        );
    };

    println!("{}", super::log::format_header(event));
    println!();

    let diff = diff_snapshots(event.before.as_ref(), event.after.as_ref(), full);
    for line in super::diff_lines(&diff) {
        println!("    {}", super::colorize_diff_line(&line));
    }

    if !unified {
        return Ok(());
    }

    let before = event.before.as_ref().and_then(|s| s.content.as_deref());
    let after = event.after.as_ref().and_then(|s| s.content.as_deref());
    if before.is_none() && after.is_none() {
        output::warning("Unified diff unavailable: file bodies were not captured");
        return Ok(());
    }

    println!();
    let config = UnifiedDiffConfig {
        colorize: ctx.config.report.color && io::stdout().is_terminal(),
        ..UnifiedDiffConfig::default()
    };
    let display_path = event.file.strip_prefix("/").unwrap_or(&event.file);
    let mut stdout = io::stdout().lock();
    generate_unified_diff(
        before.unwrap_or(""),
        after.unwrap_or(""),
        Path::new(display_path),
        &config,
        &mut stdout,
    )?;
    stdout.flush()?;

    Ok(())
}
