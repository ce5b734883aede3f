use crate::AuditContext;
use crate::diff::diff_snapshots;
use crate::storage::{EventFilters, EventWriter, FileOperation};
use crate::utils::formatters::{
    colored_change_char, format_byte_delta, format_relative_time, format_size,
};
use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

/// Execute log command - list recorded events, newest first
///
/// # Errors
///
/// Returns an error if the event log cannot be read
pub fn execute(ctx: &AuditContext, filters: &EventFilters, oneline: bool) -> Result<()> {
    let events = ctx.event_log().query(filters)?;

    if events.is_empty() {
        super::print_info("No events recorded");
        return Ok(());
    }

    for event in &events {
        if oneline {
            println!("{}", format_oneline(event));
        } else {
            println!("{}\n", format_entry(event));
        }
    }

    if let Some(limit) = filters.limit
        && limit > 0
        && events.len() == limit
    {
        println!("{} (showing the {} most recent, use -n 0 for all)", "...".dimmed(), limit);
    }

    Ok(())
}

/// `M 2026-10-16 14:03:22 profile apply /path/settings.json`
#[must_use]
pub fn format_oneline(event: &FileOperation) -> String {
    let mut line = format!(
        "{} {} {} {}",
        colored_change_char(event.change_type),
        event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().yellow(),
        event.operation,
        event.file.display()
    );
    if event.failed() {
        line.push_str(&format!(" {}", "(failed)".red()));
    }
    line
}

/// Multi-line entry with the diff headline
#[must_use]
pub fn format_entry(event: &FileOperation) -> String {
    let mut entry = format_header(event);
    let diff = diff_snapshots(event.before.as_ref(), event.after.as_ref(), false);
    if diff.has_changes {
        entry.push_str(&format!("\n\n    {}", diff.headline()));
    }
    entry
}

/// Event metadata: time, operation, file, change and sizes, then context and error
#[must_use]
pub fn format_header(event: &FileOperation) -> String {
    let mut lines = vec![format!(
        "{} {} {}",
        "event".yellow(),
        event.timestamp.format("%Y-%m-%d %H:%M:%S %:z"),
        format!("({})", format_relative_time(&event.timestamp, Utc::now())).dimmed()
    )];

    lines.push(format!("{}: {}", "Operation".bold(), event.operation));
    lines.push(format!(
        "{}: {} [{}]",
        "File".bold(),
        event.file.display(),
        event.scope
    ));

    let change = match event.size_delta() {
        Some(delta) if delta != 0 => format!("{} ({})", event.change_type, format_byte_delta(delta)),
        _ => event.change_type.to_string(),
    };
    lines.push(format!("{}: {change}", "Change".bold()));

    let sizes = match (&event.before, &event.after) {
        (Some(before), Some(after)) => {
            Some(format!("{} → {}", format_size(before.size), format_size(after.size)))
        }
        (Some(snapshot), None) | (None, Some(snapshot)) => Some(format_size(snapshot.size)),
        (None, None) => None,
    };
    if let Some(sizes) = sizes {
        lines.push(format!("{}: {sizes}", "Size".bold()));
    }

    if !event.context.is_empty() {
        let context: Vec<String> = event
            .context
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        lines.push(format!("{}: {}", "Context".bold(), context.join(", ")));
    }

    if let Some(error) = event.error.as_deref().filter(|e| !e.is_empty()) {
        lines.push(format!("{}: {}", "Error".red().bold(), error));
    }

    lines.join("\n")
}
