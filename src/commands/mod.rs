pub mod config;
pub mod diff;
pub mod log;
pub mod report;
pub mod show;
pub mod track;

use crate::diff::{DiffKind, DiffResult};
use crate::storage::{EventFilters, Scope};
use crate::utils::parse_since;
use crate::utils::paths::canonical_file_path;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::Path;

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Parses an optional `--since` value relative to now
///
/// # Errors
///
/// Returns an error if the value is not a duration, RFC 3339 time or date
pub fn resolve_since(since: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    since.map(|value| parse_since(value, Utc::now())).transpose()
}

/// Builds query filters from command-line arguments.
///
/// `file` is resolved the same way the tracker resolves paths, so relative
/// arguments match the absolute paths stored in events.
///
/// # Errors
///
/// Returns an error if `since` cannot be parsed or `file` cannot be resolved
pub fn build_filters(
    file: Option<&Path>,
    operation: Option<&str>,
    scope: Option<Scope>,
    since: Option<&str>,
    limit: usize,
) -> Result<EventFilters> {
    let mut filters = EventFilters::new().with_limit(limit);
    if let Some(file) = file {
        let file = canonical_file_path(file)
            .with_context(|| format!("Failed to resolve path: {}", file.display()))?;
        filters = filters.with_file(file);
    }
    if let Some(operation) = operation {
        filters = filters.with_operation(operation);
    }
    if let Some(scope) = scope {
        filters = filters.with_scope(scope);
    }
    if let Some(since) = resolve_since(since)? {
        filters = filters.with_since(since);
    }
    Ok(filters)
}

/// Lines to print for a diff result, without repeating anything.
///
/// Structural summaries already contain their detail lines; other kinds
/// print the summary followed by the details.
#[must_use]
pub fn diff_lines(result: &DiffResult) -> Vec<String> {
    let mut lines: Vec<String> = result.summary.lines().map(str::to_string).collect();
    if !matches!(result.kind, DiffKind::Structural | DiffKind::Unchanged) {
        lines.extend(result.details.iter().cloned());
    }
    lines
}

/// Colors a diff line by its marker
#[must_use]
pub fn colorize_diff_line(line: &str) -> String {
    let marker = line.trim_start();
    if marker.starts_with("added ") {
        line.green().to_string()
    } else if marker.starts_with("removed ") {
        line.red().to_string()
    } else if marker.starts_with("modified ") || marker.starts_with("value changed") {
        line.yellow().to_string()
    } else {
        line.dimmed().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff_snapshots;
    use crate::tracking::snapshot::Snapshot;

    #[test]
    fn test_diff_lines_created_lists_fields() {
        let after = Snapshot::new("h", 13, Some("{\"version\":1}".to_string()));
        let lines = diff_lines(&diff_snapshots(None, Some(&after), false));
        assert_eq!(lines, vec!["File created (13 bytes)", "added `version`: 1"]);
    }

    #[test]
    fn test_diff_lines_structural_not_repeated() {
        let before = Snapshot::new("a", 7, Some("{\"v\":1}".to_string()));
        let after = Snapshot::new("b", 7, Some("{\"v\":2}".to_string()));
        let lines = diff_lines(&diff_snapshots(Some(&before), Some(&after), false));
        assert_eq!(lines, vec!["modified `v`: 1 → 2"]);
    }

    #[test]
    fn test_build_filters() -> Result<()> {
        let filters = build_filters(
            Some(Path::new("/etc/./app/../settings.json")),
            Some("plugin"),
            Some(Scope::Local),
            Some("2d"),
            5,
        )?;

        assert_eq!(filters.file.as_deref(), Some(Path::new("/etc/settings.json")));
        assert_eq!(filters.operation.as_deref(), Some("plugin"));
        assert_eq!(filters.scope, Some(Scope::Local));
        assert!(filters.since.is_some());
        assert_eq!(filters.limit, Some(5));
        Ok(())
    }

    #[test]
    fn test_build_filters_rejects_bad_since() {
        assert!(build_filters(None, None, None, Some("whenever"), 0).is_err());
    }
}
