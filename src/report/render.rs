use super::{AuditReport, AuditSummary, ReportOptions};
use crate::diff::diff_snapshots;
use crate::storage::FileOperation;
use crate::utils::formatters::format_byte_delta;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Summary lines per event in Markdown output
const MARKDOWN_SUMMARY_LINES: usize = 3;

/// Events bucketed by the calendar date of their own timestamp, newest date first.
///
/// Order inside a bucket is the input order.
fn group_by_date(events: &[FileOperation]) -> Vec<(NaiveDate, Vec<&FileOperation>)> {
    let mut groups: BTreeMap<NaiveDate, Vec<&FileOperation>> = BTreeMap::new();
    for event in events {
        groups.entry(event.timestamp.date_naive()).or_default().push(event);
    }
    groups.into_iter().rev().collect()
}

fn status_glyph(event: &FileOperation) -> &'static str {
    if event.failed() { "✗" } else { "✓" }
}

/// `update (+50 bytes)`, or just the change type when no delta applies
fn change_label(event: &FileOperation) -> String {
    match event.size_delta() {
        Some(delta) if delta != 0 => {
            format!("{} ({})", event.change_type, format_byte_delta(delta))
        }
        _ => event.change_type.to_string(),
    }
}

fn describe_options(options: &ReportOptions) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(scope) = options.scope {
        parts.push(format!("scope={scope}"));
    }
    if let Some(operation) = &options.operation {
        parts.push(format!("operation={operation:?}"));
    }
    if let Some(since) = options.since {
        parts.push(format!("since={}", since.to_rfc3339()));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn joined_counts<K: std::fmt::Display>(counts: &BTreeMap<K, usize>) -> String {
    counts
        .iter()
        .map(|(key, count)| format!("{key} {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary_text(summary: &AuditSummary, out: &mut String) {
    let _ = writeln!(out, "Summary");
    let _ = writeln!(out, "  Events: {}", summary.total_events);
    let _ = writeln!(out, "  Files: {}", summary.unique_files.len());
    let _ = writeln!(out, "  Errors: {}", summary.errors);
    let _ = writeln!(out, "  Net size change: {}", format_byte_delta(summary.net_size_change));
    if !summary.scopes.is_empty() {
        let _ = writeln!(out, "  Scopes: {}", joined_counts(&summary.scopes));
    }
    if !summary.change_types.is_empty() {
        let _ = writeln!(out, "  Changes: {}", joined_counts(&summary.change_types));
    }
    if !summary.operations.is_empty() {
        let _ = writeln!(out, "  Operations:");
        for (operation, count) in &summary.operations {
            let _ = writeln!(out, "    {operation}: {count}");
        }
    }
}

/// Plain-text rendering
pub(super) fn text(report: &AuditReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Audit Report");
    let _ = writeln!(out, "Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S %:z"));
    let _ = writeln!(out, "Period: {}", report.period);
    if let Some(filters) = describe_options(&report.options) {
        let _ = writeln!(out, "Filters: {filters}");
    }
    let _ = writeln!(out);

    summary_text(&report.summary, &mut out);

    if report.events.is_empty() {
        let _ = writeln!(out, "\nNo events recorded.");
        return out;
    }

    let _ = writeln!(out, "\nTimeline");
    for (date, events) in group_by_date(&report.events) {
        let _ = writeln!(out, "\n{date}");
        for event in events {
            let _ = writeln!(
                out,
                "  {} {} {} [{}] {}",
                event.timestamp.format("%H:%M:%S"),
                status_glyph(event),
                event.operation,
                event.scope,
                event.file.display()
            );
            let _ = writeln!(out, "      {}", change_label(event));

            let diff = diff_snapshots(event.before.as_ref(), event.after.as_ref(), false);
            if diff.has_changes {
                let _ = writeln!(out, "      {}", diff.headline());
            }
            if let Some(error) = event.error.as_deref().filter(|e| !e.is_empty()) {
                let _ = writeln!(out, "      error: {error}");
            }
        }
    }

    out
}

/// Markdown rendering
pub(super) fn markdown(report: &AuditReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "# Audit Report\n");
    let _ = writeln!(
        out,
        "- **Generated:** {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S %:z")
    );
    let _ = writeln!(out, "- **Period:** {}", report.period);
    if let Some(filters) = describe_options(&report.options) {
        let _ = writeln!(out, "- **Filters:** {filters}");
    }

    let _ = writeln!(out, "\n## Summary\n");
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Events | {} |", summary.total_events);
    let _ = writeln!(out, "| Files | {} |", summary.unique_files.len());
    let _ = writeln!(out, "| Errors | {} |", summary.errors);
    let _ = writeln!(
        out,
        "| Net size change | {} |",
        format_byte_delta(summary.net_size_change)
    );

    if !summary.operations.is_empty() {
        let _ = writeln!(out, "\n### Operations\n");
        let _ = writeln!(out, "| Operation | Count |");
        let _ = writeln!(out, "|---|---|");
        for (operation, count) in &summary.operations {
            let _ = writeln!(out, "| {operation} | {count} |");
        }
    }

    if !summary.change_types.is_empty() {
        let _ = writeln!(out, "\n### Changes\n");
        for (change, count) in &summary.change_types {
            let _ = writeln!(out, "- {change}: {count}");
        }
    }

    if !summary.unique_files.is_empty() {
        let _ = writeln!(out, "\n### Files\n");
        for file in &summary.unique_files {
            let _ = writeln!(out, "- `{}`", file.display());
        }
    }

    let _ = writeln!(out, "\n## Timeline");
    if report.events.is_empty() {
        let _ = writeln!(out, "\nNo events recorded.");
        return out;
    }

    for (date, events) in group_by_date(&report.events) {
        let _ = writeln!(out, "\n### {date}\n");
        for event in events {
            let _ = writeln!(
                out,
                "- **{}** {} `{}` ({}) `{}`",
                event.timestamp.format("%H:%M:%S"),
                status_glyph(event),
                event.operation,
                event.scope,
                event.file.display()
            );
            let _ = writeln!(out, "  - {}", change_label(event));

            let diff = diff_snapshots(event.before.as_ref(), event.after.as_ref(), false);
            if diff.has_changes {
                for line in diff.summary.lines().take(MARKDOWN_SUMMARY_LINES) {
                    let _ = writeln!(out, "  - {}", line.trim_start());
                }
            }
            if let Some(error) = event.error.as_deref().filter(|e| !e.is_empty()) {
                let _ = writeln!(out, "  - **Error:** {error}");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::super::{ReportOptions, generate_audit_report};
    use crate::storage::{FileOperation, Scope};
    use crate::tracking::snapshot::Snapshot;
    use chrono::DateTime;
    use std::path::PathBuf;

    fn at(ts: &str, operation: &str, before: Option<&str>, after: Option<&str>) -> FileOperation {
        let snap = |body: &str| {
            Snapshot::new(
                crate::utils::hash::hash_bytes(body.as_bytes()),
                body.len() as u64,
                Some(body.to_string()),
            )
        };
        FileOperation::new(
            operation,
            PathBuf::from("/home/u/settings.json"),
            Scope::User,
            before.map(snap),
            after.map(snap),
        )
        .with_timestamp(DateTime::parse_from_rfc3339(ts).unwrap())
    }

    #[test]
    fn test_text_groups_newest_date_first() {
        let events = vec![
            at("2026-10-15T09:00:00+00:00", "first", None, Some("{\"a\":1}")),
            at("2026-10-16T08:00:00+00:00", "third", Some("{\"a\":1}"), Some("{\"a\":2}")),
            at("2026-10-15T10:00:00+00:00", "second", Some("{\"a\":1}"), Some("{\"a\":1,\"b\":true}")),
        ];

        let text = generate_audit_report(&events, ReportOptions::default()).render_as_text();

        let timeline = &text[text.find("Timeline").unwrap()..];
        let newer = timeline.find("2026-10-16").unwrap();
        let older = timeline.find("2026-10-15").unwrap();
        assert!(newer < older);

        // Order inside a day follows the input
        let first = timeline.find("first").unwrap();
        let second = timeline.find("second").unwrap();
        assert!(first < second);

        assert!(text.contains("Period: All time"));
        assert!(text.contains("modified `a`: 1 → 2"));
        assert!(text.contains("update (+9 bytes)"));
        assert!(text.contains("✓ third [user] /home/u/settings.json"));
    }

    #[test]
    fn test_text_shows_errors() {
        let events = vec![
            at("2026-10-16T08:00:00+00:00", "plugin install", None, None)
                .with_error("exit status 2"),
        ];
        let text = generate_audit_report(&events, ReportOptions::default()).render_as_text();

        assert!(text.contains("✗ plugin install"));
        assert!(text.contains("error: exit status 2"));
        assert!(text.contains("Errors: 1"));
    }

    #[test]
    fn test_empty_report() {
        let report = generate_audit_report(&[], ReportOptions::default());
        assert!(report.render_as_text().contains("No events recorded."));
        assert!(report.render_as_markdown().contains("No events recorded."));
    }

    #[test]
    fn test_markdown_caps_summary_lines() {
        let events = vec![at(
            "2026-10-16T08:00:00+00:00",
            "profile apply",
            Some("{\"a\":1,\"b\":1,\"c\":1,\"d\":1}"),
            Some("{\"a\":2,\"b\":2,\"c\":2,\"d\":2}"),
        )];

        let md = generate_audit_report(&events, ReportOptions::default()).render_as_markdown();

        assert!(md.starts_with("# Audit Report"));
        assert!(md.contains("### 2026-10-16"));
        assert!(md.contains("  - modified `a`: 1 → 2"));
        assert!(md.contains("  - modified `c`: 1 → 2"));
        assert!(!md.contains("modified `d`"));
        assert!(md.contains("| profile apply | 1 |"));
    }

    #[test]
    fn test_filters_in_header() {
        let options = ReportOptions {
            scope: Some(Scope::Project),
            operation: Some("plugin".to_string()),
            since: None,
        };
        let text = generate_audit_report(&[], options).render_as_text();
        assert!(text.contains("Filters: scope=project, operation=\"plugin\""));
    }
}
