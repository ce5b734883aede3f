//! Aggregate audit reports over a set of recorded events.
//!
//! A report is built on demand from a query result: one pass computes the
//! [`AuditSummary`], and [`AuditReport::render_as_text`] /
//! [`AuditReport::render_as_markdown`] lay the events out as a timeline
//! grouped by calendar day, newest first.

/// Text and Markdown rendering
mod render;

use crate::storage::{ChangeType, EventFilters, FileOperation, Scope};
use chrono::{DateTime, Local, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::debug;

/// Days per month used by period labels; labels are coarse on purpose
const DAYS_PER_MONTH: i64 = 30;

/// Selection the report was generated for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Only events in this scope
    pub scope: Option<Scope>,
    /// Only operations containing this text
    pub operation: Option<String>,
    /// Only events at or after this time
    pub since: Option<DateTime<Utc>>,
}

impl ReportOptions {
    /// Equivalent query filters (no limit)
    #[must_use]
    pub fn to_filters(&self) -> EventFilters {
        EventFilters {
            file: None,
            operation: self.operation.clone(),
            scope: self.scope,
            since: self.since,
            limit: None,
        }
    }
}

/// Statistics over the events of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSummary {
    /// Number of events
    pub total_events: usize,
    /// Every file touched, sorted
    pub unique_files: Vec<PathBuf>,
    /// Event count per operation name
    pub operations: BTreeMap<String, usize>,
    /// Event count per scope
    pub scopes: BTreeMap<Scope, usize>,
    /// Event count per change type
    pub change_types: BTreeMap<ChangeType, usize>,
    /// Events whose operation failed
    pub errors: usize,
    /// Sum of size deltas over events with both snapshots
    pub net_size_change: i64,
}

impl AuditSummary {
    /// Computes the summary in a single pass.
    ///
    /// Creations and deletions do not contribute to `net_size_change`, since
    /// only one side has a size.
    #[must_use]
    pub fn from_events(events: &[FileOperation]) -> Self {
        let mut files = BTreeSet::new();
        let mut summary = Self {
            total_events: events.len(),
            ..Self::default()
        };

        for event in events {
            files.insert(event.file.clone());
            *summary.operations.entry(event.operation.clone()).or_insert(0) += 1;
            *summary.scopes.entry(event.scope).or_insert(0) += 1;
            *summary.change_types.entry(event.change_type).or_insert(0) += 1;
            if event.failed() {
                summary.errors += 1;
            }
            if let Some(delta) = event.size_delta() {
                summary.net_size_change = summary.net_size_change.saturating_add(delta);
            }
        }

        summary.unique_files = files.into_iter().collect();
        summary
    }
}

/// Report over a set of events, ready to render.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// When the report was built
    pub generated_at: DateTime<Local>,
    /// Human label for the covered period
    pub period: String,
    /// Selection the report covers
    pub options: ReportOptions,
    /// Aggregate statistics
    pub summary: AuditSummary,
    /// Events in the order given (newest first when coming from a query)
    pub events: Vec<FileOperation>,
}

impl AuditReport {
    /// Renders the report as plain text
    #[must_use]
    pub fn render_as_text(&self) -> String {
        render::text(self)
    }

    /// Renders the report as Markdown
    #[must_use]
    pub fn render_as_markdown(&self) -> String {
        render::markdown(self)
    }
}

/// Builds a report over `events`.
///
/// Events not matching `options` are left out, so the header always
/// describes exactly what the report contains. Order is preserved.
#[must_use]
pub fn generate_audit_report(events: &[FileOperation], options: ReportOptions) -> AuditReport {
    let now = Local::now();
    let filters = options.to_filters();
    let events: Vec<FileOperation> = events
        .iter()
        .filter(|e| filters.matches(e))
        .cloned()
        .collect();

    let summary = AuditSummary::from_events(&events);
    debug!(events = summary.total_events, files = summary.unique_files.len(), "Audit report generated");

    AuditReport {
        generated_at: now,
        period: format_period(options.since, now.with_timezone(&Utc)),
        options,
        summary,
        events,
    }
}

/// Coarse label for the period starting at `since`.
///
/// Based on whole days elapsed until `now`, with 7-day weeks and 30-day
/// months; anything a year or older shows the start date.
#[must_use]
pub fn format_period(since: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(since) = since else {
        return "All time".to_string();
    };

    let days = (now - since).num_days().max(0);
    match days {
        0 => "Last 24 hours".to_string(),
        1 => "Last day".to_string(),
        2..=6 => format!("Last {days} days"),
        7..=29 => plural_period(days / 7, "week"),
        30..=364 => plural_period(days / DAYS_PER_MONTH, "month"),
        _ => format!("Since {}", since.with_timezone(&Local).format("%Y-%m-%d")),
    }
}

fn plural_period(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("Last {unit}")
    } else {
        format!("Last {count} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::snapshot::Snapshot;
    use chrono::{Duration, TimeZone};

    fn event(operation: &str, file: &str, scope: Scope, before: Option<u64>, after: Option<u64>) -> FileOperation {
        FileOperation::new(
            operation,
            PathBuf::from(file),
            scope,
            before.map(|size| Snapshot::new(format!("b{size}"), size, None)),
            after.map(|size| Snapshot::new(format!("a{size}"), size, None)),
        )
    }

    #[test]
    fn test_summary_counts() {
        let events = vec![
            event("profile apply", "/b.json", Scope::User, Some(100), Some(150)),
            event("profile apply", "/a.json", Scope::User, None, Some(500)),
            event("plugin install", "/b.json", Scope::Project, Some(10), Some(5))
                .with_error("exit status 1"),
            event("plugin remove", "/c.json", Scope::Local, Some(70), None),
        ];

        let summary = AuditSummary::from_events(&events);

        assert_eq!(summary.total_events, 4);
        assert_eq!(
            summary.unique_files,
            vec![PathBuf::from("/a.json"), PathBuf::from("/b.json"), PathBuf::from("/c.json")]
        );
        assert_eq!(summary.operations.get("profile apply"), Some(&2));
        assert_eq!(summary.operations.get("plugin install"), Some(&1));
        assert_eq!(summary.scopes.get(&Scope::User), Some(&2));
        assert_eq!(summary.scopes.get(&Scope::Local), Some(&1));
        assert_eq!(summary.change_types.get(&ChangeType::Update), Some(&2));
        assert_eq!(summary.change_types.get(&ChangeType::Create), Some(&1));
        assert_eq!(summary.change_types.get(&ChangeType::Delete), Some(&1));
        assert_eq!(summary.errors, 1);
        // +50 and -5; the creation and deletion are excluded
        assert_eq!(summary.net_size_change, 45);
    }

    #[test]
    fn test_empty_error_is_not_counted() {
        let events = vec![event("x", "/a", Scope::User, None, Some(1)).with_error("")];
        assert_eq!(AuditSummary::from_events(&events).errors, 0);
    }

    #[test]
    fn test_format_period() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let ago = |d: Duration| Some(now - d);

        assert_eq!(format_period(None, now), "All time");
        assert_eq!(format_period(ago(Duration::hours(5)), now), "Last 24 hours");
        assert_eq!(format_period(ago(Duration::hours(30)), now), "Last day");
        assert_eq!(format_period(ago(Duration::days(3)), now), "Last 3 days");
        assert_eq!(format_period(ago(Duration::days(7)), now), "Last week");
        assert_eq!(format_period(ago(Duration::days(20)), now), "Last 2 weeks");
        assert_eq!(format_period(ago(Duration::days(29)), now), "Last 4 weeks");
        assert_eq!(format_period(ago(Duration::days(30)), now), "Last month");
        assert_eq!(format_period(ago(Duration::days(95)), now), "Last 3 months");
        assert!(format_period(ago(Duration::days(400)), now).starts_with("Since 2025-"));
    }

    #[test]
    fn test_generate_applies_options() {
        let events = vec![
            event("profile apply", "/a.json", Scope::User, None, Some(1)),
            event("plugin install", "/b.json", Scope::Project, None, Some(1)),
        ];

        let report = generate_audit_report(
            &events,
            ReportOptions {
                scope: Some(Scope::Project),
                ..ReportOptions::default()
            },
        );

        assert_eq!(report.summary.total_events, 1);
        assert_eq!(report.events[0].operation, "plugin install");
        assert_eq!(report.period, "All time");
    }
}
