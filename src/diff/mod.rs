//! Diff generation for snapshot comparisons.
//!
//! This module turns two optional [`Snapshot`]s into a readable explanation:
//! - Structural (tree) diffs when both sides carry parseable JSON
//! - Coarse "content changed" diffs when a body does not parse
//! - Hash and size comparison when no body was captured
//! - Line-level unified diffs of stored bodies for investigation

/// Recursive tree comparison
pub mod structural;
/// Unified diff generation for stored text bodies
pub mod unified;
/// Structured value type and rendering rules
pub mod value;

pub use unified::{UnifiedDiffConfig, generate_unified_diff};
pub use value::{RenderMode, Value};

use crate::tracking::snapshot::Snapshot;
use crate::utils::formatters::{format_byte_delta, size_delta};
use crate::utils::hash::short_hash;
use tracing::{Level, debug, span};

/// Which comparison produced a [`DiffResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// File absent before, present after
    Created,
    /// File present before, absent after
    Deleted,
    /// Both absent, or identical hashes
    Unchanged,
    /// Both bodies parsed and were compared as trees
    Structural,
    /// Both bodies present but at least one did not parse
    Coarse,
    /// No bodies to compare; hash and size only
    HashOnly,
}

/// Human-readable explanation of the difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    /// Comparison branch that produced this result
    pub kind: DiffKind,
    /// Whether the file changed at all
    pub has_changes: bool,
    /// Whether file bodies were available for the comparison
    pub content_available: bool,
    /// Multi-line summary; the first line stands on its own
    pub summary: String,
    /// Individual change lines, in output order
    pub details: Vec<String>,
}

impl DiffResult {
    fn unchanged(content_available: bool) -> Self {
        Self {
            kind: DiffKind::Unchanged,
            has_changes: false,
            content_available,
            summary: "No changes".to_string(),
            details: Vec::new(),
        }
    }

    /// First line of the summary
    #[must_use]
    pub fn headline(&self) -> &str {
        self.summary.lines().next().unwrap_or("")
    }
}

/// Compares two snapshots.
///
/// `full` renders every nested field and array element; otherwise output is
/// capped to stay readable in a terminal.
#[must_use]
pub fn diff_snapshots(before: Option<&Snapshot>, after: Option<&Snapshot>, full: bool) -> DiffResult {
    let mode = RenderMode::from_full(full);
    let span = span!(Level::DEBUG, "diff_snapshots", full);
    let _guard = span.enter();

    let result = match (before, after) {
        (None, Some(after)) => presence_change(DiffKind::Created, after, mode),
        (Some(before), None) => presence_change(DiffKind::Deleted, before, mode),
        (None, None) => DiffResult::unchanged(false),
        (Some(before), Some(after)) if before.hash == after.hash => {
            DiffResult::unchanged(before.body().is_some() && after.body().is_some())
        }
        (Some(before), Some(after)) => match (&before.content, &after.content) {
            (Some(old), Some(new)) => content_diff(old, new, before.size, after.size, mode),
            _ => hash_only_diff(before, after),
        },
    };

    debug!(kind = ?result.kind, lines = result.details.len(), "Diff computed");
    result
}

/// Result for a file that appeared or disappeared.
fn presence_change(kind: DiffKind, snapshot: &Snapshot, mode: RenderMode) -> DiffResult {
    let (label, verb) = if kind == DiffKind::Created {
        ("created", "added")
    } else {
        ("deleted", "removed")
    };

    let body = snapshot.body();
    let details = body
        .and_then(|text| Value::parse(text).ok())
        .map(|value| structural::describe_fields(&value, verb, mode))
        .unwrap_or_default();

    DiffResult {
        kind,
        has_changes: true,
        content_available: body.is_some(),
        summary: format!("File {label} ({} bytes)", snapshot.size),
        details,
    }
}

/// Structural diff of two bodies, or a coarse one if either fails to parse.
fn content_diff(old: &str, new: &str, old_size: u64, new_size: u64, mode: RenderMode) -> DiffResult {
    let delta = size_delta(old_size, new_size);

    let (Ok(old_tree), Ok(new_tree)) = (Value::parse(old), Value::parse(new)) else {
        return DiffResult {
            kind: DiffKind::Coarse,
            has_changes: true,
            content_available: true,
            summary: format!("Content changed ({})", format_byte_delta(delta)),
            details: vec!["Content could not be parsed as JSON".to_string()],
        };
    };

    let mut details = structural::diff_trees(&old_tree, &new_tree, mode);
    if details.is_empty() {
        details.push("Formatting changed (no structural differences)".to_string());
    }

    let mut lines = details.clone();
    if delta != 0 {
        lines.push(format!("Size: {}", format_byte_delta(delta)));
    }

    DiffResult {
        kind: DiffKind::Structural,
        has_changes: true,
        content_available: true,
        summary: lines.join("\n"),
        details,
    }
}

/// Comparison when at least one side has no captured body.
fn hash_only_diff(before: &Snapshot, after: &Snapshot) -> DiffResult {
    let delta = size_delta(before.size, after.size);
    DiffResult {
        kind: DiffKind::HashOnly,
        has_changes: true,
        content_available: false,
        summary: format!(
            "Content changed: {} → {} ({})",
            short_hash(&before.hash),
            short_hash(&after.hash),
            format_byte_delta(delta)
        ),
        details: vec![
            format!("before: {} ({} bytes)", short_hash(&before.hash), before.size),
            format!("after: {} ({} bytes)", short_hash(&after.hash), after.size),
        ],
    }
}
