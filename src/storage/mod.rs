/// Append-only JSONL event log
pub mod event_log;
/// In-memory event log
pub mod memory;

pub use event_log::JsonlEventLog;
pub use memory::MemoryEventLog;

use crate::tracking::snapshot::Snapshot;
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration tier a tracked file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// User-wide settings (home directory)
    User,
    /// Settings shared with everyone working on a project
    Project,
    /// Project settings private to this machine
    Local,
}

impl Scope {
    /// Returns the lowercase name used on disk and on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "project" => Ok(Self::Project),
            "local" => Ok(Self::Local),
            other => Err(format!(
                "invalid scope '{other}' (expected user, project or local)"
            )),
        }
    }
}

/// Classification of a mutation, derived from the before/after snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// File did not exist before and exists after
    Create,
    /// File existed on both sides with different content
    Update,
    /// File existed before and is gone after
    Delete,
    /// File exists on both sides with identical content
    NoChange,
    /// File exists on neither side
    Unknown,
}

impl ChangeType {
    /// Infers the change type from the two snapshots.
    #[must_use]
    pub fn infer(before: Option<&Snapshot>, after: Option<&Snapshot>) -> Self {
        match (before, after) {
            (None, Some(_)) => Self::Create,
            (Some(_), None) => Self::Delete,
            (Some(before), Some(after)) if before.is_identical_to(after) => Self::NoChange,
            (Some(_), Some(_)) => Self::Update,
            (None, None) => Self::Unknown,
        }
    }

    /// Returns the name used in the log file
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::NoChange => "no-change",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable record of a tracked file mutation.
///
/// Serialized as a single JSON object per line of the audit log. The
/// timestamp keeps the UTC offset it was recorded with, so calendar grouping
/// in reports uses the same time reference as the machine that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOperation {
    /// When the operation finished
    pub timestamp: DateTime<FixedOffset>,
    /// Name of the operation that mutated the file (e.g. `profile apply`)
    pub operation: String,
    /// Absolute, cleaned path of the mutated file
    pub file: PathBuf,
    /// Configuration tier of the file
    pub scope: Scope,
    /// Change inferred from `before` and `after`
    pub change_type: ChangeType,
    /// Snapshot taken before the operation ran, `None` if the file was absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Snapshot>,
    /// Snapshot taken after the operation ran, `None` if the file is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Snapshot>,
    /// Free-form key/value context supplied by the caller
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    /// Error message of the wrapped operation, if it failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOperation {
    /// Creates a record stamped with the current local time.
    ///
    /// The change type is inferred from the snapshots so the two can never disagree.
    #[must_use]
    pub fn new(
        operation: impl Into<String>,
        file: PathBuf,
        scope: Scope,
        before: Option<Snapshot>,
        after: Option<Snapshot>,
    ) -> Self {
        let change_type = ChangeType::infer(before.as_ref(), after.as_ref());
        Self {
            timestamp: Local::now().fixed_offset(),
            operation: operation.into(),
            file,
            scope,
            change_type,
            before,
            after,
            context: BTreeMap::new(),
            error: None,
        }
    }

    /// Sets the recorded timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the caller-supplied context
    #[must_use]
    pub fn with_context(mut self, context: BTreeMap<String, String>) -> Self {
        self.context = context;
        self
    }

    /// Sets the error message of the wrapped operation
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Whether the wrapped operation failed
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }

    /// Signed size change, only when both snapshots exist
    #[must_use]
    pub fn size_delta(&self) -> Option<i64> {
        match (&self.before, &self.after) {
            (Some(before), Some(after)) => Some(crate::utils::formatters::size_delta(
                before.size,
                after.size,
            )),
            _ => None,
        }
    }
}

/// Read-side selection over the audit log. Never mutates stored data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    /// Exact file path match
    pub file: Option<PathBuf>,
    /// Substring match on the operation name
    pub operation: Option<String>,
    /// Exact scope match
    pub scope: Option<Scope>,
    /// Inclusive lower bound on the timestamp
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of results (most recent first); `0` means unlimited
    pub limit: Option<usize>,
}

impl EventFilters {
    /// Filters that match every event
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one file
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Restricts to operations containing `operation`
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Restricts to one scope
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Restricts to events at or after `since`
    #[must_use]
    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Keeps only the `limit` most recent matches
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `event` passes every filter except `limit`
    #[must_use]
    pub fn matches(&self, event: &FileOperation) -> bool {
        if let Some(file) = &self.file
            && event.file.as_path() != Path::new(file)
        {
            return false;
        }
        if let Some(operation) = &self.operation
            && !event.operation.contains(operation.as_str())
        {
            return false;
        }
        if let Some(scope) = self.scope
            && event.scope != scope
        {
            return false;
        }
        if let Some(since) = self.since
            && event.timestamp.with_timezone(&Utc) < since
        {
            return false;
        }
        true
    }

    /// Sorts matches newest first, then applies the limit.
    ///
    /// The limit is applied after sorting so it always keeps the most recent events.
    pub fn finish(&self, mut events: Vec<FileOperation>) -> Vec<FileOperation> {
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = self.limit
            && limit > 0
        {
            events.truncate(limit);
        }
        events
    }
}

/// Persistence for audit events.
///
/// Implementations must serialize writers and readers so no reader ever sees
/// a partially written record.
pub trait EventWriter: Send + Sync {
    /// Appends one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be serialized or persisted.
    fn write(&self, event: &FileOperation) -> Result<()>;

    /// Returns matching events, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read. Individual
    /// corrupt records are skipped, not reported.
    fn query(&self, filters: &EventFilters) -> Result<Vec<FileOperation>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(hash: &str, size: u64) -> Snapshot {
        Snapshot::new(hash, size, None)
    }

    fn event_at(operation: &str, file: &str, scope: Scope, secs: i64) -> FileOperation {
        let ts = Utc.timestamp_opt(secs, 0).unwrap().fixed_offset();
        FileOperation::new(operation, PathBuf::from(file), scope, None, Some(snapshot("h", 1)))
            .with_timestamp(ts)
    }

    #[test]
    fn test_change_type_inference() {
        let a = snapshot("abc", 10);
        let b = snapshot("def", 10);
        let c = snapshot("abc", 11);

        assert_eq!(ChangeType::infer(None, Some(&a)), ChangeType::Create);
        assert_eq!(ChangeType::infer(Some(&a), None), ChangeType::Delete);
        assert_eq!(ChangeType::infer(Some(&a), Some(&b)), ChangeType::Update);
        assert_eq!(ChangeType::infer(Some(&a), Some(&c)), ChangeType::Update);
        assert_eq!(ChangeType::infer(Some(&a), Some(&a.clone())), ChangeType::NoChange);
        assert_eq!(ChangeType::infer(None, None), ChangeType::Unknown);
    }

    #[test]
    fn test_scope_parse_and_display() {
        assert_eq!("user".parse::<Scope>(), Ok(Scope::User));
        assert_eq!("Project".parse::<Scope>(), Ok(Scope::Project));
        assert_eq!("local".parse::<Scope>(), Ok(Scope::Local));
        assert!("global".parse::<Scope>().is_err());
        assert_eq!(Scope::Local.to_string(), "local");
    }

    #[test]
    fn test_serialized_field_names() -> Result<()> {
        let event = event_at("profile apply", "/tmp/settings.json", Scope::User, 1_700_000_000)
            .with_error("boom");
        let line = serde_json::to_string(&event)?;

        assert!(line.contains("\"changeType\":\"create\""));
        assert!(line.contains("\"scope\":\"user\""));
        assert!(line.contains("\"error\":\"boom\""));
        assert!(!line.contains("\"before\""));
        assert!(!line.contains("\"context\""));

        let no_change = serde_json::to_string(&ChangeType::NoChange)?;
        assert_eq!(no_change, "\"no-change\"");
        Ok(())
    }

    #[test]
    fn test_filters_match() {
        let event = event_at("plugin install", "/home/u/plugins.json", Scope::Project, 1000);

        assert!(EventFilters::new().matches(&event));
        assert!(EventFilters::new().with_operation("install").matches(&event));
        assert!(!EventFilters::new().with_operation("remove").matches(&event));
        assert!(EventFilters::new().with_file("/home/u/plugins.json").matches(&event));
        assert!(!EventFilters::new().with_file("/home/u/other.json").matches(&event));
        assert!(EventFilters::new().with_scope(Scope::Project).matches(&event));
        assert!(!EventFilters::new().with_scope(Scope::User).matches(&event));

        let at = Utc.timestamp_opt(1000, 0).unwrap();
        assert!(EventFilters::new().with_since(at).matches(&event), "since is inclusive");
        let later = Utc.timestamp_opt(1001, 0).unwrap();
        assert!(!EventFilters::new().with_since(later).matches(&event));
    }

    #[test]
    fn test_filters_finish_sorts_then_limits() {
        let events = vec![
            event_at("a", "/f", Scope::User, 10),
            event_at("b", "/f", Scope::User, 30),
            event_at("c", "/f", Scope::User, 20),
        ];

        let result = EventFilters::new().with_limit(2).finish(events.clone());
        let ops: Vec<_> = result.iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, vec!["b", "c"]);

        let unlimited = EventFilters::new().with_limit(0).finish(events);
        assert_eq!(unlimited.len(), 3);
    }

    #[test]
    fn test_size_delta_requires_both_snapshots() {
        let created = event_at("a", "/f", Scope::User, 1);
        assert_eq!(created.size_delta(), None);

        let updated = FileOperation::new(
            "a",
            PathBuf::from("/f"),
            Scope::User,
            Some(snapshot("x", 100)),
            Some(snapshot("y", 150)),
        );
        assert_eq!(updated.size_delta(), Some(50));
        assert_eq!(updated.change_type, ChangeType::Update);
    }
}
