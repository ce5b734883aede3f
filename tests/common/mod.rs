#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use dotaudit::AuditContext;
use dotaudit::storage::{FileOperation, JsonlEventLog, Scope};
use dotaudit::tracking::{Snapshot, Tracker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Isolated audit setup: config, log and a directory for tracked files
pub struct TestAudit {
    pub temp_dir: TempDir,
    pub ctx: AuditContext,
}

impl TestAudit {
    /// Create a fresh context with its log and config inside a temp dir
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let log_path = temp_dir.path().join(".dotaudit/events.jsonl");
        let config_path = temp_dir.path().join(".config/dotaudit/config");

        let ctx = AuditContext::new_explicit(log_path, config_path)?;

        Ok(Self { temp_dir, ctx })
    }

    /// Get the temporary directory path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path for a tracked file inside the temp dir
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Enabled tracker writing to this context's log
    pub fn tracker(&self) -> Result<Tracker> {
        Ok(Tracker::new(Arc::new(JsonlEventLog::open(&self.ctx.log_path)?)))
    }

    /// Reader for this context's log
    pub fn log(&self) -> JsonlEventLog {
        self.ctx.event_log()
    }
}

/// Snapshot of an in-memory body, hashed the way the tracker hashes files
pub fn snapshot_of(body: &str) -> Snapshot {
    Snapshot::new(
        dotaudit::utils::hash::hash_bytes(body.as_bytes()),
        body.len() as u64,
        Some(body.to_string()),
    )
}

/// Parses an RFC 3339 timestamp
pub fn ts(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).expect("valid timestamp")
}

/// Event at a fixed time
pub fn event_at(timestamp: &str, operation: &str, file: &str) -> FileOperation {
    FileOperation::new(
        operation,
        PathBuf::from(file),
        Scope::User,
        None,
        Some(snapshot_of("{}")),
    )
    .with_timestamp(ts(timestamp))
}
