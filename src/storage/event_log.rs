use super::{EventFilters, EventWriter, FileOperation};
use crate::utils::paths::ensure_parent_dirs;
use crate::utils::permissions::open_append_owner_only;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{Level, debug, span};

/// Append-only audit log storing one JSON record per line.
///
/// A single mutex guards every append and every full-file scan, so readers in
/// this process never observe a half-written line. Lines that fail to parse
/// (a crash mid-write truncates the last one, newer versions may add record
/// shapes) are skipped when querying.
#[derive(Debug)]
pub struct JsonlEventLog {
    /// Location of the log file
    path: PathBuf,
    /// Serializes appends and scans
    lock: Mutex<()>,
}

impl JsonlEventLog {
    /// Creates a log handle for `path` without touching the filesystem
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a log handle and makes sure the log can be written.
    ///
    /// Creates the parent directories and opens the file for appending once,
    /// so an unwritable location is detected up front instead of on the first
    /// recorded operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let log = Self::new(path);
        ensure_parent_dirs(&log.path)?;
        drop(open_append_owner_only(&log.path)?);
        Ok(log)
    }

    /// Path of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquires the log lock. The lock guards no data, so a poisoned lock is still usable.
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads every parseable record in file order.
    ///
    /// Must be called with the lock held.
    fn read_all(&self) -> Result<Vec<FileOperation>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open audit log: {}", self.path.display())
                });
            }
        };

        let mut reader = BufReader::new(file);
        let mut line = Vec::new();
        let mut events = Vec::new();
        let mut skipped = 0usize;

        loop {
            line.clear();
            let bytes_read = reader
                .read_until(b'\n', &mut line)
                .with_context(|| format!("Failed to read audit log: {}", self.path.display()))?;
            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_slice::<FileOperation>(trimmed) {
                Ok(event) => events.push(event),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, path = %self.path.display(), "Skipped unparseable audit log lines");
        }

        Ok(events)
    }
}

impl EventWriter for JsonlEventLog {
    fn write(&self, event: &FileOperation) -> Result<()> {
        let mut line = serde_json::to_vec(event).context("Failed to serialize audit event")?;
        line.push(b'\n');

        let _guard = self.guard();
        ensure_parent_dirs(&self.path)?;
        let mut file = open_append_owner_only(&self.path)?;

        // One write call per record keeps lines whole under O_APPEND
        file.write_all(&line)
            .with_context(|| format!("Failed to append to audit log: {}", self.path.display()))?;
        file.flush()?;

        Ok(())
    }

    fn query(&self, filters: &EventFilters) -> Result<Vec<FileOperation>> {
        let span = span!(Level::DEBUG, "audit_query", path = %self.path.display());
        let _span = span.enter();

        let events = {
            let _guard = self.guard();
            self.read_all()?
        };

        let total = events.len();
        let matched: Vec<_> = events.into_iter().filter(|e| filters.matches(e)).collect();
        debug!(total, matched = matched.len(), "Audit log scanned");

        Ok(filters.finish(matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ChangeType, Scope};
    use crate::tracking::snapshot::Snapshot;
    use chrono::{DateTime, TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_log() -> Result<(TempDir, JsonlEventLog)> {
        let temp_dir = TempDir::new()?;
        let log = JsonlEventLog::new(temp_dir.path().join("audit/events.jsonl"));
        Ok((temp_dir, log))
    }

    fn event(operation: &str, secs: i64) -> FileOperation {
        let ts: DateTime<Utc> = Utc.timestamp_opt(secs, 123_456_789).unwrap();
        FileOperation::new(
            operation,
            PathBuf::from("/home/user/.claude/settings.json"),
            Scope::User,
            Some(Snapshot::new("abc123", 100, Some("{\"version\":1}".to_string()))),
            Some(Snapshot::new("def456", 150, None)),
        )
        .with_timestamp(ts.fixed_offset())
    }

    #[test]
    fn test_write_creates_parent_dirs() -> Result<()> {
        let (_temp, log) = setup_test_log()?;

        log.write(&event("profile apply", 100))?;

        assert!(log.path().exists());
        let content = fs::read_to_string(log.path())?;
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with('\n'));

        Ok(())
    }

    #[test]
    fn test_query_missing_file_is_empty() -> Result<()> {
        let (_temp, log) = setup_test_log()?;

        let events = log.query(&EventFilters::new())?;
        assert!(events.is_empty());

        Ok(())
    }

    #[test]
    fn test_round_trip_preserves_fields() -> Result<()> {
        let (_temp, log) = setup_test_log()?;
        let original = event("plugin install", 200).with_error("permission denied");

        log.write(&original)?;
        let events = log.query(&EventFilters::new())?;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0], original);
        assert_eq!(events[0].change_type, ChangeType::Update);
        assert_eq!(events[0].timestamp.timestamp_subsec_nanos(), 123_456_789);

        Ok(())
    }

    #[test]
    fn test_query_newest_first() -> Result<()> {
        let (_temp, log) = setup_test_log()?;

        log.write(&event("first", 100))?;
        log.write(&event("third", 300))?;
        log.write(&event("second", 200))?;

        let events = log.query(&EventFilters::new())?;
        let ops: Vec<_> = events.iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, vec!["third", "second", "first"]);

        Ok(())
    }

    #[test]
    fn test_query_skips_malformed_lines() -> Result<()> {
        let (_temp, log) = setup_test_log()?;

        log.write(&event("first", 100))?;
        {
            let mut file = open_append_owner_only(log.path())?;
            writeln!(file, "not json at all")?;
            writeln!(file)?;
            file.write_all(&[0xff, 0xfe, b'\n'])?;
            writeln!(file, "{{\"timestamp\": 12}}")?;
        }
        log.write(&event("second", 200))?;
        {
            // Truncated final record, as left by a crash mid-write
            let mut file = open_append_owner_only(log.path())?;
            write!(file, "{{\"timestamp\":\"2026-")?;
        }

        let events = log.query(&EventFilters::new())?;
        let ops: Vec<_> = events.iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, vec!["second", "first"]);

        Ok(())
    }
}
