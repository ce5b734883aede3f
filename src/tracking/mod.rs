//! Snapshot-based change detection for tracked configuration files.
//!
//! A [`Tracker`] wraps a mutating closure: it snapshots the target file,
//! runs the closure, snapshots the file again, infers what happened and
//! appends a [`FileOperation`] to its [`EventWriter`].
//!
//! Recording is strictly best effort. A failing snapshot degrades to "file
//! absent", a failing write is logged and dropped, and the closure's own
//! result is always returned untouched.
//!
//! # Usage
//!
//! ```no_run
//! use dotaudit::storage::{JsonlEventLog, Scope};
//! use dotaudit::tracking::Tracker;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let log = Arc::new(JsonlEventLog::open("/tmp/audit/events.jsonl")?);
//! let tracker = Tracker::new(log);
//!
//! tracker.record_file_write("settings edit", "/tmp/settings.json", Scope::User, || {
//!     std::fs::write("/tmp/settings.json", r#"{"theme":"dark"}"#)
//! })?;
//! # Ok(())
//! # }
//! ```

/// File snapshots and the content capture policy
pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotPolicy, take_snapshot};

use crate::AuditContext;
use crate::storage::{EventWriter, FileOperation, JsonlEventLog, Scope};
use crate::utils::paths::{canonical_file_path, clean_path};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, debug, span, warn};

/// Records file mutations performed through it.
///
/// A disabled tracker runs the wrapped operation and does nothing else.
#[derive(Clone)]
pub struct Tracker {
    /// Destination of recorded events; `None` when tracking is disabled
    writer: Option<Arc<dyn EventWriter>>,
    /// Which file bodies are kept in snapshots
    policy: SnapshotPolicy,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("enabled", &self.is_enabled())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Tracker {
    /// Creates an enabled tracker writing to `writer` with the default snapshot policy
    #[must_use]
    pub fn new(writer: Arc<dyn EventWriter>) -> Self {
        Self {
            writer: Some(writer),
            policy: SnapshotPolicy::default(),
        }
    }

    /// Creates a tracker that records nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            writer: None,
            policy: SnapshotPolicy::default(),
        }
    }

    /// Replaces the snapshot policy
    #[must_use]
    pub fn with_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the tracker described by the configuration.
    ///
    /// Falls back to a disabled tracker when tracking is turned off or the
    /// log file cannot be created; the host application keeps working either way.
    #[must_use]
    pub fn from_context(ctx: &AuditContext) -> Self {
        let policy = SnapshotPolicy::from_config(&ctx.config.snapshot);

        if !ctx.tracking_enabled() {
            debug!("File tracking disabled by configuration");
            return Self::disabled().with_policy(policy);
        }

        match JsonlEventLog::open(&ctx.log_path) {
            Ok(log) => Self::new(Arc::new(log)).with_policy(policy),
            Err(e) => {
                warn!(
                    path = %ctx.log_path.display(),
                    error = %format!("{e:#}"),
                    "Audit log unavailable, file operations will not be recorded"
                );
                Self::disabled().with_policy(policy)
            }
        }
    }

    /// Whether operations are being recorded
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Snapshot policy in use
    #[must_use]
    pub const fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }

    /// Runs `f`, recording how it changed the file at `path`.
    ///
    /// Returns exactly what `f` returned. The after-snapshot is taken even
    /// when `f` fails, since partial writes are worth recording.
    ///
    /// # Errors
    ///
    /// Only errors produced by `f` itself; recording failures are never surfaced.
    pub fn record_file_write<T, E, F>(
        &self,
        operation: &str,
        path: impl AsRef<Path>,
        scope: Scope,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        self.record_file_write_with_context(operation, path, scope, BTreeMap::new(), f)
    }

    /// Same as [`Tracker::record_file_write`], attaching caller context to the event.
    ///
    /// # Errors
    ///
    /// Only errors produced by `f` itself.
    pub fn record_file_write_with_context<T, E, F>(
        &self,
        operation: &str,
        path: impl AsRef<Path>,
        scope: Scope,
        context: BTreeMap<String, String>,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        let Some(writer) = &self.writer else {
            return f();
        };

        let file = resolve_file_path(path.as_ref());
        let span = span!(Level::DEBUG, "record_file_write", operation, file = %file.display());
        let _guard = span.enter();

        let before = take_snapshot(&file, &self.policy);
        let result = f();
        let after = take_snapshot(&file, &self.policy);

        let mut event =
            FileOperation::new(operation, file, scope, before, after).with_context(context);
        if let Err(e) = &result {
            event = event.with_error(format!("{e:#}"));
        }

        debug!(change = %event.change_type, failed = event.failed(), "Recording file operation");

        if let Err(e) = writer.write(&event) {
            warn!(error = %format!("{e:#}"), "Failed to record file operation");
        }

        result
    }
}

/// Absolute, `..`-free form of the path; falls back to a lexical clean if
/// the working directory is unavailable.
fn resolve_file_path(path: &Path) -> PathBuf {
    canonical_file_path(path).unwrap_or_else(|e| {
        debug!(error = %e, "Could not make path absolute");
        clean_path(path)
    })
}

/// Process-wide tracker built from the default configuration.
static DEFAULT_TRACKER: OnceCell<Tracker> = OnceCell::new();

/// Returns the process-wide tracker, constructing it on first use.
///
/// Meant for top-level wiring in the binary only. Library callers and tests
/// should build their own [`Tracker`] and pass it explicitly.
pub fn default_tracker() -> &'static Tracker {
    DEFAULT_TRACKER.get_or_init(|| match AuditContext::new() {
        Ok(ctx) => Tracker::from_context(&ctx),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Could not load configuration, tracking disabled");
            Tracker::disabled()
        }
    })
}
