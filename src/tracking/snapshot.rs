use crate::utils::hash::{hash_bytes, hash_reader};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Default upper bound for keeping a file body in the snapshot (1 MiB)
pub const DEFAULT_MAX_CONTENT_SIZE: u64 = 1_048_576;

/// State of a file at one instant.
///
/// `content` is only kept for small structured files so that later diffs can
/// compare trees; everything else is reduced to hash and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// xxHash3-128 of the full file content
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Raw text of the file, when captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Snapshot {
    /// Creates a snapshot from its parts
    #[must_use]
    pub fn new(hash: impl Into<String>, size: u64, content: Option<String>) -> Self {
        Self {
            hash: hash.into(),
            size,
            content,
        }
    }

    /// Same hash and same size
    #[must_use]
    pub fn is_identical_to(&self, other: &Self) -> bool {
        self.hash == other.hash && self.size == other.size
    }

    /// Captured body, if any and non-empty
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

/// Decides which files get their body stored in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPolicy {
    /// Files at or above this size are stored as hash and size only
    pub max_content_size: u64,
    /// Lowercase extensions (without dot) whose content is structured
    pub content_extensions: Vec<String>,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            content_extensions: vec!["json".to_string()],
        }
    }
}

impl SnapshotPolicy {
    /// Policy from the `[snapshot]` config section
    #[must_use]
    pub fn from_config(config: &crate::config::SnapshotConfig) -> Self {
        Self {
            max_content_size: config.max_content_size,
            content_extensions: config
                .content_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether the body of a file at `path` with `size` bytes should be kept
    #[must_use]
    pub fn wants_content(&self, path: &Path, size: u64) -> bool {
        if size >= self.max_content_size {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.content_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

/// Captures the current state of `path`.
///
/// Returns `None` when the file does not exist, is not a regular file, or
/// cannot be read. Recording is best effort, so an unreadable file is treated
/// like an absent one rather than failing the caller.
#[must_use]
pub fn take_snapshot(path: &Path, policy: &SnapshotPolicy) -> Option<Snapshot> {
    match try_snapshot(path, policy) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Snapshot unavailable, treating file as absent");
            None
        }
    }
}

/// Fallible part of [`take_snapshot`]; `Ok(None)` means the file is absent.
fn try_snapshot(path: &Path, policy: &SnapshotPolicy) -> Result<Option<Snapshot>> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).context("Failed to read file metadata"),
    };

    if !metadata.is_file() {
        return Ok(None);
    }

    if policy.wants_content(path, metadata.len()) {
        let bytes = fs::read(path).context("Failed to read file")?;
        let hash = hash_bytes(&bytes);
        let size = bytes.len() as u64;
        // Non UTF-8 bodies cannot be parsed as structured text anyway
        let content = String::from_utf8(bytes).ok();
        return Ok(Some(Snapshot {
            hash,
            size,
            content,
        }));
    }

    let mut file = File::open(path).context("Failed to open file")?;
    let (hash, size) = hash_reader(&mut file).context("Failed to hash file")?;
    Ok(Some(Snapshot {
        hash,
        size,
        content: None,
    }))
}
