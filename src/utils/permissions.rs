use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Mode for files that may contain settings fragments (rw-------)
pub const OWNER_ONLY_FILE_MODE: u32 = 0o600;

/// Opens `path` for appending, creating it owner-only if it does not exist.
///
/// On non-Unix platforms the mode is not applied.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or created
pub fn open_append_owner_only(path: &Path) -> Result<fs::File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(OWNER_ONLY_FILE_MODE);
    }

    options
        .open(path)
        .with_context(|| format!("Failed to open {} for appending", path.display()))
}
