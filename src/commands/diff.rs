use crate::AuditContext;
use crate::diff::diff_snapshots;
use crate::output;
use crate::tracking::{SnapshotPolicy, take_snapshot};
use anyhow::{Result, bail};
use std::path::Path;

/// Execute diff command - compare two files the way recorded snapshots are compared
///
/// A missing file counts as absent, so comparing against a path that does
/// not exist shows a creation or deletion.
///
/// # Errors
///
/// Returns an error if neither file exists
pub fn execute(ctx: &AuditContext, before: &Path, after: &Path, full: bool) -> Result<()> {
    let policy = SnapshotPolicy::from_config(&ctx.config.snapshot);

    let old = take_snapshot(before, &policy);
    let new = take_snapshot(after, &policy);

    match (&old, &new) {
        (None, None) => bail!(
            "Neither {} nor {} is a readable file",
            before.display(),
            after.display()
        ),
        (None, Some(_)) => output::info(&format!("{} does not exist", before.display())),
        (Some(_), None) => output::info(&format!("{} does not exist", after.display())),
        _ => {}
    }

    let result = diff_snapshots(old.as_ref(), new.as_ref(), full);
    if !result.content_available && result.has_changes {
        output::verbose("File bodies not captured; comparing hashes only");
    }

    for line in super::diff_lines(&result) {
        println!("{}", super::colorize_diff_line(&line));
    }

    Ok(())
}
