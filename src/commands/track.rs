use crate::output;
use crate::storage::Scope;
use crate::tracking::Tracker;
use anyhow::{Context, Result, anyhow, bail};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Exit code used when the child was terminated by a signal
const SIGNALED_EXIT_CODE: i32 = 1;

/// Execute track command - run `command` as a recorded mutation of `file`
///
/// Returns the exit code to leave with: `0` when the command succeeded,
/// otherwise the child's own code. The event is recorded either way.
///
/// # Errors
///
/// Returns an error if no command is given or it cannot be started
pub fn execute(
    tracker: &Tracker,
    operation: &str,
    file: &Path,
    scope: Scope,
    context: Vec<(String, String)>,
    command: &[String],
) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        bail!("No command given; pass it after `--`");
    };

    if !tracker.is_enabled() {
        output::verbose("Tracking is disabled; running the command without recording");
    }

    let context: BTreeMap<String, String> = context.into_iter().collect();
    let mut exit_code = 0;

    let result = tracker.record_file_write_with_context(operation, file, scope, context, || -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to run {program}"))?;
        debug!(%status, "Tracked command finished");

        if status.success() {
            Ok(())
        } else {
            exit_code = status.code().unwrap_or(SIGNALED_EXIT_CODE);
            Err(anyhow!("`{}` failed with {status}", command.join(" ")))
        }
    });

    match result {
        Ok(()) => {
            if tracker.is_enabled() {
                output::success(&format!("Recorded {operation} on {}", file.display()));
            }
            Ok(0)
        }
        // The command ran and failed: the event is recorded, report and pass its code on
        Err(e) if exit_code != 0 => {
            super::print_error(&format!("{e:#}"));
            Ok(exit_code)
        }
        Err(e) => Err(e),
    }
}
