use anyhow::Result;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::io::Write;
use std::path::Path;
use tracing::{Level, debug, span};

/// Configuration for unified diff generation
pub struct UnifiedDiffConfig {
    /// Number of context lines around changes (typically 3)
    pub context_lines: usize,
    /// Whether to colorize the output
    pub colorize: bool,
}

impl Default for UnifiedDiffConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            colorize: false,
        }
    }
}

/// Generate a unified diff between the stored bodies of two snapshots.
///
/// Produces Git-style output with:
/// - File headers (`--- before/path` and `+++ after/path`)
/// - Hunk headers (`@@ -10,7 +10,9 @@`)
/// - Context lines (unchanged, prefixed with space)
/// - Deletion lines (prefixed with `-`, colored red)
/// - Addition lines (prefixed with `+`, colored green)
///
/// Returns the number of changed lines written.
///
/// # Errors
///
/// Returns an error if writing to the output writer fails.
pub fn generate_unified_diff(
    before: &str,
    after: &str,
    path: &Path,
    config: &UnifiedDiffConfig,
    writer: &mut dyn Write,
) -> Result<usize> {
    let span = span!(
        Level::DEBUG,
        "unified_diff",
        path = %path.display(),
        context = config.context_lines
    );
    let _guard = span.enter();

    let diff = TextDiff::from_lines(before, after);

    let old_header = format!("--- before/{}", path.display());
    let new_header = format!("+++ after/{}", path.display());

    if config.colorize {
        writeln!(writer, "{}", old_header.red())?;
        writeln!(writer, "{}", new_header.green())?;
    } else {
        writeln!(writer, "{old_header}")?;
        writeln!(writer, "{new_header}")?;
    }

    let mut total_changes = 0;

    for hunk in diff
        .unified_diff()
        .context_radius(config.context_lines)
        .iter_hunks()
    {
        let hunk_header = hunk.header().to_string();
        if config.colorize {
            writeln!(writer, "{}", hunk_header.cyan())?;
        } else {
            writeln!(writer, "{hunk_header}")?;
        }

        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => {
                    total_changes += 1;
                    let line = format!("-{change}");
                    if config.colorize { line.red().to_string() } else { line }
                }
                ChangeTag::Insert => {
                    total_changes += 1;
                    let line = format!("+{change}");
                    if config.colorize { line.green().to_string() } else { line }
                }
                ChangeTag::Equal => format!(" {change}"),
            };

            write!(writer, "{line}")?;

            // Last line of a body without trailing newline
            if change.missing_newline() {
                writeln!(writer)?;
            }
        }
    }

    debug!(changes = total_changes, "Unified diff complete");

    Ok(total_changes)
}
