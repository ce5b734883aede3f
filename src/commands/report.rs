use crate::AuditContext;
use crate::report::{ReportOptions, generate_audit_report};
use crate::storage::EventWriter;
use crate::utils::paths::ensure_parent_dirs;
use anyhow::{Context, Result};
use std::path::Path;

/// Execute report command - render an audit report to stdout or a file
///
/// # Errors
///
/// Returns an error if:
/// - The event log cannot be read
/// - The output file cannot be written
pub fn execute(
    ctx: &AuditContext,
    options: ReportOptions,
    markdown: bool,
    output: Option<&Path>,
) -> Result<()> {
    let events = ctx.event_log().query(&options.to_filters())?;
    let report = generate_audit_report(&events, options);

    let rendered = if markdown {
        report.render_as_markdown()
    } else {
        report.render_as_text()
    };

    match output {
        Some(path) => {
            ensure_parent_dirs(path)?;
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            super::print_success(&format!(
                "Report with {} events written to {}",
                report.summary.total_events,
                path.display()
            ));
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
