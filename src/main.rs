use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use dotaudit::cli::{Cli, Commands};
use dotaudit::report::ReportOptions;
use dotaudit::{AuditContext, commands, output, tracking};
use std::io;
use std::process;
use tracing_subscriber::prelude::*;

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the verbosity flags
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "dotaudit=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Runs the selected command and returns the process exit code
fn run() -> Result<i32> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    output::set_verbosity(output::Verbosity::from_flags(cli.quiet, cli.verbose));

    let command = match cli.command {
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
            return Ok(0);
        }
        // The wrapped command must run even when the configuration is unusable;
        // the default tracker falls back to recording nothing in that case
        Commands::Track {
            operation,
            scope,
            context,
            file,
            command,
        } => {
            return commands::track::execute(
                tracking::default_tracker(),
                &operation,
                &file,
                scope,
                context,
                &command,
            );
        }
        other => other,
    };

    let mut ctx = AuditContext::new()?;
    output::configure_color(ctx.config.report.color);

    match command {
        Commands::Log {
            file,
            operation,
            scope,
            since,
            limit,
            oneline,
        } => {
            let filters = commands::build_filters(
                file.as_deref(),
                operation.as_deref(),
                scope,
                since.as_deref(),
                limit,
            )?;
            commands::log::execute(&ctx, &filters, oneline)?;
        }
        Commands::Show {
            index,
            file,
            operation,
            full,
            unified,
        } => {
            let filters =
                commands::build_filters(file.as_deref(), operation.as_deref(), None, None, 0)?;
            commands::show::execute(&ctx, index, &filters, full, unified)?;
        }
        Commands::Report {
            scope,
            operation,
            since,
            markdown,
            output,
        } => {
            let options = ReportOptions {
                scope,
                operation,
                since: commands::resolve_since(since.as_deref())?,
            };
            commands::report::execute(&ctx, options, markdown, output.as_deref())?;
        }
        Commands::Diff {
            before,
            after,
            full,
        } => {
            commands::diff::execute(&ctx, &before, &after, full)?;
        }
        Commands::Config {
            key,
            value,
            unset,
            list,
        } => {
            commands::config::execute(&mut ctx, key.as_deref(), value, unset, list)?;
        }
        Commands::Completion { .. } | Commands::Track { .. } => {}
    }

    Ok(0)
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
