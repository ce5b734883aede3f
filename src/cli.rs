//! Command-line interface definitions for dotaudit.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes and doc comments,
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use crate::storage::Scope;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for dotaudit.
#[derive(Parser)]
#[command(
    name = "dotaudit",
    version = crate::VERSION,
    about = "Audit trail for configuration file changes",
    long_about = "Records before/after snapshots of configuration file mutations in an \
                  append-only log and explains them as structural diffs and reports"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List recorded events, newest first
    Log {
        /// Only events for this file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Only operations containing this text
        #[arg(short, long)]
        operation: Option<String>,

        /// Only events in this scope (user, project, local)
        #[arg(short, long)]
        scope: Option<Scope>,

        /// Only events since a duration ago (2d, 3weeks), an RFC 3339 time or a date
        #[arg(long)]
        since: Option<String>,

        /// Maximum number of events (0 for all)
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// One line per event
        #[arg(long)]
        oneline: bool,
    },

    /// Explain one recorded event
    Show {
        /// Position among matching events, 0 being the most recent
        #[arg(default_value = "0")]
        index: usize,

        /// Only events for this file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Only operations containing this text
        #[arg(short, long)]
        operation: Option<String>,

        /// Render every nested field and array element
        #[arg(long)]
        full: bool,

        /// Print a line-level unified diff of the stored bodies
        #[arg(short, long)]
        unified: bool,
    },

    /// Summarize recorded events as a timeline
    Report {
        /// Only events in this scope (user, project, local)
        #[arg(short, long)]
        scope: Option<Scope>,

        /// Only operations containing this text
        #[arg(short, long)]
        operation: Option<String>,

        /// Only events since a duration ago (2d, 3weeks), an RFC 3339 time or a date
        #[arg(long)]
        since: Option<String>,

        /// Render as Markdown
        #[arg(short, long)]
        markdown: bool,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare two files the way recorded snapshots are compared
    Diff {
        /// File holding the earlier state
        before: PathBuf,

        /// File holding the later state
        after: PathBuf,

        /// Render every nested field and array element
        #[arg(long)]
        full: bool,
    },

    /// Run a command and record what it does to a file
    Track {
        /// Operation name stored with the event
        #[arg(long)]
        operation: String,

        /// Scope of the file (user, project, local)
        #[arg(short, long, default_value = "user")]
        scope: Scope,

        /// Extra context as key=value (repeatable)
        #[arg(short, long = "context", value_parser = parse_key_val)]
        context: Vec<(String, String)>,

        /// File the command mutates
        file: PathBuf,

        /// Command to run, after `--`
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Get and set configuration options
    Config {
        /// Configuration key
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// Reset the configuration key to its default
        #[arg(long)]
        unset: bool,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parses a `key=value` pair
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid context '{s}': expected key=value"))?;
    if key.is_empty() {
        return Err(format!("invalid context '{s}': empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}
