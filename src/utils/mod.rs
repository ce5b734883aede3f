//! Utility functions and helpers.
//!
//! This module provides a collection of utility functions used throughout dotaudit:
//!
//! - Content hashing for snapshots
//! - Path canonicalization and tilde expansion
//! - Owner-only file creation for the audit log
//! - Size, delta and relative-time formatting
//! - `--since` argument parsing
//!
//! # Submodules
//!
//! - [`formatters`]: Output formatting
//! - [`hash`]: xxHash3 content digests
//! - [`paths`]: Path manipulation
//! - [`permissions`]: Owner-only file handling

/// Output formatting and colorization
pub mod formatters;
/// Content hashing (xxHash3-128)
pub mod hash;
/// Path manipulation and resolution utilities
pub mod paths;
/// Unix permission handling
pub mod permissions;

use anyhow::{Result, bail};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// Parses a `--since` argument into an absolute point in time.
///
/// Accepts, in order:
/// - a humantime duration relative to `now` (`2d`, `3weeks`, `12h`)
/// - an RFC 3339 timestamp (`2026-10-01T08:00:00+02:00`)
/// - a calendar date (`2026-10-01`), read as local midnight
///
/// # Errors
///
/// Returns an error if the value matches none of the accepted forms.
pub fn parse_since(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(duration) = humantime::parse_duration(value) {
        let duration = chrono::Duration::from_std(duration)?;
        return Ok(now - duration);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        && let Some(midnight) = date.and_hms_opt(0, 0, 0)
        && let Some(local) = Local.from_local_datetime(&midnight).earliest()
    {
        return Ok(local.with_timezone(&Utc));
    }

    bail!("Invalid --since value '{value}': expected a duration (e.g. 2d), RFC 3339 timestamp or YYYY-MM-DD")
}
