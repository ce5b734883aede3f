use crate::storage::ChangeType;
use chrono::{DateTime, TimeZone, Utc};
use colored::Colorize;

/// Formats bytes into human-readable size
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{bytes} {}", UNITS[unit_index])
    } else {
        format!("{size:.2} {}", UNITS[unit_index])
    }
}

/// Formats a signed byte delta, e.g. `+50 bytes`, `-12 bytes`, `0 bytes`
#[must_use]
pub fn format_byte_delta(delta: i64) -> String {
    let unit = if delta.unsigned_abs() == 1 {
        "byte"
    } else {
        "bytes"
    };
    if delta > 0 {
        format!("+{delta} {unit}")
    } else {
        format!("{delta} {unit}")
    }
}

/// Signed difference `after - before` between two sizes, saturating at the i64 range
#[must_use]
pub fn size_delta(before: u64, after: u64) -> i64 {
    if after >= before {
        i64::try_from(after - before).unwrap_or(i64::MAX)
    } else {
        i64::try_from(before - after).map_or(i64::MIN, |d| -d)
    }
}

/// Formats a relative time from `now`
#[must_use]
pub fn format_relative_time<Tz: TimeZone>(timestamp: &DateTime<Tz>, now: DateTime<Utc>) -> String {
    let diff = now.timestamp() - timestamp.timestamp();

    if diff < 0 {
        return "in the future".to_string();
    }

    let (value, unit) = if diff < 60 {
        (diff, "second")
    } else if diff < 3600 {
        (diff / 60, "minute")
    } else if diff < 86400 {
        (diff / 3600, "hour")
    } else if diff < 2_592_000 {
        (diff / 86400, "day")
    } else if diff < 31_536_000 {
        (diff / 2_592_000, "month")
    } else {
        (diff / 31_536_000, "year")
    };

    if value == 1 {
        format!("{value} {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}

/// Returns the colored one-letter marker for a change type
#[must_use]
pub fn colored_change_char(change: ChangeType) -> String {
    match change {
        ChangeType::Create => "A".green().to_string(),
        ChangeType::Update => "M".yellow().to_string(),
        ChangeType::Delete => "D".red().to_string(),
        ChangeType::NoChange => "=".bright_black().to_string(),
        ChangeType::Unknown => "?".bright_black().to_string(),
    }
}
