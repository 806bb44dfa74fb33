//! Reusable formatting utilities for CLI output
//!
//! Byte sizes, relative ages and timestamps shown by several commands.

use chrono::{DateTime, Utc};

/// Format a byte count with binary units.
///
/// # Example output
/// - `512 B`
/// - `1.5 KB`
/// - `3.2 MB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Describe how long ago `time` was, relative to `now`.
///
/// # Example output
/// - `just now`
/// - `1 minute ago`
/// - `3 hours ago`
/// - `2 days ago`
pub fn format_time_ago(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - time).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }

    let (count, unit) = match secs {
        s if s < 3600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3600, "hour"),
        s => (s / 86_400, "day"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

/// Format an RFC 3339 timestamp in local time.
///
/// Date-only values (all-day events) are returned as given. Anything
/// unparseable is returned unchanged.
///
/// # Example output
/// `01/15/2025 14:30`
pub fn format_rfc3339_local(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%m/%d/%Y %H:%M")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}
