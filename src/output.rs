//! Terminal formatting for the `readtrack` binary.

use crate::tracking::FileStatus;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::time::{Duration, SystemTime};

/// Prints a success message in green.
pub fn success(message: &str) {
    eprintln!("{}", message.green());
}

/// Prints a warning message in bold yellow.
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color.
pub fn info(message: &str) {
    eprintln!("{}", message.dimmed());
}

/// Fixed-width, colored status label.
#[must_use]
pub fn status_label(status: FileStatus) -> String {
    let label = format!("{:<8}", status.as_str());
    match status {
        FileStatus::Current => label.green().to_string(),
        FileStatus::Stale => label.yellow().bold().to_string(),
        FileStatus::Error => label.red().bold().to_string(),
        FileStatus::NotRead => label.dimmed().to_string(),
    }
}

/// Human-readable byte count (B, KiB, MiB, GiB).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// RFC 3339 timestamp keeping the full sub-second precision.
#[must_use]
pub fn format_mtime(modified: SystemTime) -> String {
    humantime::format_rfc3339_nanos(modified).to_string()
}

/// Age relative to `now`, e.g. `3s ago`. Future instants read as `just now`.
#[must_use]
pub fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let Ok(age) = (now - at).to_std() else {
        return "just now".to_string();
    };
    let age = Duration::from_secs(age.as_secs());
    if age.is_zero() {
        return "just now".to_string();
    }
    format!("{} ago", humantime::format_duration(age))
}
