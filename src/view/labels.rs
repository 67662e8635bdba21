//! Date, time, and avatar labels.
//!
//! All timestamps are epoch milliseconds; calendar math happens in the
//! viewer's UTC offset, passed in explicitly so the output is a pure
//! function of its inputs.

use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

pub const FALLBACK_INITIALS: &str = "You";

/// The process's local offset, or UTC when it cannot be determined.
#[must_use]
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn at(ts_ms: i64, offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ts_ms) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(offset)
}

/// `Today`, `Yesterday`, or `M/D/YYYY`.
#[must_use]
pub fn day_label(ts_ms: i64, now_ms: i64, offset: UtcOffset) -> String {
    let day = at(ts_ms, offset).date();
    let today = at(now_ms, offset).date();
    if day == today {
        return "Today".to_owned();
    }
    if today.checked_sub(Duration::days(1)) == Some(day) {
        return "Yesterday".to_owned();
    }
    day.format(format_description!("[month padding:none]/[day padding:none]/[year]"))
        .unwrap_or_default()
}

/// Two-digit 12-hour clock time, e.g. `09:05 PM`.
#[must_use]
pub fn time_label(ts_ms: i64, offset: UtcOffset) -> String {
    at(ts_ms, offset)
        .format(format_description!("[hour repr:12]:[minute] [period]"))
        .unwrap_or_default()
}

/// Up to two uppercase initials from a display name; `You` when empty.
#[must_use]
pub fn initials_from(name: Option<&str>) -> String {
    let initials: String = name
        .unwrap_or_default()
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() { FALLBACK_INITIALS.to_owned() } else { initials }
}

/// Avatar text: the first two characters of a label, uppercased.
#[must_use]
pub fn avatar_label(label: &str) -> String {
    label.chars().take(2).flat_map(char::to_uppercase).collect()
}

#[cfg(test)]
#[path = "labels_test.rs"]
mod tests;
