//! Break accounting.
//!
//! Focus time is wall-clock time minus the sum of every pause interval. An
//! interval that is still open counts up to `now`. Each interval contributes
//! at least zero, so out-of-order timestamps can never inflate focus time.

use crate::db::Break;

/// Seconds covered by a single break as of `now`.
pub fn break_duration(record: &Break, now: i64) -> i64 {
    let end = record.resume_ts.unwrap_or(now);
    (end - record.pause_ts).max(0)
}

pub fn total_break_time(breaks: &[Break], now: i64) -> i64 {
    breaks
        .iter()
        .map(|record| break_duration(record, now))
        .sum()
}

/// `max(0, now - start_ts - total_break)`.
pub fn focus_seconds(start_ts: i64, now: i64, total_break: i64) -> i64 {
    (now - start_ts - total_break).max(0)
}
