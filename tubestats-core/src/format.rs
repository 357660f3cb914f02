//! Formatting helpers shared by the review outputs.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Format seconds as hours and minutes (e.g., "5h 03m", "45m").
pub fn format_duration_hm(secs: i64) -> String {
    if secs <= 0 {
        return "unknown".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Label of a UTC offset, e.g. "GMT+8" or "GMT-3:30".
pub fn format_gmt_offset(offset: &FixedOffset) -> String {
    let total = offset.local_minus_utc();
    let sign = if total < 0 { '-' } else { '+' };
    let hours = total.abs() / 3600;
    let minutes = (total.abs() % 3600) / 60;
    if minutes == 0 {
        format!("GMT{}{}", sign, hours)
    } else {
        format!("GMT{}{}:{:02}", sign, hours, minutes)
    }
}

/// Format a timestamp in the given offset (e.g., "2024-01-01 20:00 (GMT+8)").
pub fn format_local_datetime(ts: DateTime<Utc>, offset: &FixedOffset) -> String {
    format!(
        "{} ({})",
        ts.with_timezone(offset).format("%Y-%m-%d %H:%M"),
        format_gmt_offset(offset)
    )
}

/// Format a date with its weekday (e.g., "2024-03-04 (Mon)").
pub fn format_date_with_weekday(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}
