//! Formatting helpers shared across front ends.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Format a message timestamp the way the conversation panel shows it,
/// e.g. "01/15/2024, 02:30 PM".
pub fn format_message_time<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.format("%m/%d/%Y, %I:%M %p").to_string()
}

/// Current local time in message format.
pub fn message_time_now() -> String {
    format_message_time(&Local::now())
}

/// Format a creation timestamp as a local date, e.g. "01/15/2024".
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%m/%d/%Y").to_string()
}

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}
