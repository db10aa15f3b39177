//! Coarse relative-age labels ("5m ago").

use chrono::{DateTime, Utc};

/// Label for a timestamp that could not be parsed.
pub const UNKNOWN_AGE: &str = "unknown";

/// Format the age of `then` relative to `now`.
///
/// Anything under a minute, or in the future, is "just now".
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m ago");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

/// Parse an RFC 3339 timestamp as returned by the API.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// [`relative_age`] for a raw API timestamp; missing or malformed input
/// yields [`UNKNOWN_AGE`].
pub fn age_label(raw: Option<&str>, now: DateTime<Utc>) -> String {
    raw.and_then(parse_timestamp)
        .map_or_else(|| UNKNOWN_AGE.to_string(), |then| relative_age(then, now))
}
