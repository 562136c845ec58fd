use chrono::{DateTime, SecondsFormat, Utc};

/// Ledger timestamps are RFC 3339, UTC, second precision (`2025-01-31T12:00:00Z`).
pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse any RFC 3339 timestamp and normalise it to UTC.
pub fn parse_ts(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw.trim()).map(|dt| dt.with_timezone(&Utc))
}
