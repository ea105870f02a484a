use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Handles parsing and formatting the timestamps found in activity-log payloads
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp string into a DateTime<Utc>
    /// Handles Z suffix, offsets, naive datetimes and bare `YYYY-MM-DD` dates
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>> {
        let timestamp = timestamp_str.trim();

        // RFC 3339 accepts both Z and numeric offsets
        if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
            return Ok(dt.with_timezone(&Utc));
        }

        // Try parsing as naive datetime and assume UTC
        if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(DateTime::from_naive_utc_and_offset(naive, Utc));
        }

        // Date only, midnight UTC
        if let Ok(date) = NaiveDate::parse_from_str(timestamp, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }

        anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
    }

    /// Calendar date of an API timestamp, read from its date portion.
    ///
    /// API months are always the first of the month; reading the date before
    /// the `T` keeps `2023-09-01T00:00:00-07:00` in September regardless of offset.
    pub fn parse_api_date(timestamp_str: &str) -> Result<NaiveDate> {
        let date_part = timestamp_str.trim().split('T').next().unwrap_or_default();
        match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            Ok(date) => Ok(date),
            Err(_) => Ok(Self::parse(timestamp_str)?.date_naive()),
        }
    }

    /// First instant of the UTC month containing `dt`.
    pub fn start_of_month(dt: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(dt.year(), dt.month(), 1, 0, 0, 0).single()
    }

    /// Render as the API's ISO form, e.g. `2024-01-01T00:00:00Z`.
    pub fn to_api_string(dt: DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Short month label used on chart axes, e.g. `4/24`.
pub fn format_month_label(timestamp_str: &str) -> Result<String> {
    let date = TimestampParser::parse_api_date(timestamp_str)?;
    Ok(date.format("%-m/%y").to_string())
}

/// Long month label used in dropdowns, e.g. `January 2024`.
pub fn format_month_long(timestamp_str: &str) -> Result<String> {
    let date = TimestampParser::parse_api_date(timestamp_str)?;
    Ok(date.format("%B %Y").to_string())
}
