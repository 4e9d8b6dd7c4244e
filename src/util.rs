use crate::error::{ActivityError, Result};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Parses `--since`: RFC 3339, `YYYY-MM-DD`, or "N days|weeks|months ago".
pub fn parse_since(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    // YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    if let Some(duration) = parse_natural_duration(input) {
        return now
            .checked_sub_signed(duration)
            .ok_or_else(|| ActivityError::InvalidDate(format!("Duration overflow for '{input}'")));
    }

    Err(ActivityError::InvalidDate(format!(
        "'{input}' is not a date (RFC3339, YYYY-MM-DD, or 'N days ago')"
    )))
}

fn parse_natural_duration(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let (count, unit_days) = if let Some(n) = input.strip_suffix(" days ago") {
        (n, 1)
    } else if let Some(n) = input.strip_suffix(" weeks ago") {
        (n, 7)
    } else if let Some(n) = input.strip_suffix(" months ago") {
        (n, 30)
    } else {
        return None;
    };
    let n: i64 = count.trim().parse().ok()?;
    Duration::try_days(n.checked_mul(unit_days)?)
}
