use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use super::models::ValidationError;
use crate::config::settings::DisplaySettings;

/// Epoch numbers above this are milliseconds, below it seconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Parse an upstream timestamp. A missing, null or blank value is `Ok(None)`
/// so the store can decide what an absent date means; a value that is present
/// but unparseable is rejected.
pub fn parse_upstream_time(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::Number(n)) => n.as_i64().and_then(from_epoch),
        Some(Value::String(s)) => parse_time_str(s.trim()),
        Some(_) => None,
    };

    parsed.map(Some).ok_or(ValidationError::InvalidDate)
}

fn parse_time_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }

    s.parse::<i64>().ok().and_then(from_epoch)
}

fn from_epoch(raw: i64) -> Option<DateTime<Utc>> {
    if raw.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}

/// Render a stored UTC timestamp in the dashboard's display zone.
pub fn to_display(time: &DateTime<Utc>, display: &DisplaySettings) -> String {
    time.with_timezone(&display.offset())
        .format(display.format)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_time_is_absent() {
        assert_eq!(parse_upstream_time(None), Ok(None));
        assert_eq!(parse_upstream_time(Some(&Value::Null)), Ok(None));
        assert_eq!(parse_upstream_time(Some(&json!("  "))), Ok(None));
    }

    #[test]
    fn test_epoch_seconds_and_millis() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_upstream_time(Some(&json!(1704067200))).unwrap(), Some(expected));
        assert_eq!(parse_upstream_time(Some(&json!(1704067200000_i64))).unwrap(), Some(expected));
        assert_eq!(parse_upstream_time(Some(&json!("1704067200"))).unwrap(), Some(expected));
    }

    #[test]
    fn test_string_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 2, 10, 30, 0).unwrap();
        assert_eq!(parse_upstream_time(Some(&json!("2024-03-02 10:30:00"))).unwrap(), Some(expected));
        assert_eq!(parse_upstream_time(Some(&json!("2024-03-02T10:30:00Z"))).unwrap(), Some(expected));
        assert_eq!(
            parse_upstream_time(Some(&json!("2024-03-02T18:30:00+08:00"))).unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(
            parse_upstream_time(Some(&json!("next tuesday"))),
            Err(ValidationError::InvalidDate)
        );
        assert_eq!(
            parse_upstream_time(Some(&json!({"t": 1}))),
            Err(ValidationError::InvalidDate)
        );
    }

    #[test]
    fn test_display_is_bangkok_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 2, 20, 0, 0).unwrap();
        assert_eq!(to_display(&time, &DisplaySettings::default()), "2024-03-03 03:00:00");
    }
}
