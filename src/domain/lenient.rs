//! Serde helpers for loosely typed upstream JSON.
//!
//! Upstream fields switch between numbers and numeric strings, and any of them
//! may be `null` or missing. Each helper accepts every shape seen so far and
//! falls back to `None` instead of failing the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

/// Truthiness: `true`, non-zero numbers and non-empty strings other than
/// `"0"`/`"false"` count as set.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(is_truthy))
}

pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0" && s != "false",
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_f64")]
        score: Option<f64>,
        #[serde(default, deserialize_with = "opt_i64")]
        kills: Option<i64>,
        #[serde(default, deserialize_with = "opt_string")]
        name: Option<String>,
        #[serde(default, deserialize_with = "flag")]
        is_win: bool,
    }

    #[test]
    fn test_numbers_as_strings() {
        let sample: Sample =
            serde_json::from_value(json!({"score": "12.5", "kills": "7", "name": 42, "is_win": 1}))
                .unwrap();

        assert_eq!(sample.score, Some(12.5));
        assert_eq!(sample.kills, Some(7));
        assert_eq!(sample.name.as_deref(), Some("42"));
        assert!(sample.is_win);
    }

    #[test]
    fn test_nulls_and_garbage_become_none() {
        let sample: Sample = serde_json::from_value(
            json!({"score": null, "kills": "many", "name": "  ", "is_win": "0"}),
        )
        .unwrap();

        assert_eq!(sample.score, None);
        assert_eq!(sample.kills, None);
        assert_eq!(sample.name, None);
        assert!(!sample.is_win);
    }

    #[test]
    fn test_missing_fields_default() {
        let sample: Sample = serde_json::from_value(json!({})).unwrap();
        assert_eq!(sample.score, None);
        assert!(!sample.is_win);
    }

    #[test]
    fn test_float_kills_are_truncated() {
        assert_eq!(value_to_i64(&json!(3.9)), Some(3));
        assert_eq!(value_to_i64(&json!("4.2")), Some(4));
    }
}
