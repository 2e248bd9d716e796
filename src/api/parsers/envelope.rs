use serde_json::Value;
use thiserror::Error;

use crate::domain::lenient::value_to_i64;

/// A dotted location of a list inside an upstream response body.
pub type ListPath = &'static [&'static str];

pub const COMPETITION_LIST: &[ListPath] = &[&["data", "list"], &["list"]];
pub const STAGE_LIST: &[ListPath] = &[&["list"], &["data", "list"]];
pub const TEAM_LIST: &[ListPath] = &[&["data", "list"], &["list"], &["data"]];
pub const PLAYER_LIST: &[ListPath] = TEAM_LIST;
pub const SCORE_LIST: &[ListPath] = &[&["data", "rank_list"], &["rank_list"], &["data"]];
pub const STAT_LIST: &[ListPath] = &[&["data", "list"]];

#[derive(Debug, Error, PartialEq)]
pub enum EnvelopeError {
    #[error("Invalid API response format")]
    MissingList,
    #[error("Expected an array at {0}")]
    NotAnArray(String),
    #[error("Upstream returned code {code}: {message}")]
    UpstreamCode { code: i64, message: String },
}

/// Return the first list found at one of `paths`, tried in order.
///
/// A path that resolves to a non-array value is skipped so the next shape can
/// be probed; when the last matching path is not an array the error names it.
pub fn extract_list(body: &Value, paths: &[ListPath]) -> Result<Vec<Value>, EnvelopeError> {
    let mut non_array = None;

    for path in paths {
        match resolve(body, path) {
            Some(Value::Array(items)) => return Ok(items.clone()),
            Some(Value::Null) | None => continue,
            Some(_) => non_array = Some(path.join(".")),
        }
    }

    match non_array {
        Some(path) => Err(EnvelopeError::NotAnArray(path)),
        None => Err(EnvelopeError::MissingList),
    }
}

/// Stat endpoints carry `code`/`message`; any code other than zero is an error.
/// The code is read leniently, so `"20002"` counts the same as `20002`.
pub fn check_status_code(body: &Value) -> Result<(), EnvelopeError> {
    let code = body.get("code").and_then(value_to_i64).unwrap_or(0);
    if code == 0 {
        return Ok(());
    }

    let message = body
        .get("message")
        .or_else(|| body.get("msg"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Err(EnvelopeError::UpstreamCode { code, message })
}

fn resolve<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(body, |node, key| node.get(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_and_flat_envelopes() {
        let nested = json!({"data": {"list": [{"competition_uuid": "a"}]}});
        let flat = json!({"list": [{"competition_uuid": "b"}, {"competition_uuid": "c"}]});

        assert_eq!(extract_list(&nested, COMPETITION_LIST).unwrap().len(), 1);
        assert_eq!(extract_list(&flat, COMPETITION_LIST).unwrap().len(), 2);
    }

    #[test]
    fn test_missing_list_is_an_error() {
        let body = json!({"data": {"total": 0}});
        assert_eq!(
            extract_list(&body, COMPETITION_LIST),
            Err(EnvelopeError::MissingList)
        );
    }

    #[test]
    fn test_data_object_is_not_a_team_list() {
        let body = json!({"data": {"total": 3}});
        assert_eq!(
            extract_list(&body, TEAM_LIST),
            Err(EnvelopeError::NotAnArray("data".to_string()))
        );
    }

    #[test]
    fn test_score_list_falls_back_to_data_array() {
        let body = json!({"data": [{"team_uuid": "t1"}]});
        assert_eq!(extract_list(&body, SCORE_LIST).unwrap().len(), 1);
    }

    #[test]
    fn test_non_zero_code() {
        assert!(check_status_code(&json!({"code": 0, "data": {}})).is_ok());
        assert!(check_status_code(&json!({"data": {}})).is_ok());
        assert_eq!(
            check_status_code(&json!({"code": 20002, "message": "参数非法"})),
            Err(EnvelopeError::UpstreamCode {
                code: 20002,
                message: "参数非法".to_string()
            })
        );
    }

    #[test]
    fn test_string_code_is_checked() {
        assert!(check_status_code(&json!({"code": "0", "data": {}})).is_ok());
        assert_eq!(
            check_status_code(&json!({"code": "20002", "msg": "参数非法"})),
            Err(EnvelopeError::UpstreamCode {
                code: 20002,
                message: "参数非法".to_string()
            })
        );
    }
}
