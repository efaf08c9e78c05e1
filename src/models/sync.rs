// src/models/sync.rs
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::utils::json_extract;

/// Outcome of a call to the remote sheets endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncResponse {
    Success { data: Option<Value> },
    Failure(SyncFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncFailure {
    /// Transport failure, or an error message reported by the endpoint.
    Error(String),
    /// Body that could not be interpreted, kept verbatim.
    Raw(String),
}

impl SyncFailure {
    pub fn message(&self) -> &str {
        match self {
            SyncFailure::Error(msg) => msg,
            SyncFailure::Raw(raw) => raw,
        }
    }
}

impl SyncResponse {
    pub fn error(msg: impl Into<String>) -> Self {
        SyncResponse::Failure(SyncFailure::Error(msg.into()))
    }

    pub fn raw(body: impl Into<String>) -> Self {
        SyncResponse::Failure(SyncFailure::Raw(body.into()))
    }

    /// Interprets a response body: strict JSON first, then the first embedded object.
    pub fn from_body(body: &str) -> Self {
        match json_extract::parse_tolerant(body) {
            Some(value) => Self::from_value(value, body),
            None => Self::raw(body),
        }
    }

    /// Maps a decoded `{success, data?, error?}` envelope. `raw` is kept when the
    /// envelope carries no usable error message.
    /// Only a boolean `true` counts as success; truthy values like `1` or `"yes"` do not.
    pub fn from_value(value: Value, raw: &str) -> Self {
        let Value::Object(mut envelope) = value else {
            return Self::raw(raw);
        };

        if envelope.get("success") == Some(&Value::Bool(true)) {
            return SyncResponse::Success {
                data: envelope.remove("data"),
            };
        }

        match envelope.remove("error") {
            Some(Value::String(msg)) => Self::error(msg),
            Some(Value::Null) | None => Self::raw(raw),
            Some(other) => Self::error(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            SyncResponse::Success { data } => data.as_ref(),
            SyncResponse::Failure(_) => None,
        }
    }

    /// Wire shape: `{success: true, data?}` or `{success: false, error|raw}`.
    pub fn to_value(&self) -> Value {
        match self {
            SyncResponse::Success { data: Some(data) } => json!({ "success": true, "data": data }),
            SyncResponse::Success { data: None } => json!({ "success": true }),
            SyncResponse::Failure(SyncFailure::Error(msg)) => json!({ "success": false, "error": msg }),
            SyncResponse::Failure(SyncFailure::Raw(raw)) => json!({ "success": false, "raw": raw }),
        }
    }
}

impl Serialize for SyncResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_success() {
        let resp = SyncResponse::from_body(r#"{"success":true,"data":{"row":4}}"#);
        assert!(resp.is_success());
        assert_eq!(resp.data(), Some(&json!({"row": 4})));
    }

    #[test]
    fn test_html_wrapped_success() {
        let body = "<html><body>{\"success\":true,\"data\":[1,2]}</body></html>";
        assert_eq!(
            SyncResponse::from_body(body),
            SyncResponse::Success { data: Some(json!([1, 2])) }
        );
    }

    #[test]
    fn test_unparsable_body_is_kept_raw() {
        let body = "<html>Service unavailable</html>";
        assert_eq!(SyncResponse::from_body(body), SyncResponse::raw(body));
    }

    #[test]
    fn test_reported_error_is_surfaced() {
        let resp = SyncResponse::from_body(r#"{"success":false,"error":"Sheet locked"}"#);
        assert_eq!(resp, SyncResponse::error("Sheet locked"));
    }

    #[test]
    fn test_non_object_json_is_raw() {
        assert_eq!(SyncResponse::from_body("[1,2,3]"), SyncResponse::raw("[1,2,3]"));
        assert_eq!(SyncResponse::from_body(r#"{"ok":1}"#), SyncResponse::raw(r#"{"ok":1}"#));
    }

    #[test]
    fn test_only_boolean_true_is_success() {
        let body = r#"{"success":"yes","data":[1]}"#;
        assert_eq!(SyncResponse::from_body(body), SyncResponse::raw(body));
        assert!(!SyncResponse::from_body(r#"{"success":1}"#).is_success());
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(SyncResponse::raw("oops")).unwrap();
        assert_eq!(value, json!({"success": false, "raw": "oops"}));

        let value = serde_json::to_value(SyncResponse::Success { data: None }).unwrap();
        assert_eq!(value, json!({"success": true}));
    }
}
