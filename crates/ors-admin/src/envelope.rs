use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// The ORS response shape: `{ "success": bool, "result": { "message": .. } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub result: Map<String, Value>,
}

impl Envelope {
    pub fn failure(message: impl Into<String>) -> Self {
        let mut result = Map::new();
        result.insert("message".to_string(), Value::String(message.into()));
        Self {
            success: false,
            result,
        }
    }

    pub fn session_expired() -> Self {
        Self::failure(SESSION_EXPIRED_MESSAGE)
    }

    pub fn into_value(self) -> Value {
        json!({ "success": self.success, "result": self.result })
    }
}

/// Lenient readers over raw response bodies. Success bodies are forwarded
/// unvalidated, so callers only ever inspect them.
pub fn is_success(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(false)
}

pub fn result_field<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get("result").and_then(|r| r.get(field))
}

pub fn result_message(body: &Value) -> Option<&str> {
    result_field(body, "message").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_shape() {
        let v = Envelope::session_expired().into_value();
        assert_eq!(
            v,
            json!({"success": false, "result": {"message": "Session expired. Please login again."}})
        );
    }

    #[test]
    fn test_readers_tolerate_odd_bodies() {
        assert!(!is_success(&json!("ok")));
        assert!(!is_success(&json!({"success": "true"})));
        assert_eq!(result_message(&json!({"result": null})), None);
        assert_eq!(result_message(&json!({"result": {"message": "hi"}})), Some("hi"));
    }
}
