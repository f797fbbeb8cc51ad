//! RequestEnvelope - dispatch input
//!
//! Decoded request body plus pass-through metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ContractError;

/// Request metadata forwarded untouched to hooks and handlers
///
/// The dispatcher never inspects it; handlers may use it for their own
/// decisions (e.g. authorization).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Header name -> value, names stored as given
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl RequestMeta {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header (builder style)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Look up a header, ASCII case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Incoming dispatch request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestEnvelope {
    /// Decoded body; `None` when the request carried no body at all
    pub body: Option<Value>,

    /// Pass-through metadata
    pub meta: RequestMeta,
}

impl RequestEnvelope {
    /// Request with a decoded body
    pub fn new(body: Value) -> Self {
        Self {
            body: Some(body),
            meta: RequestMeta::default(),
        }
    }

    /// Request without a body
    pub fn empty() -> Self {
        Self::default()
    }

    /// Convenience constructor for `{ "action": action, "input": input }`
    pub fn action(action: impl Into<String>, input: Value) -> Self {
        Self::new(serde_json::json!({ "action": action.into(), "input": input }))
    }

    /// Attach metadata (builder style)
    pub fn with_meta(mut self, meta: RequestMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Parse a raw body
    ///
    /// Empty or whitespace-only input means "no body".
    ///
    /// # Errors
    /// Returns `ContractError::RequestParse` when non-empty input is not JSON.
    pub fn from_json(raw: &str) -> Result<Self, ContractError> {
        if raw.trim().is_empty() {
            return Ok(Self::empty());
        }
        let body = serde_json::from_str(raw).map_err(ContractError::request_parse)?;
        Ok(Self::new(body))
    }

    /// The `action` field, if the body has one
    pub fn action_field(&self) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get("action"))
    }

    /// The `input` field, `Value::Null` when absent
    pub fn input(&self) -> Value {
        self.body
            .as_ref()
            .and_then(|b| b.get("input"))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_blank_is_no_body() {
        assert_eq!(RequestEnvelope::from_json("").unwrap().body, None);
        assert_eq!(RequestEnvelope::from_json("  \n").unwrap().body, None);
    }

    #[test]
    fn test_from_json_parses_body() {
        let req = RequestEnvelope::from_json(r#"{"action":"echo","input":42}"#).unwrap();
        assert_eq!(req.action_field(), Some(&json!("echo")));
        assert_eq!(req.input(), json!(42));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = RequestEnvelope::from_json("not json").unwrap_err();
        assert!(matches!(err, ContractError::RequestParse { .. }));
    }

    #[test]
    fn test_missing_input_is_null() {
        let req = RequestEnvelope::new(json!({ "action": "echo" }));
        assert_eq!(req.input(), Value::Null);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let meta = RequestMeta::new().with_header("Authorization", "Bearer t");
        assert_eq!(meta.header("authorization"), Some("Bearer t"));
        assert_eq!(meta.header("x-missing"), None);
    }
}
