//! ResponseEnvelope - dispatch output
//!
//! The wire contract: exactly one of `{ "data": ... }` or `{ "error": "..." }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default success status
pub const STATUS_OK: u16 = 200;

/// Client-input failure status
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Hook/handler failure status
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    /// Success payload
    Data { data: Value },
    /// Failure message
    Error { error: String },
}

impl ResponseEnvelope {
    /// Success payload, if any
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Data { data } => Some(data),
            Self::Error { .. } => None,
        }
    }

    /// Error message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Data { .. } => None,
            Self::Error { error } => Some(error),
        }
    }
}

/// Envelope paired with its status code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub status: u16,
    #[serde(rename = "body")]
    pub envelope: ResponseEnvelope,
}

impl DispatchResponse {
    /// Success response with status 200
    pub fn ok(data: Value) -> Self {
        Self {
            status: STATUS_OK,
            envelope: ResponseEnvelope::Data { data },
        }
    }

    /// Error response with the given status
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope: ResponseEnvelope::Error {
                error: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.envelope, ResponseEnvelope::Data { .. })
    }
}
