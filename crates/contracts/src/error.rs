//! Layered error definitions
//!
//! Categorized by source: config / request / respond

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Request Errors =====
    /// Raw request body is not valid JSON
    #[error("request parse error: {message}")]
    RequestParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // ===== Respond Errors =====
    /// Responder failed to deliver a response
    #[error("responder '{responder}' error: {message}")]
    Respond { responder: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create request parse error from a JSON error
    pub fn request_parse(source: serde_json::Error) -> Self {
        Self::RequestParse {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create responder error
    pub fn respond(responder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Respond {
            responder: responder.into(),
            message: message.into(),
        }
    }
}
