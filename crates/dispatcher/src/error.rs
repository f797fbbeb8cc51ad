//! Dispatch error taxonomy
//!
//! `Display` is the exact `error` string placed on the wire.

use thiserror::Error;

use contracts::{DispatchResponse, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR};

/// Terminal dispatch failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Request carried no body
    #[error("No body")]
    NoBody,

    /// Body has no usable `action` field
    #[error("No action")]
    NoAction,

    /// No handler registered under the name
    #[error("Unknown action \"{action}\"")]
    UnknownAction { action: String },

    /// Handler exists but the action is absent from config or disabled
    #[error("Action \"{action}\" not enabled")]
    ActionNotEnabled { action: String },

    /// `before`, handler or `after` failed
    #[error("{message}")]
    HandlerFailure { action: String, message: String },

    /// Store factory failed
    #[error("{message}")]
    StoreInit { message: String },
}

impl DispatchError {
    pub fn unknown_action(action: impl Into<String>) -> Self {
        Self::UnknownAction {
            action: action.into(),
        }
    }

    pub fn not_enabled(action: impl Into<String>) -> Self {
        Self::ActionNotEnabled {
            action: action.into(),
        }
    }

    pub fn handler_failure(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerFailure {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Client-input errors are routine and carry no logged diagnostic
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoBody | Self::NoAction | Self::UnknownAction { .. } | Self::ActionNotEnabled { .. }
        )
    }

    /// HTTP-equivalent status
    pub fn status(&self) -> u16 {
        if self.is_client_error() {
            STATUS_BAD_REQUEST
        } else {
            STATUS_INTERNAL_ERROR
        }
    }

    /// Convert into the error envelope
    pub fn into_response(self) -> DispatchResponse {
        DispatchResponse::error(self.status(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_messages() {
        assert_eq!(DispatchError::NoBody.to_string(), "No body");
        assert_eq!(DispatchError::NoAction.to_string(), "No action");
        assert_eq!(
            DispatchError::unknown_action("x").to_string(),
            "Unknown action \"x\""
        );
        assert_eq!(
            DispatchError::not_enabled("x").to_string(),
            "Action \"x\" not enabled"
        );
        assert_eq!(
            DispatchError::handler_failure("x", "boom").to_string(),
            "boom"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(DispatchError::NoBody.status(), 400);
        assert_eq!(DispatchError::not_enabled("x").status(), 400);
        assert_eq!(DispatchError::handler_failure("x", "boom").status(), 500);
        assert_eq!(
            DispatchError::StoreInit {
                message: "down".into()
            }
            .status(),
            500
        );
    }

    #[test]
    fn test_into_response() {
        let resp = DispatchError::unknown_action("missing").into_response();
        assert_eq!(resp.status, 400);
        assert_eq!(resp.envelope.error(), Some("Unknown action \"missing\""));
    }
}
