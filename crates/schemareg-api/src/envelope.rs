//! # Response Envelope
//!
//! Every JSON response body has the same shape:
//!
//! ```json
//! {"action": "uploadSchema", "id": "TEST", "status": "error", "message": "Invalid JSON"}
//! ```
//!
//! `message` is omitted on success. The unknown-endpoint response carries
//! neither `action` nor `id`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Which resource family a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "uploadSchema")]
    UploadSchema,
    #[serde(rename = "validateDocument")]
    ValidateDocument,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UploadSchema => "uploadSchema",
            Self::ValidateDocument => "validateDocument",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The fixed response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn success(action: Action, id: impl Into<String>) -> Self {
        Self {
            action: Some(action),
            id: Some(id.into()),
            status: Status::Success,
            message: None,
        }
    }

    pub fn error(action: Action, id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action: Some(action),
            id: Some(id.into()),
            status: Status::Error,
            message: Some(message.into()),
        }
    }

    /// Body for requests outside `/schema/*` and `/validate/*`.
    pub fn unknown_endpoint() -> Self {
        Self {
            action: None,
            id: None,
            status: Status::Error,
            message: Some("Unknown Endpoint".to_string()),
        }
    }

    /// Pair the envelope with a status code; `Content-Type: application/json`.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_message() {
        let json = serde_json::to_string(&Envelope::success(Action::UploadSchema, "TEST")).unwrap();
        assert_eq!(json, r#"{"action":"uploadSchema","id":"TEST","status":"success"}"#);
    }

    #[test]
    fn error_carries_message() {
        let env = Envelope::error(Action::ValidateDocument, "X", "Unknown ID");
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(
            json,
            r#"{"action":"validateDocument","id":"X","status":"error","message":"Unknown ID"}"#
        );
    }

    #[test]
    fn unknown_endpoint_shape() {
        let json = serde_json::to_string(&Envelope::unknown_endpoint()).unwrap();
        assert_eq!(json, r#"{"status":"error","message":"Unknown Endpoint"}"#);
    }

    #[test]
    fn parses_back() {
        let env: Envelope =
            serde_json::from_str(r#"{"action":"uploadSchema","id":"A","status":"success"}"#).unwrap();
        assert_eq!(env, Envelope::success(Action::UploadSchema, "A"));
    }
}
