//! # API Error Types
//!
//! Request-level failures and their HTTP mapping. Every error renders as an
//! [`Envelope`] with `status: "error"`; the envelope needs the action and
//! identifier of the request, so rendering goes through
//! [`AppError::into_envelope`] rather than a bare `IntoResponse`.
//!
//! Internal error details are logged, never returned to clients.

use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use schemareg_schema::RegistryError;
use thiserror::Error;

use crate::envelope::{Action, Envelope};

/// `Allow` value for a schema resource that exists (read-only).
pub const ALLOW_READ: &str = "OPTIONS, GET, HEAD";
/// `Allow` value for a schema resource that can still be created, and for
/// every existing validation resource.
pub const ALLOW_POST: &str = "OPTIONS, POST";

/// Application-level error. `Display` is the client-facing message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Identifier contains characters outside `[A-Za-z0-9_-]` (400).
    #[error("Invalid ID")]
    InvalidId,

    /// Body is not JSON (400).
    #[error("Invalid JSON")]
    InvalidJson,

    /// Schema failed to compile; carries the compiler message (400).
    #[error("{0}")]
    Compile(String),

    /// Upload to an identifier that is already taken (405).
    #[error("ID Exists")]
    IdExists,

    /// No schema under the identifier (404).
    #[error("Unknown ID")]
    UnknownId,

    /// Method not supported on the resource (405).
    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },

    /// The request body could not be read, e.g. over the size limit.
    #[error("{message}")]
    Body { status: StatusCode, message: String },

    /// Anything else (500). The detail is logged only.
    #[error("Unexpected Error")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidJson | Self::Compile(_) => StatusCode::BAD_REQUEST,
            Self::IdExists | Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnknownId => StatusCode::NOT_FOUND,
            Self::Body { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `Allow` header to send with this error, if any.
    fn allow(&self) -> Option<&'static str> {
        match self {
            Self::IdExists => Some(ALLOW_READ),
            Self::MethodNotAllowed { allow } => Some(allow),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::InvalidJson => "invalid_json",
            Self::Compile(_) => "compile_error",
            Self::IdExists => "id_exists",
            Self::UnknownId => "unknown_id",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::Body { .. } => "bad_body",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Render as an error envelope for `action` on `id`.
    pub fn into_envelope(self, action: Action, id: &str) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(action = action.as_str(), id, error = %detail, "internal server error");
        }

        let status = self.status();
        let allow = self.allow();
        let mut response = Envelope::error(action, id, self.to_string()).with_status(status);
        if let Some(allow) = allow {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::IdExists(_) => Self::IdExists,
            RegistryError::UnknownId(_) => Self::UnknownId,
            RegistryError::InvalidJson(_) => Self::InvalidJson,
            RegistryError::Compile(e) => Self::Compile(e.to_string()),
            other @ (RegistryError::Persist { .. } | RegistryError::Read { .. }) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        Self::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Respond `204 No Content` with an `Allow` header.
pub(crate) fn no_content_allow(allow: &'static str) -> Response {
    (
        StatusCode::NO_CONTENT,
        [(header::ALLOW, HeaderValue::from_static(allow))],
    )
        .into_response()
}
