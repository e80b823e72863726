//! # Route Modules
//!
//! Two resource families, each a single wildcard route whose handler
//! dispatches on the method itself so that `Allow` and 404-before-405
//! ordering follow the registry's rules rather than axum's defaults.
//!
//! - [`schema`]: `/schema/{id}` (retrieve, upload, OPTIONS)
//! - [`validate`]: `/validate/{id}` (validate, OPTIONS)

pub mod schema;
pub mod validate;

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use schemareg_core::SchemaId;

use crate::envelope::{Action, Envelope};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schema/{*id}", any(schema::schema_resource))
        .route("/validate/{*id}", any(validate::validate_resource))
}

/// Fallback for every path outside the two resource families.
pub async fn unknown_endpoint() -> Response {
    Envelope::unknown_endpoint().with_status(StatusCode::NOT_FOUND)
}

/// Turn the captured trailing segment into a [`SchemaId`].
///
/// An empty identifier is not an endpoint (404). Anything else that fails
/// to parse, including captures that are not valid percent-encoded UTF-8,
/// is an `Invalid ID` envelope echoing the identifier as received.
pub(crate) fn resolve_id(
    action: Action,
    prefix: &str,
    path: Result<Path<String>, PathRejection>,
    uri: &Uri,
) -> Result<SchemaId, Response> {
    let raw = match path {
        Ok(Path(id)) => id,
        Err(_) => uri
            .path()
            .strip_prefix(prefix)
            .unwrap_or_default()
            .to_string(),
    };

    if raw.is_empty() {
        return Err(Envelope::unknown_endpoint().with_status(StatusCode::NOT_FOUND));
    }
    SchemaId::parse(raw.as_str()).map_err(|_| AppError::InvalidId.into_envelope(action, &raw))
}
