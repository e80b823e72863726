//! # Validation Resource
//!
//! `/validate/{id}`. Every method on an unknown id is 404; on a known id,
//! `POST` validates the body, `OPTIONS` answers 204, the rest 405.
//! Non-conformance is still a 200: the envelope's `status` carries the
//! verdict and `message` the violation list.

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;
use schemareg_core::SchemaId;
use schemareg_schema::Validation;

use crate::envelope::{Action, Envelope};
use crate::error::{no_content_allow, AppError, ALLOW_POST};
use crate::middleware::metrics::record_validation;
use crate::routes::resolve_id;
use crate::state::AppState;

const ACTION: Action = Action::ValidateDocument;

/// ANY /validate/{id}
pub async fn validate_resource(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let id = match resolve_id(ACTION, "/validate/", path, &uri) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let lookup = id.clone();
    match state.with_store(move |store| store.has(&lookup)).await {
        Ok(true) => {}
        Ok(false) => {
            if method == Method::POST {
                record_validation(AppError::UnknownId.outcome());
            }
            return AppError::UnknownId.into_envelope(ACTION, id.as_str());
        }
        Err(e) => return e.into_envelope(ACTION, id.as_str()),
    }

    match method {
        Method::POST => validate(&state, id, body).await,
        Method::OPTIONS => no_content_allow(ALLOW_POST),
        _ => AppError::MethodNotAllowed { allow: ALLOW_POST }.into_envelope(ACTION, id.as_str()),
    }
}

async fn validate(state: &AppState, id: SchemaId, body: Result<Bytes, BytesRejection>) -> Response {
    let result = match body {
        Ok(body) => {
            let target = id.clone();
            state
                .with_store(move |store| store.validate(&target, &body).map_err(AppError::from))
                .await
                .and_then(|r| r)
        }
        Err(rejection) => Err(AppError::from(rejection)),
    };

    match result {
        Ok(Validation::Valid) => {
            record_validation("valid");
            Envelope::success(ACTION, id.as_str()).with_status(StatusCode::OK)
        }
        Ok(Validation::Invalid(violations)) => {
            tracing::debug!(id = %id, violations = violations.len(), "document does not conform");
            record_validation("invalid");
            Envelope::error(ACTION, id.as_str(), violations.to_string()).with_status(StatusCode::OK)
        }
        Err(e) => {
            record_validation(e.outcome());
            e.into_envelope(ACTION, id.as_str())
        }
    }
}
