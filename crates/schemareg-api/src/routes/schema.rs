//! # Schema Resource
//!
//! `/schema/{id}`:
//!
//! - `GET`/`HEAD`: stored bytes verbatim, `application/schema+json`.
//! - `POST`: upload; 201 on success. Identifiers are write-once.
//! - `OPTIONS`: 204 with `Allow` reflecting whether the id is taken.
//! - anything else: 405 with the same `Allow`.

use axum::body::{Body, Bytes};
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use schemareg_core::SchemaId;

use crate::envelope::{Action, Envelope};
use crate::error::{no_content_allow, AppError, ALLOW_POST, ALLOW_READ};
use crate::middleware::metrics::{record_upload, set_schema_count};
use crate::routes::resolve_id;
use crate::state::AppState;

pub const SCHEMA_CONTENT_TYPE: &str = "application/schema+json";

const ACTION: Action = Action::UploadSchema;

/// ANY /schema/{id}
pub async fn schema_resource(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let id = match resolve_id(ACTION, "/schema/", path, &uri) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match method {
        Method::GET | Method::HEAD => retrieve(&state, id, method == Method::HEAD).await,
        Method::POST => upload(&state, id, body).await,
        _ => {
            let allow = match allow_for(&state, &id).await {
                Ok(allow) => allow,
                Err(e) => return e.into_envelope(ACTION, id.as_str()),
            };
            if method == Method::OPTIONS {
                no_content_allow(allow)
            } else {
                AppError::MethodNotAllowed { allow }.into_envelope(ACTION, id.as_str())
            }
        }
    }
}

/// Read-only once taken, creatable otherwise.
async fn allow_for(state: &AppState, id: &SchemaId) -> Result<&'static str, AppError> {
    let id = id.clone();
    let exists = state.with_store(move |store| store.has(&id)).await?;
    Ok(if exists { ALLOW_READ } else { ALLOW_POST })
}

async fn retrieve(state: &AppState, id: SchemaId, head: bool) -> Response {
    let lookup = id.clone();
    let bytes = match state.with_store(move |store| store.get(&lookup)).await {
        Ok(Ok(Some(bytes))) => bytes,
        Ok(Ok(None)) => return AppError::UnknownId.into_envelope(ACTION, id.as_str()),
        Ok(Err(e)) => return AppError::from(e).into_envelope(ACTION, id.as_str()),
        Err(e) => return e.into_envelope(ACTION, id.as_str()),
    };

    let length = HeaderValue::from(bytes.len());
    let body = if head { Body::empty() } else { Body::from(bytes) };
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(SCHEMA_CONTENT_TYPE)),
            (header::CONTENT_LENGTH, length),
        ],
        body,
    )
        .into_response()
}

async fn upload(state: &AppState, id: SchemaId, body: Result<Bytes, BytesRejection>) -> Response {
    let result = match body {
        Ok(body) => {
            let target = id.clone();
            state
                .with_store(move |store| {
                    store
                        .upload(&target, &body)
                        .map(|()| store.len())
                        .map_err(AppError::from)
                })
                .await
                .and_then(|r| r)
        }
        // Write-once outranks an unreadable body.
        Err(_) if state.store.has(&id) => Err(AppError::IdExists),
        Err(rejection) => Err(AppError::from(rejection)),
    };

    match result {
        Ok(count) => {
            record_upload("created");
            set_schema_count(count);
            Envelope::success(ACTION, id.as_str()).with_status(StatusCode::CREATED)
        }
        Err(e) => {
            tracing::debug!(id = %id, error = %e, "upload rejected");
            record_upload(e.outcome());
            e.into_envelope(ACTION, id.as_str())
        }
    }
}
