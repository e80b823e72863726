//! # schemareg-api: HTTP Surface for the Schema Registry
//!
//! Clients upload JSON Schemas under write-once identifiers, fetch them back
//! verbatim, and validate documents against them. Every JSON response uses
//! the fixed [`Envelope`].
//!
//! ## API Surface
//!
//! | Path              | Methods                     | Module               |
//! |-------------------|-----------------------------|----------------------|
//! | `/schema/{id}`    | GET, HEAD, POST, OPTIONS    | [`routes::schema`]   |
//! | `/validate/{id}`  | POST, OPTIONS               | [`routes::validate`] |
//! | anything else     | 404 `Unknown Endpoint`      | [`routes::unknown_endpoint`] |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → DefaultBodyLimit → Handler
//! ```
//!
//! Prometheus exposition lives on a separate listener owned by the binary,
//! so `/metrics` on this router is an unknown endpoint like any other path.

pub mod config;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use envelope::{Action, Envelope, Status};
pub use error::AppError;
pub use state::AppState;

/// Build the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    routes::router()
        .fallback(routes::unknown_endpoint)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
