//! # Request Metrics
//!
//! HTTP-level metrics (request count, latency) are recorded in
//! [`metrics_middleware`]. Registry-level metrics (upload and validation
//! outcomes, schema count) are recorded by the handlers.
//!
//! All names are described once by [`describe_metrics`]; the binary calls it
//! after installing the Prometheus exporter.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

pub struct Metric {
    pub name: &'static str,
    description: &'static str,
}

pub const HTTP_REQUESTS_TOTAL: Metric = Metric {
    name: "schemareg_http_requests_total",
    description: "Total HTTP requests by method, endpoint and status",
};

pub const HTTP_REQUEST_DURATION_SECONDS: Metric = Metric {
    name: "schemareg_http_request_duration_seconds",
    description: "HTTP request duration in seconds",
};

pub const SCHEMA_UPLOADS_TOTAL: Metric = Metric {
    name: "schemareg_schema_uploads_total",
    description: "Schema upload attempts by outcome",
};

pub const DOCUMENT_VALIDATIONS_TOTAL: Metric = Metric {
    name: "schemareg_document_validations_total",
    description: "Document validations by outcome (valid, invalid, or an error label)",
};

pub const SCHEMAS: Metric = Metric {
    name: "schemareg_schemas",
    description: "Number of schemas in the registry",
};

/// Register descriptions with the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL.name, HTTP_REQUESTS_TOTAL.description);
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS.name,
        metrics::Unit::Seconds,
        HTTP_REQUEST_DURATION_SECONDS.description
    );
    metrics::describe_counter!(SCHEMA_UPLOADS_TOTAL.name, SCHEMA_UPLOADS_TOTAL.description);
    metrics::describe_counter!(
        DOCUMENT_VALIDATIONS_TOTAL.name,
        DOCUMENT_VALIDATIONS_TOTAL.description
    );
    metrics::describe_gauge!(SCHEMAS.name, SCHEMAS.description);
}

/// Collapse a request path to its endpoint family so identifiers never
/// become label values.
pub fn endpoint_label(path: &str) -> &'static str {
    if path.starts_with("/schema/") {
        "schema"
    } else if path.starts_with("/validate/") {
        "validate"
    } else {
        "other"
    }
}

pub fn record_upload(outcome: &'static str) {
    metrics::counter!(SCHEMA_UPLOADS_TOTAL.name, "outcome" => outcome).increment(1);
}

pub fn record_validation(outcome: &'static str) {
    metrics::counter!(DOCUMENT_VALIDATIONS_TOTAL.name, "outcome" => outcome).increment(1);
}

pub fn set_schema_count(count: usize) {
    metrics::gauge!(SCHEMAS.name).set(count as f64);
}

/// Axum middleware that records request count and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = endpoint_label(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::histogram!(
        HTTP_REQUEST_DURATION_SECONDS.name,
        "method" => method.clone(),
        "endpoint" => endpoint
    )
    .record(start.elapsed().as_secs_f64());
    metrics::counter!(
        HTTP_REQUESTS_TOTAL.name,
        "method" => method,
        "endpoint" => endpoint,
        "status" => status
    )
    .increment(1);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_labels() {
        assert_eq!(endpoint_label("/schema/TEST"), "schema");
        assert_eq!(endpoint_label("/validate/TEST"), "validate");
        assert_eq!(endpoint_label("/schema"), "other");
        assert_eq!(endpoint_label("/"), "other");
        assert_eq!(endpoint_label("/metrics"), "other");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        describe_metrics();
        record_upload("created");
        record_validation("valid");
        set_schema_count(3);
    }
}
