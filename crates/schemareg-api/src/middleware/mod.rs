//! # Middleware Stack
//!
//! - [`metrics`]: request counters and latency histograms recorded through
//!   the `metrics` facade. Without an installed recorder they are no-ops.
//!
//! Request tracing uses `tower_http::trace::TraceLayer` directly in
//! [`crate::app`].

pub mod metrics;
