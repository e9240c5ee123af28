//! ---
//! applog_section: "03-persistence-logging"
//! applog_subsection: "module"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "Metrics collection and export utilities."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---
use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder, TEXT_FORMAT};
use tracing::error;

/// Shared registry type used across the service.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

const ATTEMPT_SUCCESS: &str = "success";
const ATTEMPT_FAIL: &str = "fail";

/// Request-level metrics published by the HTTP surface.
///
/// Counters are prometheus primitives and safe for concurrent increment;
/// recording is a side effect only and never feeds back into request
/// handling.
#[derive(Clone)]
pub struct HttpMetrics {
    registry: SharedRegistry,
    log_requests: IntCounterVec,
    log_attempts: IntCounterVec,
    request_duration: HistogramVec,
}

impl HttpMetrics {
    /// Register all request metrics with the provided registry.
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let log_requests = IntCounterVec::new(
            Opts::new(
                "app_log_requests_total",
                "Total number of /log requests by HTTP method",
            ),
            &["method"],
        )?;
        registry.register(Box::new(log_requests.clone()))?;

        let log_attempts = IntCounterVec::new(
            Opts::new(
                "app_log_attempts_total",
                "Total number of logging attempts by outcome",
            ),
            &["status"],
        )?;
        registry.register(Box::new(log_attempts.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "app_request_duration_seconds",
                "Histogram of request duration by path and method",
            ),
            &["path", "method"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            log_requests,
            log_attempts,
            request_duration,
        })
    }

    /// Return the backing registry for scrape plumbing.
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Count one `/log` request for the given HTTP method.
    pub fn inc_log_request(&self, method: &str) {
        self.log_requests.with_label_values(&[method]).inc();
    }

    /// Count one append attempt that committed a record.
    pub fn record_attempt_success(&self) {
        self.log_attempts.with_label_values(&[ATTEMPT_SUCCESS]).inc();
    }

    /// Count one append attempt that failed (bad body or storage error).
    pub fn record_attempt_failure(&self) {
        self.log_attempts.with_label_values(&[ATTEMPT_FAIL]).inc();
    }

    /// Observe one request's wall-clock duration.
    pub fn observe_request_duration(&self, path: &str, method: &str, seconds: f64) {
        self.request_duration
            .with_label_values(&[path, method])
            .observe(seconds);
    }
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics").finish_non_exhaustive()
    }
}

/// Encode the registry contents in the prometheus text exposition format.
pub fn render(registry: &Registry) -> prometheus::Result<String> {
    let families = registry.gather();
    TextEncoder::new().encode_to_string(&families)
}

/// Prometheus scrape endpoint handler.
pub async fn metrics_handler(registry: SharedRegistry) -> impl IntoResponse {
    match render(&registry) {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(TEXT_FORMAT),
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("metrics encoding error"),
            )
                .into_response()
        }
    }
}

pub use prometheus;
