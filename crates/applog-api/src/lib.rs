//! ---
//! applog_section: "05-networking-external-interfaces"
//! applog_subsection: "module"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "HTTP surface for log intake and retrieval."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use applog_common::AppConfig;
use applog_metrics::{metrics_handler, HttpMetrics};
use applog_store::LogStore;
use axum::body::Bytes;
use axum::extract::{MatchedPath, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Shared API state exposed to handlers.
#[derive(Debug)]
pub struct ApiState {
    welcome_message: String,
    store: LogStore,
    metrics: HttpMetrics,
}

impl ApiState {
    pub fn new(config: &AppConfig, store: LogStore, metrics: HttpMetrics) -> Self {
        Self {
            welcome_message: config.welcome_message.clone(),
            store,
            metrics,
        }
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn metrics(&self) -> &HttpMetrics {
        &self.metrics
    }
}

/// Incoming payload for `POST /log`.
///
/// A missing `message` field is treated as the empty message; the field must
/// otherwise be a JSON string.
#[derive(Debug, Deserialize)]
pub struct LogMessage {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ServiceStatus {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct LogCreated {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Build the service router with all routes instrumented for duration.
pub fn router(state: Arc<ApiState>) -> Router {
    let registry = state.metrics.registry();
    Router::new()
        .route("/", get(get_welcome))
        .route("/status", get(get_status))
        .route("/log", any(create_log))
        .route("/logs", get(get_logs))
        .route(
            "/metrics",
            get({
                let registry = registry.clone();
                move || metrics_handler(registry.clone())
            }),
        )
        .layer(middleware::from_fn_with_state(state.clone(), track_duration))
        .with_state(state)
}

/// Observe wall-clock duration for every request, labelled by the matched
/// route template and method. Runs exactly once per request regardless of
/// outcome.
async fn track_duration(
    State(state): State<Arc<ApiState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let method = request.method().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    state
        .metrics
        .observe_request_duration(&path, method.as_str(), start.elapsed().as_secs_f64());
    response
}

async fn get_welcome(State(state): State<Arc<ApiState>>) -> String {
    state.welcome_message.clone()
}

async fn get_status() -> Json<ServiceStatus> {
    Json(ServiceStatus { status: "ok" })
}

/// Accept one log message and append it to the store.
///
/// The method check lives inside the handler so the per-method request
/// counter also observes rejected methods.
async fn create_log(
    State(state): State<Arc<ApiState>>,
    method: Method,
    body: Bytes,
) -> Result<(StatusCode, Json<LogCreated>), ApiError> {
    state.metrics.inc_log_request(method.as_str());

    if method != Method::POST {
        return Err(ApiError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed",
        ));
    }

    let payload: LogMessage = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            state.metrics.record_attempt_failure();
            debug!(error = %err, "rejected malformed log body");
            return Err(ApiError::new(StatusCode::BAD_REQUEST, "invalid request body"));
        }
    };

    match state.store.append(&payload.message) {
        Ok(()) => {
            state.metrics.record_attempt_success();
            Ok((StatusCode::CREATED, Json(LogCreated {
                status: "log created",
            })))
        }
        Err(err) => {
            state.metrics.record_attempt_failure();
            error!(error = %err, path = %state.store.path().display(), "failed to append log record");
            Err(ApiError::internal())
        }
    }
}

async fn get_logs(State(state): State<Arc<ApiState>>) -> Result<String, ApiError> {
    state.store.read_all().map_err(|err| {
        error!(error = %err, path = %state.store.path().display(), "failed to read log file");
        ApiError::internal()
    })
}

/// Handle to the running API server.
#[derive(Debug)]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    /// Return the bound address; with port 0 this is the assigned port.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Spawn the HTTP server for the given state.
pub fn spawn_api_server(state: Arc<ApiState>, addr: SocketAddr) -> Result<ApiServer> {
    let app = router(state);

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind listener {addr}"))?;
    std_listener
        .set_nonblocking(true)
        .context("failed to configure listener as non-blocking")?;
    let local_addr = std_listener
        .local_addr()
        .context("failed to resolve bound listener address")?;
    let listener = TcpListener::from_std(std_listener)
        .context("failed to convert std listener into tokio listener")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let service = app.into_make_service();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %local_addr, "api server listening");
        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("api server encountered an error")?;
        Ok(())
    });

    Ok(ApiServer {
        addr: local_addr,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}
