//! # HTTP surface
//!
//! This module defines the `ApiServer`, an `axum`-based web server exposing
//! the three endpoints plugins and the dashboard talk to:
//!
//! * `POST /api/log` — ingest one event envelope.
//! * `GET /api/alerts` — filtered, paginated query over the live store.
//! * `GET /api/health` — liveness probe, no side effects.
//!
//! Callers only ever see the two fixed JSON shapes for ingestion: a 200
//! `{"result":"success"}` or a 400 `{"result":"error","error":"Missing
//! required fields"}`. Sink-level failures never change the response.
//!
//! The server is designed for graceful shutdown, listening to a signal from
//! the main application to stop serving requests and terminate cleanly.

use crate::dispatch::Dispatcher;
use crate::store::{AlertFilter, AlertStore};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, trace};

/// Shared state injected into every handler. The store and dispatcher are
/// explicit references handed in at startup; there is no global singleton.
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
    pub store: Arc<AlertStore>,
    pub default_page_size: usize,
}

/// Builds the application router. Exposed separately from [`ApiServer`] so
/// tests can drive the handlers without a socket.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/log", post(ingest))
        .route("/api/alerts", get(query_alerts))
        .with_state(state)
}

/// The ingestion/query server.
pub struct ApiServer {
    listener: TcpListener,
    state: ApiState,
    shutdown_rx: watch::Receiver<bool>,
}

impl ApiServer {
    /// Creates a new `ApiServer` but does not spawn it.
    ///
    /// # Arguments
    ///
    /// * `listener` - A `TcpListener` that has already been bound to an address.
    /// * `state` - The shared handler state.
    /// * `shutdown_rx` - A watch channel receiver for graceful shutdown.
    pub fn new(
        listener: TcpListener,
        state: ApiState,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            listener,
            state,
            shutdown_rx,
        }
    }

    /// Returns a future that runs the server until a shutdown signal is
    /// received.
    pub fn run(mut self) -> impl Future<Output = ()> {
        let app = router(self.state);

        async move {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.changed() => {
                    trace!("API server received shutdown signal via select.");
                }
                result = axum::serve(self.listener, app.into_make_service()) => {
                    if let Err(e) = result {
                        error!("API server error: {}", e);
                    }
                }
            }
            trace!("API server task finished.");
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<ApiState>,
    payload: Result<Json<crate::envelope::EventEnvelope>, JsonRejection>,
) -> impl IntoResponse {
    let Ok(Json(envelope)) = payload else {
        // A body that is not a JSON object cannot carry the required
        // fields; collapse it into the same caller-visible shape.
        debug!("rejecting unparseable ingest body");
        return validation_failure();
    };

    match state.dispatcher.dispatch(envelope).await {
        Ok(_outcome) => (StatusCode::OK, Json(json!({ "result": "success" }))),
        Err(_) => validation_failure(),
    }
}

fn validation_failure() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "result": "error",
            "error": "Missing required fields"
        })),
    )
}

/// Query parameters for `GET /api/alerts`. All filter criteria default to
/// empty strings, which match everything.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertQueryParams {
    pub search: String,
    /// Truthy values: `1`, `true`, `yes`, `on` (case-insensitive). When
    /// truthy and `group` is empty, the filter is forced to
    /// `group=service`.
    pub system_only: String,
    pub source: String,
    pub group: String,
    pub category: String,
    pub alert_type: String,
    pub severity: String,
    pub page_size: Option<usize>,
    pub page: Option<usize>,
}

impl Default for AlertQueryParams {
    fn default() -> Self {
        Self {
            search: String::new(),
            system_only: String::new(),
            source: String::new(),
            group: String::new(),
            category: String::new(),
            alert_type: String::new(),
            severity: String::new(),
            page_size: None,
            page: None,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

async fn query_alerts(
    State(state): State<ApiState>,
    Query(params): Query<AlertQueryParams>,
) -> Json<serde_json::Value> {
    let mut group = params.group;
    if group.is_empty() && is_truthy(&params.system_only) {
        group = "service".to_string();
    }

    let filter = AlertFilter {
        search: params.search,
        source: params.source,
        group,
        category: params.category,
        alert_type: params.alert_type,
        severity: params.severity,
    };

    let page_size = params
        .page_size
        .unwrap_or(state.default_page_size)
        .max(1);
    let page_number = params.page.unwrap_or(1).max(1);

    let total = state.store.count(&filter);
    let total_pages = total.div_ceil(page_size);
    let offset = (page_number - 1).saturating_mul(page_size);
    // A page past the end yields an empty list, not an error.
    let alerts = state.store.query(&filter, offset, page_size);

    Json(json!({
        "result": "success",
        "alerts": alerts,
        "page_size": page_size,
        "total_pages": total_pages,
        "page_number": page_number,
        "total_logs": total,
    }))
}
