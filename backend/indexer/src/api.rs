//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::Result;
use crate::events::EventRecord;
use crate::rpc;

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

/// All routes, without the HTTP middleware layers added in `main`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/projects/:id/events", get(get_project_events))
        .route("/beneficiaries/:hash/events", get(get_beneficiary_events))
        .route("/actors/:address/events", get(get_actor_events))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    /// The project id, beneficiary hash or address the list is keyed on.
    pub key: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub event_type: Option<String>,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

fn keyed(key: String, result: Result<Vec<EventRecord>>) -> Response {
    match result {
        Ok(events) => {
            let count = events.len();
            (StatusCode::OK, Json(EventsResponse { key, count, events })).into_response()
        }
        Err(e) => {
            error!("Event query failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events[?event_type=token_issued]`
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Response {
    match db::get_events(&state.pool, query.event_type.as_deref()).await {
        Ok(events) => {
            let count = events.len();
            (StatusCode::OK, Json(AllEventsResponse { count, events })).into_response()
        }
        Err(e) => {
            error!("Event query failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// `GET /projects/:id/events`
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Response {
    let result = db::get_events_for_project(&state.pool, &project_id).await;
    keyed(project_id, result)
}

/// `GET /beneficiaries/:hash/events`
///
/// `hash` is the 32-byte phone hash in hex, as returned by `hash_phone`.
pub async fn get_beneficiary_events(
    State(state): State<Arc<ApiState>>,
    Path(hash): Path<String>,
) -> Response {
    let Some(hash) = rpc::normalize_hash(&hash) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "beneficiary must be a 32-byte hex hash".to_string(),
        );
    };
    let result = db::get_events_for_beneficiary(&state.pool, &hash).await;
    keyed(hash, result)
}

/// `GET /actors/:address/events`
pub async fn get_actor_events(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> Response {
    let result = db::get_events_for_actor(&state.pool, &address).await;
    keyed(address, result)
}
