// GET/POST handlers: version, info, track, state, versions

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::aggregator::WINDOW_CAPACITY;
use crate::registry::RegistryError;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/info: static settings the dashboard needs once (window size, upstream).
pub(super) async fn api_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "windowCapacity": WINDOW_CAPACITY,
        "upstream": state.config.upstream.url,
        "registry": state.config.registry.base_url,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct TrackBody {
    #[serde(default)]
    name: String,
}

/// POST /api/track: starts a new session; blank names are rejected without touching state.
pub(super) async fn track_handler(
    State(state): State<AppState>,
    Json(body): Json<TrackBody>,
) -> Response {
    match state.tracker.track(&body.name).await {
        Ok(Some(session)) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "session": session, "name": body.name.trim() })),
        )
            .into_response(),
        Ok(None) => error_response(StatusCode::BAD_REQUEST, "package name must be non-empty"),
        Err(e) => {
            tracing::warn!(error = %e, operation = "track", "track request failed");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "tracker unavailable")
        }
    }
}

/// GET /api/state: current windows, derived metrics and latest snapshot.
pub(super) async fn state_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.view_rx.borrow().clone();
    Json(view)
}

#[derive(Debug, Deserialize)]
pub(super) struct VersionsQuery {
    name: Option<String>,
}

/// GET /api/versions: version history for `?name=` or the tracked package.
pub(super) async fn versions_handler(
    State(state): State<AppState>,
    Query(query): Query<VersionsQuery>,
) -> Response {
    let name = query
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| state.view_rx.borrow().package.clone());
    let Some(name) = name else {
        return error_response(StatusCode::BAD_REQUEST, "no package tracked");
    };
    match state.registry.fetch(&name).await {
        Ok(document) => Json(document.into_history()).into_response(),
        Err(RegistryError::NotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, "Package not found")
        }
        Err(RegistryError::InvalidName) => {
            error_response(StatusCode::BAD_REQUEST, "invalid package name")
        }
        Err(e) => {
            tracing::warn!(error = %e, package = %name, "registry lookup failed");
            error_response(StatusCode::BAD_GATEWAY, "registry lookup failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
