// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::{broadcast, watch};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::models::DashboardView;
use crate::registry::RegistryClient;
use crate::worker::TrackerHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) tracker: TrackerHandle,
    pub(crate) view_rx: watch::Receiver<DashboardView>,
    pub(crate) updates_tx: broadcast::Sender<DashboardView>,
    pub(crate) registry: Arc<RegistryClient>,
    pub(crate) ws_dashboard_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app(
    tracker: TrackerHandle,
    view_rx: watch::Receiver<DashboardView>,
    updates_tx: broadcast::Sender<DashboardView>,
    registry: Arc<RegistryClient>,
    ws_dashboard_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        tracker,
        view_rx,
        updates_tx,
        registry,
        ws_dashboard_connections,
        config,
    };
    Router::new()
        .route("/", get(|| async { "Stat-Pac: live package download tracker" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/info", get(http::api_info_handler)) // GET /api/info
        .route("/api/track", post(http::track_handler)) // POST /api/track
        .route("/api/state", get(http::state_handler)) // GET /api/state
        .route("/api/versions", get(http::versions_handler)) // GET /api/versions
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
