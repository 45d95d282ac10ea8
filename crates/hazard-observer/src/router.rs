//! Axum router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::operator;
use crate::state::AppState;
use crate::ws;

/// Build the complete router.
///
/// CORS allows any origin so browser dashboards on other hosts can
/// connect.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        // Ingestion and queries
        .route("/ingest", post(handlers::ingest))
        .route("/events", get(handlers::list_events))
        .route("/api/status", get(handlers::status))
        // WebSockets
        .route("/ws/monitor", get(ws::ws_monitor))
        .route("/ws/authority", get(ws::ws_authority))
        .route("/ws/civilian", get(ws::ws_civilian))
        .route("/ws/simulation", get(ws::ws_simulation))
        // Operator
        .route("/api/operator/pause", post(operator::pause))
        .route("/api/operator/resume", post(operator::resume))
        .route("/api/operator/speed", post(operator::set_speed))
        .route("/api/operator/stop", post(operator::stop))
        .route("/api/operator/status", get(operator::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
