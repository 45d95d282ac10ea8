//! Operator REST API handlers for runtime simulation control.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/operator/pause` | Pause the cycle loop |
//! | `POST` | `/api/operator/resume` | Resume the cycle loop |
//! | `POST` | `/api/operator/speed` | Set cycle interval (ms) |
//! | `GET` | `/api/operator/status` | Current simulation status |
//! | `POST` | `/api/operator/stop` | Stop the simulation |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use hazard_sim::operator::{MIN_TICK_INTERVAL_MS, OperatorState};
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Request body for `POST /api/operator/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New cycle interval in milliseconds (minimum 100).
    pub tick_interval_ms: u64,
}

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct OperatorResponse {
    ok: bool,
    message: String,
}

fn operator(state: &AppState) -> Result<&Arc<OperatorState>, ObserverError> {
    state
        .operator_state
        .as_ref()
        .ok_or(ObserverError::OperatorUnavailable)
}

/// Pause the cycle loop.
pub async fn pause(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.pause();
    info!("Operator paused simulation");
    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation paused".to_owned(),
    }))
}

/// Resume the cycle loop after a pause.
pub async fn resume(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.resume();
    info!("Operator resumed simulation");
    Ok(Json(OperatorResponse {
        ok: true,
        message: "Simulation resumed".to_owned(),
    }))
}

/// Change the cycle interval at runtime.
///
/// Takes effect at the next inter-cycle sleep.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let prev = operator(&state)?
        .set_tick_interval_ms(body.tick_interval_ms)
        .ok_or_else(|| {
            ObserverError::InvalidRequest(format!(
                "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}"
            ))
        })?;

    info!(from = prev, to = body.tick_interval_ms, "Operator changed cycle interval");
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Cycle interval changed from {prev}ms to {}ms", body.tick_interval_ms),
        "previous_interval_ms": prev,
        "new_interval_ms": body.tick_interval_ms,
    })))
}

/// Current simulation status.
pub async fn status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    Ok(Json(operator(&state)?.status().await))
}

/// Stop the simulation.
///
/// The loop finishes its current cycle and exits; the HTTP server keeps
/// running until the process shuts down.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    operator(&state)?.request_stop();
    info!("Operator requested stop");
    Ok(Json(OperatorResponse {
        ok: true,
        message: "Stop requested -- simulation will end after current cycle".to_owned(),
    }))
}
