//! `WebSocket` handlers.
//!
//! - `GET /ws/{monitor,authority,civilian}` registers the connection as a
//!   subscriber of that tier for its lifetime. Inbound text is treated as
//!   a liveness signal and ignored.
//! - `GET /ws/simulation` streams [`CycleBroadcast`] summaries. Lagging
//!   clients skip ahead.
//!
//! [`CycleBroadcast`]: crate::state::CycleBroadcast

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use hazard_types::Tier;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{AppState, SUBSCRIBER_BUFFER};

/// `GET /ws/monitor`
pub async fn ws_monitor(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_tier(socket, state, Tier::Monitor))
}

/// `GET /ws/authority`
pub async fn ws_authority(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_tier(socket, state, Tier::Authority))
}

/// `GET /ws/civilian`
pub async fn ws_civilian(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_tier(socket, state, Tier::Civilian))
}

/// `GET /ws/simulation`
pub async fn ws_simulation(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_simulation(socket, state))
}

/// Forward tier payloads until either side goes away, then unregister.
async fn handle_tier(mut socket: WebSocket, state: Arc<AppState>, tier: Tier) {
    let group = Arc::clone(state.dispatcher.groups().get(tier));
    let (id, mut rx) = group.subscribe(SUBSCRIBER_BUFFER).await;
    info!(tier = tier.as_str(), subscriber = %id, "Subscriber connected");

    loop {
        tokio::select! {
            payload = rx.recv() => {
                // None: the group pruned this subscriber.
                let Some(payload) = payload else { break };
                let json = match serde_json::to_string(&payload) {
                    Ok(j) => j,
                    Err(e) => {
                        warn!("Failed to serialize alert payload: {e}");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(subscriber = %id, "Send failed");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        break;
                    }
                    // Keep-alive text and anything else.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    group.remove(id).await;
    info!(tier = tier.as_str(), subscriber = %id, "Subscriber disconnected");
}

/// Stream cycle summaries to one client.
async fn handle_simulation(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("Simulation stream client connected");
    let mut rx = state.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(summary) => {
                        let json = match serde_json::to_string(&summary) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize cycle summary: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("Simulation stream client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "Simulation stream client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => return,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => {
                        debug!("Simulation stream client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
