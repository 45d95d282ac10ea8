//! Server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] binds the listener eagerly, so an unusable address
//! fails startup instead of surfacing later from a background task, and
//! then serves on a spawned Tokio task.

use std::sync::Arc;

use hazard_core::config::ServerConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::server::{ServerError, serve, socket_addr};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the configured address and serve on a background task.
///
/// The returned handle can be aborted during shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid or cannot
/// be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = socket_addr(config)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!(error = %e, "Hazard API server exited with error");
        }
    });

    tracing::info!(%addr, "Hazard API server spawned on background task");
    Ok(handle)
}
