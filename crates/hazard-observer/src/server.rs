//! HTTP server lifecycle.
//!
//! [`serve`] runs the router on a bound listener until the task is
//! aborted.

use std::net::SocketAddr;
use std::sync::Arc;

use hazard_core::config::ServerConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Serve on an already-bound listener.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server stops with an I/O error.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Hazard API listening");
    }
    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))
}

/// Parse `host:port` from the server configuration.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address does not parse.
pub fn socket_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
    format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address {}:{}: {e}", config.host, config.port)))
}

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
