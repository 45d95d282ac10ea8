//! HTTP and `WebSocket` surface of the hazard alert system.
//!
//! - **Ingestion** (`POST /ingest`) hands reports to the tiered
//!   [`Dispatcher`].
//! - **Tier sockets** (`/ws/monitor`, `/ws/authority`, `/ws/civilian`)
//!   register one subscriber per connection.
//! - **Simulation stream** (`/ws/simulation`) broadcasts per-cycle
//!   summaries via [`tokio::sync::broadcast`].
//! - **Queries** (`GET /events`, `GET /api/status`).
//! - **Operator endpoints** for pause, resume, speed, stop, and status.
//!
//! [`Dispatcher`]: hazard_core::dispatch::Dispatcher

pub mod error;
pub mod handlers;
pub mod operator;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::ServerError;
pub use startup::spawn_observer;
pub use state::{AppState, CycleBroadcast};
