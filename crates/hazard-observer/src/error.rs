//! Error types for the observer API.
//!
//! [`ObserverError`] converts into an Axum response with a JSON body of
//! the form `{"error": ..., "status": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hazard_core::dispatch::DispatchError;

/// Errors that can occur in the observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The ingestion record failed validation.
    #[error("rejected report: {0}")]
    Rejected(#[from] DispatchError),

    /// A request parameter was out of range.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The simulation is not running in this process.
    #[error("operator state not available")]
    OperatorUnavailable,

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Rejected(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::OperatorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
