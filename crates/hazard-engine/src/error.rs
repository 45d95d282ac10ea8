//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hazard_core::config::ConfigError,
    },

    /// The API server failed to start.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the failure.
        message: String,
    },
}
