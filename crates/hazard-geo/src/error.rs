//! Error types for the `hazard-geo` crate.

/// Errors raised while building the zone set.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// A zone rectangle has a minimum above its maximum.
    #[error("zone {name} has an inverted {axis} range ({min} > {max})")]
    InvertedRange {
        /// Zone name.
        name: String,
        /// `"latitude"` or `"longitude"`.
        axis: &'static str,
        /// Lower bound as configured.
        min: f64,
        /// Upper bound as configured.
        max: f64,
    },

    /// A zone bound is NaN or infinite.
    #[error("zone {name} has a non-finite bound")]
    NonFinite {
        /// Zone name.
        name: String,
    },

    /// Two zones share a name.
    #[error("duplicate zone name: {0}")]
    DuplicateZone(String),
}
