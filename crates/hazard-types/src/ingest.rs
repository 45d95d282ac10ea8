//! Ingestion contract between the transport layer and the dispatcher.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A raw hazard report as posted to `POST /ingest`.
///
/// `latitude`, `longitude`, and `affected_people` are required; the rest
/// is optional. When both `disaster_type` and `severity` are present they
/// take precedence over `intensity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IngestReport {
    /// Report latitude in degrees.
    pub latitude: f64,
    /// Report longitude in degrees.
    pub longitude: f64,
    /// Estimated number of people exposed.
    pub affected_people: u64,
    /// Upstream disaster label (e.g. from a map UI or ML backend).
    #[serde(default)]
    pub disaster_type: Option<String>,
    /// Upstream severity label.
    #[serde(default)]
    pub severity: Option<String>,
    /// Free-form place name.
    #[serde(default)]
    pub place: Option<String>,
    /// Raw hazard intensity, used when no type/severity pair is given.
    #[serde(default)]
    pub intensity: Option<f64>,
}

impl IngestReport {
    /// A bare report with only the required fields.
    pub const fn at(latitude: f64, longitude: f64, affected_people: u64) -> Self {
        Self {
            latitude,
            longitude,
            affected_people,
            disaster_type: None,
            severity: None,
            place: None,
            intensity: None,
        }
    }

    /// Builder-style setter for the raw intensity.
    #[must_use]
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    /// Builder-style setter for a declared type/severity pair.
    #[must_use]
    pub fn declared(mut self, disaster_type: impl Into<String>, severity: impl Into<String>) -> Self {
        self.disaster_type = Some(disaster_type.into());
        self.severity = Some(severity.into());
        self
    }

    /// Builder-style setter for the place label.
    #[must_use]
    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }
}

/// Acknowledgement returned to the ingress caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IngestAck {
    /// Always `"processed"`.
    pub status: String,
    /// Computed exposure score.
    pub density: f64,
}

impl IngestAck {
    /// Acknowledge a processed report.
    pub fn processed(density: f64) -> Self {
        Self {
            status: "processed".to_owned(),
            density,
        }
    }
}
