//! Core data structs: zones, track points, classified events, simulation
//! scenarios, and simulation events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DisasterType, FaultType, HazardKind, Phase, Severity};
use crate::ids::{AlertEventId, HazardEventId};

/// A fixed rectangular hazard-exposure region.
///
/// Zones are loaded once at startup and never mutated. Latitude and
/// longitude ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Zone {
    /// Display name (e.g. `"Tamil Nadu"`).
    pub name: String,
    /// Southern edge in degrees.
    pub lat_min: f64,
    /// Northern edge in degrees.
    pub lat_max: f64,
    /// Western edge in degrees.
    pub lon_min: f64,
    /// Eastern edge in degrees.
    pub lon_max: f64,
}

impl Zone {
    /// Construct a zone from its name and ranges.
    pub fn new(name: impl Into<String>, lat: (f64, f64), lon: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            lat_min: lat.0,
            lat_max: lat.1,
            lon_min: lon.0,
            lon_max: lon.1,
        }
    }

    /// Arithmetic centre of the rectangle as `(lat, lon)`.
    pub fn centroid(&self) -> (f64, f64) {
        (
            (self.lat_min + self.lat_max) / 2.0,
            (self.lon_min + self.lon_max) / 2.0,
        )
    }

    /// Whether the point lies inside the rectangle (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// One recorded position of the hazard track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// When the position was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// A fully classified hazard report, created once per ingestion and
/// discarded after fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    /// Identifier used to key the delayed civilian alert.
    pub id: AlertEventId,
    /// Disaster kind.
    pub disaster_type: DisasterType,
    /// Severity grade.
    pub severity: Severity,
    /// Hazard strength in `[0, 1]`.
    pub intensity: f64,
    /// Saturating exposure score in `[0, 1]`.
    pub density: f64,
    /// Track latitude after advancing.
    pub latitude: f64,
    /// Track longitude after advancing.
    pub longitude: f64,
    /// Names of zones inside the impact radius, in configuration order.
    pub affected_zones: Vec<String>,
    /// Estimated hours until landfall, for moving hazards only.
    pub eta_hours: Option<f64>,
    /// Free-form place label from the report.
    pub place: Option<String>,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

/// Scenario snapshot derived from the tectonic state each tick.
///
/// This is the feature record handed to the predictive models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Scenario {
    /// Moment magnitude, rounded to 2 decimals.
    pub magnitude: f64,
    /// Hypocentre depth in km, rounded to 1 decimal.
    pub depth_km: f64,
    /// Water column above the fault in metres.
    pub ocean_depth_m: f64,
    /// Fault mechanism.
    pub fault_type: FaultType,
    /// Vertical seafloor displacement in metres, rounded to 2 decimals.
    pub vertical_displacement_m: f64,
    /// Distance from the fault to the coast in km.
    pub distance_to_coast_km: f64,
    /// Accumulated rainfall in mm.
    pub rainfall_mm: f64,
    /// Soil moisture fraction.
    pub soil_moisture: f64,
    /// Slope angle in degrees.
    pub slope_angle_deg: f64,
    /// Vegetation cover index.
    pub vegetation_index: f64,
    /// Soil class (0..=3).
    pub soil_type: u8,
    /// Ground vibration intensity.
    pub ground_vibration: f64,
    /// Tectonic phase at the time of the snapshot.
    pub phase: Phase,
}

/// An event emitted by the simulation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HazardEvent {
    /// Unique event identifier.
    pub id: HazardEventId,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
    /// Event category.
    pub kind: HazardKind,
    /// Severity grade.
    pub severity: Severity,
    /// Human-readable summary.
    pub message: String,
    /// Event latitude.
    pub latitude: f64,
    /// Event longitude.
    pub longitude: f64,
    /// Nearest reference city.
    pub location: String,
    /// Distance from the national observer point in km (1 decimal).
    pub distance_km: f64,
    /// Whether the event was injected by the anti-starvation monitor.
    pub forced: bool,
}
