//! Tier-specific alert payloads pushed to subscribers.
//!
//! Each tier receives a differently shaped JSON object:
//!
//! | Tier | Payload | Gate |
//! |------|---------|------|
//! | monitor | [`MonitorPayload`] | always |
//! | authority | [`AuthorityPayload`] (monitor fields + ETA + forces) | density >= authority threshold |
//! | civilian | [`CivilianPayload`] (plain-language message) | density >= civilian threshold and a zone is affected |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DisasterType, MonitorStatus, Severity, Tier};

/// Payload sent to every monitor subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MonitorPayload {
    /// Track latitude.
    pub latitude: f64,
    /// Track longitude.
    pub longitude: f64,
    /// Place label from the report, if any.
    pub place: Option<String>,
    /// Disaster kind.
    #[ts(type = "string")]
    pub disaster_type: DisasterType,
    /// Severity grade.
    pub severity: Severity,
    /// Exposure score in `[0, 1]`.
    pub density: f64,
    /// Zones inside the impact radius.
    pub affected_zones: Vec<String>,
    /// Coarse status band.
    pub status: MonitorStatus,
    /// Event time.
    pub timestamp: DateTime<Utc>,
}

/// Payload sent to authority subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AuthorityPayload {
    /// All monitor fields.
    #[serde(flatten)]
    pub monitor: MonitorPayload,
    /// Always [`Tier::Authority`].
    pub role: Tier,
    /// Hours until landfall, when applicable.
    pub eta_hours: Option<f64>,
    /// Response forces to mobilise.
    pub recommended_forces: Vec<String>,
}

/// Payload sent to civilian subscribers after the configured delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CivilianPayload {
    /// Always [`Tier::Civilian`].
    pub role: Tier,
    /// Plain-language warning naming the affected zones.
    pub message: String,
    /// Severity grade.
    pub severity: Severity,
    /// Formatted arrival estimate (e.g. `"~1.2 hours"`).
    pub eta: Option<String>,
    /// Time the alert was sent (not when it was scheduled).
    pub timestamp: DateTime<Utc>,
}

/// Any payload a subscriber can receive.
///
/// Untagged on the wire. Variants are ordered most-specific first so that
/// deserialization picks the richest shape that matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum AlertPayload {
    /// Authority tier payload.
    Authority(AuthorityPayload),
    /// Civilian tier payload.
    Civilian(CivilianPayload),
    /// Monitor tier payload.
    Monitor(MonitorPayload),
}

impl AlertPayload {
    /// The tier this payload is shaped for.
    pub const fn tier(&self) -> Tier {
        match self {
            Self::Authority(_) => Tier::Authority,
            Self::Civilian(_) => Tier::Civilian,
            Self::Monitor(_) => Tier::Monitor,
        }
    }
}
