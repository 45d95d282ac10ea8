//! Enumeration types shared by the dispatcher and the simulation.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Hazard classification
// ---------------------------------------------------------------------------

/// Kind of disaster attached to a classified report.
///
/// The four well-known kinds drive the recommended-forces table and the
/// ETA computation. Any other label supplied by an upstream classifier is
/// carried through verbatim as [`DisasterType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DisasterType {
    /// Tropical cyclone.
    Cyclone,
    /// Tsunami wave.
    Tsunami,
    /// Earthquake.
    Earthquake,
    /// Landslide.
    Landslide,
    /// Any other upstream label (e.g. `"Flood"`).
    Other(String),
}

impl DisasterType {
    /// Whether this disaster moves toward the coast and therefore gets an
    /// arrival estimate.
    pub const fn has_eta(&self) -> bool {
        matches!(self, Self::Cyclone | Self::Tsunami)
    }

    /// Canonical display label.
    pub fn label(&self) -> &str {
        match self {
            Self::Cyclone => "Cyclone",
            Self::Tsunami => "Tsunami",
            Self::Earthquake => "Earthquake",
            Self::Landslide => "Landslide",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for DisasterType {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "cyclone" => Self::Cyclone,
            "tsunami" => Self::Tsunami,
            "earthquake" => Self::Earthquake,
            "landslide" => Self::Landslide,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for DisasterType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<DisasterType> for String {
    fn from(kind: DisasterType) -> Self {
        match kind {
            DisasterType::Other(label) => label,
            known => known.label().to_owned(),
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity grade of a hazard.
///
/// Ordered from least to most severe so comparisons read naturally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum Severity {
    /// Minor hazard.
    Low,
    /// Noticeable hazard.
    Moderate,
    /// Serious hazard.
    High,
    /// Catastrophic hazard.
    Critical,
}

impl Severity {
    /// Uppercase wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeverity(pub String);

impl fmt::Display for UnknownSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown severity: {}", self.0)
    }
}

impl std::error::Error for UnknownSeverity {}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    /// Case-insensitive; `MEDIUM` is accepted as an alias of `MODERATE`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MODERATE" | "MEDIUM" => Ok(Self::Moderate),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(UnknownSeverity(raw.to_owned())),
        }
    }
}

/// Coarse status shown to passive monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum MonitorStatus {
    /// Density below the watch band.
    Normal,
    /// Density in the watch band.
    Watch,
    /// Density in the warning band.
    Warning,
}

/// Subscriber audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Tier {
    /// Passive dashboards; receive every classified event.
    Monitor,
    /// Response agencies; receive events above the authority threshold.
    Authority,
    /// The public; receive delayed, human-readable warnings.
    Civilian,
}

impl Tier {
    /// All tiers in fan-out order.
    pub const ALL: [Self; 3] = [Self::Monitor, Self::Authority, Self::Civilian];

    /// Lowercase label used in routes and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::Authority => "authority",
            Self::Civilian => "civilian",
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Category of event produced by the simulation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HazardKind {
    /// Seismic event.
    Earthquake,
    /// Tsunami following an offshore rupture.
    Tsunami,
    /// Slope failure.
    Landslide,
}

impl HazardKind {
    /// Lowercase label used in logs and configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earthquake => "earthquake",
            Self::Tsunami => "tsunami",
            Self::Landslide => "landslide",
        }
    }
}

impl From<HazardKind> for DisasterType {
    fn from(kind: HazardKind) -> Self {
        match kind {
            HazardKind::Earthquake => Self::Earthquake,
            HazardKind::Tsunami => Self::Tsunami,
            HazardKind::Landslide => Self::Landslide,
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the tectonic stress cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Stress accumulates.
    Buildup,
    /// Stress releases in a rupture.
    Event,
    /// Stress decays back toward baseline.
    Recovery,
}

/// Geographic setting of the simulated fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum ZoneType {
    /// Deep-water fault far from shore.
    Offshore,
    /// Shallow-water fault near shore.
    Coastal,
    /// Continental fault with no water column.
    Inland,
}

impl ZoneType {
    /// All zone types, in roll order.
    pub const ALL: [Self; 3] = [Self::Offshore, Self::Coastal, Self::Inland];
}

/// Fault mechanism of a simulated rupture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum FaultType {
    /// Extensional fault; moderate vertical displacement.
    Normal,
    /// Compressional thrust; strongest uplift.
    Reverse,
    /// Horizontal slip; almost no vertical displacement.
    StrikeSlip,
}
