//! Severity classification, exposure density, and the recommended-forces
//! lookup.

use hazard_types::{DisasterType, IngestReport, MonitorStatus, Severity, UnknownSeverity};

/// Intensity assumed when a report carries neither a declared pair nor an
/// explicit intensity.
pub const DEFAULT_INTENSITY: f64 = 0.5;

/// People at which exposure saturates for an intensity of 1.0.
const EXPOSURE_SCALE: f64 = 1000.0;

/// What the classifier is given to work with.
#[derive(Debug, Clone, PartialEq)]
pub enum SeveritySignal {
    /// Upstream already decided the type and severity.
    Declared {
        /// Declared disaster kind.
        disaster_type: DisasterType,
        /// Declared severity.
        severity: Severity,
    },
    /// Only a raw hazard intensity is known.
    Intensity(f64),
}

impl SeveritySignal {
    /// Pick the signal variant for an ingestion record.
    ///
    /// A declared pair needs both fields non-empty; otherwise the raw
    /// intensity (default 0.5) is used.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSeverity`] if a declared severity label is not
    /// recognised.
    pub fn from_report(report: &IngestReport) -> Result<Self, UnknownSeverity> {
        let declared_type = report.disaster_type.as_deref().filter(|s| !s.trim().is_empty());
        let declared_severity = report.severity.as_deref().filter(|s| !s.trim().is_empty());
        match (declared_type, declared_severity) {
            (Some(kind), Some(severity)) => Ok(Self::Declared {
                disaster_type: DisasterType::from(kind),
                severity: severity.parse()?,
            }),
            _ => Ok(Self::Intensity(report.intensity.unwrap_or(DEFAULT_INTENSITY))),
        }
    }
}

/// Result of classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Disaster kind.
    pub disaster_type: DisasterType,
    /// Severity grade.
    pub severity: Severity,
    /// Effective intensity in `[0, 1]` for raw signals, synthesised for
    /// declared ones.
    pub intensity: f64,
}

/// Classify a signal into a type, severity, and effective intensity.
pub fn classify(signal: SeveritySignal) -> Classification {
    match signal {
        SeveritySignal::Declared {
            disaster_type,
            severity,
        } => Classification {
            disaster_type,
            severity,
            intensity: declared_intensity(severity),
        },
        SeveritySignal::Intensity(intensity) => {
            let (disaster_type, severity) = if intensity >= 0.85 {
                (DisasterType::Tsunami, Severity::High)
            } else if intensity >= 0.6 {
                (DisasterType::Cyclone, Severity::High)
            } else if intensity >= 0.4 {
                (DisasterType::Cyclone, Severity::Moderate)
            } else {
                (DisasterType::Earthquake, Severity::Low)
            };
            Classification {
                disaster_type,
                severity,
                intensity,
            }
        }
    }
}

/// Intensity synthesised for a declared severity.
///
/// Only HIGH and MODERATE have dedicated values; LOW and CRITICAL both
/// fall to the floor.
pub const fn declared_intensity(severity: Severity) -> f64 {
    match severity {
        Severity::High => 0.9,
        Severity::Moderate => 0.6,
        Severity::Low | Severity::Critical => 0.3,
    }
}

/// Exposure score: `intensity * people / 1000`, clamped to `[0, 1]`.
pub fn density(intensity: f64, affected_people: u64) -> f64 {
    (intensity * affected_people as f64 / EXPOSURE_SCALE).clamp(0.0, 1.0)
}

/// Tier gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Authority tier gate.
    pub authority: f64,
    /// Civilian tier gate.
    pub civilian: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            authority: 0.3,
            civilian: 0.6,
        }
    }
}

impl Thresholds {
    /// Coarse status band shown to monitors.
    pub fn status(self, density: f64) -> MonitorStatus {
        if density < self.authority {
            MonitorStatus::Normal
        } else if density < self.civilian {
            MonitorStatus::Watch
        } else {
            MonitorStatus::Warning
        }
    }

    /// Whether authority subscribers are alerted.
    pub fn alerts_authority(self, density: f64) -> bool {
        density >= self.authority
    }

    /// Whether civilians are alerted (also requires an affected zone).
    pub fn alerts_civilians(self, density: f64, affected_zones: &[String]) -> bool {
        density >= self.civilian && !affected_zones.is_empty()
    }
}

const CYCLONE_SEVERE: &[&str] = &[
    "NDRF",
    "State Disaster Response Force (SDRF)",
    "Indian Coast Guard",
    "Home Guards",
    "Electricity & PWD Departments",
];

const CYCLONE_MODERATE: &[&str] = &["SDRF", "Local Police", "Municipal Emergency Teams"];

const TSUNAMI: &[&str] = &[
    "NDRF",
    "Indian Navy",
    "Indian Coast Guard",
    "Coastal Police",
    "District Administration",
];

const EARTHQUAKE: &[&str] = &[
    "NDRF",
    "Fire & Rescue Services",
    "Medical Emergency Teams",
    "Local Police",
];

const FALLBACK: &[&str] = &["Local Administration"];

/// Response forces to mobilise for a disaster kind and severity.
pub fn recommended_forces(disaster_type: &DisasterType, severity: Severity) -> Vec<String> {
    let forces = match disaster_type {
        DisasterType::Cyclone if severity >= Severity::High => CYCLONE_SEVERE,
        DisasterType::Cyclone => CYCLONE_MODERATE,
        DisasterType::Tsunami => TSUNAMI,
        DisasterType::Earthquake => EARTHQUAKE,
        DisasterType::Landslide | DisasterType::Other(_) => FALLBACK,
    };
    forces.iter().map(|&f| f.to_owned()).collect()
}
