//! Predictive-model contract and the heuristic models shipped by default.
//!
//! The three models are external black boxes from the simulation's point
//! of view: synchronous, side-effect free, and possibly slow. The cycle
//! pipeline runs each call on the blocking pool under a deadline (see
//! [`crate::cycle`]); an error or a missed deadline means "no signal".
//!
//! The heuristics here are deterministic stand-ins for trained models.
//! They produce plausible probabilities from the same feature records a
//! trained model would receive.

use std::sync::Arc;

use hazard_types::{FaultType, Scenario, Severity};
use serde::Serialize;

/// Probability at or above which the event classifier reports an
/// earthquake.
pub const EARTHQUAKE_CONFIDENCE: f64 = 0.6;

/// Rainfall above which landslides are considered at all.
pub const LANDSLIDE_MIN_RAINFALL_MM: f64 = 80.0;

/// Slope above which landslides are considered at all.
pub const LANDSLIDE_MIN_SLOPE_DEG: f64 = 25.0;

/// Errors raised by a predictive-model call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// The model rejected its input or failed internally.
    #[error("{model} model failed: {message}")]
    Failed {
        /// Which model.
        model: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// The call did not finish before its deadline.
    #[error("{model} model timed out after {timeout_ms}ms")]
    Timeout {
        /// Which model.
        model: &'static str,
        /// The deadline that was missed.
        timeout_ms: u64,
    },

    /// The blocking task panicked or was cancelled.
    #[error("{model} model task aborted")]
    Aborted {
        /// Which model.
        model: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Feature records
// ---------------------------------------------------------------------------

/// Waveform features fed to the earthquake event classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeismicFeatures {
    /// P-wave amplitude.
    pub p_wave_amplitude: f64,
    /// S-wave amplitude.
    pub s_wave_amplitude: f64,
    /// Seconds between P and S arrivals.
    pub ps_time_diff_sec: f64,
    /// Dominant frequency.
    pub frequency_hz: f64,
}

impl SeismicFeatures {
    /// Synthesise waveform features from a scenario.
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let m = scenario.magnitude;
        Self {
            p_wave_amplitude: m.powf(1.4),
            s_wave_amplitude: m.powf(1.6),
            ps_time_diff_sec: (scenario.depth_km / 8.0).max(0.5),
            frequency_hz: (8.0 - m).max(0.8),
        }
    }
}

/// Terrain features fed to the landslide predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TerrainFeatures {
    /// Rainfall in mm.
    pub rainfall_mm: f64,
    /// Soil moisture fraction.
    pub soil_moisture: f64,
    /// Slope in degrees.
    pub slope_angle_deg: f64,
    /// Vegetation cover index.
    pub vegetation_index: f64,
    /// Soil class.
    pub soil_type: u8,
    /// Ground vibration.
    pub ground_vibration: f64,
}

impl TerrainFeatures {
    /// Extract terrain features from a scenario.
    pub const fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            rainfall_mm: scenario.rainfall_mm,
            soil_moisture: scenario.soil_moisture,
            slope_angle_deg: scenario.slope_angle_deg,
            vegetation_index: scenario.vegetation_index,
            soil_type: scenario.soil_type,
            ground_vibration: scenario.ground_vibration,
        }
    }

    /// Whether conditions are wet and steep enough to consult the
    /// predictor.
    pub fn is_susceptible(&self) -> bool {
        self.rainfall_mm > LANDSLIDE_MIN_RAINFALL_MM && self.slope_angle_deg > LANDSLIDE_MIN_SLOPE_DEG
    }
}

/// Landslide predictor output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LandslideRisk {
    /// Whether the predictor raises an alert.
    pub alert: bool,
    /// Risk score in `[0, 1]`.
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Model traits
// ---------------------------------------------------------------------------

/// Decides whether a waveform is an earthquake.
pub trait EarthquakeClassifier: Send + Sync {
    /// Probability that the waveform is an earthquake.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Failed`] if the model cannot score the input.
    fn probability(&self, features: &SeismicFeatures) -> Result<f64, ModelError>;
}

/// Scores tsunami likelihood for a rupture scenario.
pub trait TsunamiModel: Send + Sync {
    /// Raw tsunami probability before physical scaling.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Failed`] if the model cannot score the input.
    fn probability(&self, scenario: &Scenario) -> Result<f64, ModelError>;
}

/// Predicts landslide risk from terrain.
pub trait LandslidePredictor: Send + Sync {
    /// Landslide risk for the terrain.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Failed`] if the model cannot score the input.
    fn predict(&self, features: &TerrainFeatures) -> Result<LandslideRisk, ModelError>;
}

/// The three models used by the cycle pipeline.
#[derive(Clone)]
pub struct ModelSet {
    /// Earthquake event classifier.
    pub earthquake: Arc<dyn EarthquakeClassifier>,
    /// Tsunami probability model.
    pub tsunami: Arc<dyn TsunamiModel>,
    /// Landslide predictor.
    pub landslide: Arc<dyn LandslidePredictor>,
}

impl ModelSet {
    /// The built-in heuristic models.
    pub fn heuristic() -> Self {
        Self {
            earthquake: Arc::new(HeuristicEarthquakeClassifier),
            tsunami: Arc::new(HeuristicTsunamiModel),
            landslide: Arc::new(HeuristicLandslidePredictor),
        }
    }
}

impl Default for ModelSet {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl std::fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSet").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Heuristic models
// ---------------------------------------------------------------------------

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn finite_or_fail(model: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value.clamp(0.0, 1.0))
    } else {
        Err(ModelError::Failed {
            model,
            message: "non-finite feature".to_owned(),
        })
    }
}

/// Logistic on P-wave amplitude; crosses 0.6 just under M7.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEarthquakeClassifier;

impl EarthquakeClassifier for HeuristicEarthquakeClassifier {
    fn probability(&self, features: &SeismicFeatures) -> Result<f64, ModelError> {
        finite_or_fail("earthquake", logistic((features.p_wave_amplitude - 14.0) / 2.0))
    }
}

/// Logistic on magnitude, uplift, and distance to the coast.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTsunamiModel;

impl TsunamiModel for HeuristicTsunamiModel {
    fn probability(&self, scenario: &Scenario) -> Result<f64, ModelError> {
        let x = 1.6 * (scenario.magnitude - 7.0) + 0.8 * (scenario.vertical_displacement_m - 1.0)
            - 0.004 * (scenario.distance_to_coast_km - 100.0)
            + 0.5;
        finite_or_fail("tsunami", logistic(x))
    }
}

/// Weighted terrain score; alerts at 0.55.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicLandslidePredictor;

impl HeuristicLandslidePredictor {
    /// Score at or above which an alert is raised.
    pub const ALERT_SCORE: f64 = 0.55;
}

impl LandslidePredictor for HeuristicLandslidePredictor {
    fn predict(&self, features: &TerrainFeatures) -> Result<LandslideRisk, ModelError> {
        let rain = (features.rainfall_mm / 200.0).min(1.0);
        let slope = (features.slope_angle_deg / 55.0).min(1.0);
        let bare = 1.0 - features.vegetation_index.clamp(0.0, 1.0);
        let shaking = features.ground_vibration.min(1.0);
        let clay = f64::from(features.soil_type) / 3.0;
        let score = finite_or_fail(
            "landslide",
            0.3 * rain
                + 0.25 * features.soil_moisture
                + 0.25 * slope
                + 0.1 * bare
                + 0.05 * shaking
                + 0.05 * clay,
        )?;
        Ok(LandslideRisk {
            alert: score >= Self::ALERT_SCORE,
            score,
        })
    }
}

// ---------------------------------------------------------------------------
// Tsunami evaluator
// ---------------------------------------------------------------------------

/// Result of gating a tsunami probability through physical conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TsunamiAssessment {
    /// Model probability.
    pub probability: f64,
    /// Probability after fault-type scaling.
    pub scaled_probability: f64,
    /// Alert grade, if any.
    pub severity: Option<Severity>,
}

impl TsunamiAssessment {
    /// Whether a tsunami alert is raised.
    pub const fn is_alert(&self) -> bool {
        self.severity.is_some()
    }
}

/// How strongly a fault mechanism lifts the water column.
pub const fn uplift_factor(fault_type: FaultType) -> f64 {
    match fault_type {
        FaultType::Reverse => 1.0,
        FaultType::Normal => 0.45,
        FaultType::StrikeSlip => 0.15,
    }
}

/// Whether a rupture can physically generate a tsunami.
pub fn tsunami_possible(scenario: &Scenario) -> bool {
    scenario.magnitude >= 6.5
        && scenario.depth_km <= 70.0
        && scenario.ocean_depth_m > 50.0
        && scenario.vertical_displacement_m >= 0.3
}

/// Scale a model probability by fault type and grade it.
pub fn evaluate_tsunami(scenario: &Scenario, probability: f64) -> TsunamiAssessment {
    let scaled = probability * uplift_factor(scenario.fault_type);
    let severity = if !tsunami_possible(scenario) {
        None
    } else if scaled >= 0.6 {
        Some(Severity::High)
    } else if scaled >= 0.4 {
        Some(Severity::Moderate)
    } else if scaled >= 0.25 && scenario.fault_type == FaultType::Normal {
        Some(Severity::Low)
    } else {
        None
    };
    TsunamiAssessment {
        probability,
        scaled_probability: scaled,
        severity,
    }
}

/// Earthquake severity from magnitude.
pub fn earthquake_severity(magnitude: f64) -> Severity {
    if magnitude >= 8.5 {
        Severity::Critical
    } else if magnitude >= 7.2 {
        Severity::High
    } else {
        Severity::Moderate
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hazard_types::Phase;

    use super::*;

    fn rupture(magnitude: f64, fault_type: FaultType) -> Scenario {
        Scenario {
            magnitude,
            depth_km: 20.0,
            ocean_depth_m: 3000.0,
            fault_type,
            vertical_displacement_m: 2.0,
            distance_to_coast_km: 100.0,
            rainfall_mm: 50.0,
            soil_moisture: 0.5,
            slope_angle_deg: 30.0,
            vegetation_index: 0.5,
            soil_type: 1,
            ground_vibration: 0.2,
            phase: Phase::Event,
        }
    }

    #[test]
    fn seismic_features_follow_magnitude() {
        let f = SeismicFeatures::from_scenario(&rupture(7.0, FaultType::Reverse));
        assert!((f.p_wave_amplitude - 7.0_f64.powf(1.4)).abs() < 1e-12);
        assert!((f.ps_time_diff_sec - 2.5).abs() < 1e-12);
        assert!((f.frequency_hz - 1.0).abs() < 1e-12);

        let f = SeismicFeatures::from_scenario(&rupture(9.0, FaultType::Reverse));
        assert!((f.frequency_hz - 0.8).abs() < 1e-12);
    }

    #[test]
    fn heuristic_classifier_separates_small_and_large() {
        let c = HeuristicEarthquakeClassifier;
        let small = c
            .probability(&SeismicFeatures::from_scenario(&rupture(5.0, FaultType::Normal)))
            .unwrap();
        let large = c
            .probability(&SeismicFeatures::from_scenario(&rupture(7.5, FaultType::Normal)))
            .unwrap();
        assert!(small < EARTHQUAKE_CONFIDENCE);
        assert!(large >= EARTHQUAKE_CONFIDENCE);
    }

    #[test]
    fn non_finite_features_fail() {
        let mut features = SeismicFeatures::from_scenario(&rupture(7.0, FaultType::Normal));
        features.p_wave_amplitude = f64::NAN;
        assert!(HeuristicEarthquakeClassifier.probability(&features).is_err());
    }

    #[test]
    fn tsunami_grading_by_fault() {
        let reverse = rupture(8.0, FaultType::Reverse);
        assert_eq!(evaluate_tsunami(&reverse, 0.9).severity, Some(Severity::High));
        assert_eq!(evaluate_tsunami(&reverse, 0.5).severity, Some(Severity::Moderate));
        assert_eq!(evaluate_tsunami(&reverse, 0.3).severity, None);

        // 0.9 * 0.45 = 0.405
        let normal = rupture(8.0, FaultType::Normal);
        assert_eq!(evaluate_tsunami(&normal, 0.9).severity, Some(Severity::Moderate));
        // 0.6 * 0.45 = 0.27: the low band is reserved for normal faults.
        assert_eq!(evaluate_tsunami(&normal, 0.6).severity, Some(Severity::Low));

        let strike = rupture(8.0, FaultType::StrikeSlip);
        assert_eq!(evaluate_tsunami(&strike, 1.0).severity, None);
    }

    #[test]
    fn tsunami_needs_physical_conditions() {
        let mut s = rupture(6.4, FaultType::Reverse);
        assert!(!evaluate_tsunami(&s, 1.0).is_alert());
        s.magnitude = 7.0;
        s.ocean_depth_m = 0.0;
        assert!(!evaluate_tsunami(&s, 1.0).is_alert());
        s.ocean_depth_m = 51.0;
        s.vertical_displacement_m = 0.29;
        assert!(!evaluate_tsunami(&s, 1.0).is_alert());
        s.vertical_displacement_m = 0.3;
        assert!(evaluate_tsunami(&s, 1.0).is_alert());
    }

    #[test]
    fn earthquake_severity_bands() {
        assert_eq!(earthquake_severity(8.5), Severity::Critical);
        assert_eq!(earthquake_severity(7.2), Severity::High);
        assert_eq!(earthquake_severity(7.19), Severity::Moderate);
    }

    #[test]
    fn landslide_susceptibility_gate() {
        let mut t = TerrainFeatures::from_scenario(&rupture(5.0, FaultType::Normal));
        assert!(!t.is_susceptible());
        t.rainfall_mm = 81.0;
        t.slope_angle_deg = 26.0;
        assert!(t.is_susceptible());
    }

    #[test]
    fn saturated_steep_bare_slope_alerts() {
        let risk = HeuristicLandslidePredictor
            .predict(&TerrainFeatures {
                rainfall_mm: 250.0,
                soil_moisture: 1.0,
                slope_angle_deg: 50.0,
                vegetation_index: 0.1,
                soil_type: 3,
                ground_vibration: 1.0,
            })
            .unwrap();
        assert!(risk.alert);

        let risk = HeuristicLandslidePredictor
            .predict(&TerrainFeatures {
                rainfall_mm: 85.0,
                soil_moisture: 0.2,
                slope_angle_deg: 26.0,
                vegetation_index: 0.9,
                soil_type: 0,
                ground_vibration: 0.0,
            })
            .unwrap();
        assert!(!risk.alert);
    }
}
