//! One simulation cycle: evolve, classify, force, report.
//!
//! [`HazardSimulation::run_cycle`] advances the tectonic engine by one
//! tick, consults the three predictive models under a deadline, turns
//! positive signals into [`HazardEvent`]s, and lets the
//! [`StarvationMonitor`] inject low-severity events for categories that
//! have been silent for too long. Model failures and timeouts count as
//! "no event" and never abort the cycle.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::Utc;
use hazard_geo::regions::DEFAULT_SPREAD;
use hazard_geo::{Region, distance_from_observer, nearest_city, random_point, round_to};
use hazard_types::{HazardEvent, HazardEventId, HazardKind, Phase, Scenario, Severity};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::{
    EARTHQUAKE_CONFIDENCE, ModelError, ModelSet, SeismicFeatures, TerrainFeatures,
    earthquake_severity, evaluate_tsunami, tsunami_possible,
};
use crate::starvation::StarvationMonitor;
use crate::tectonic::{SimulationState, TectonicEngine};

const TSUNAMI_SPREAD: f64 = 1.5;
const FORCED_TSUNAMI_SPREAD: f64 = 1.3;
const EVENT_POSITION_DECIMALS: i32 = 4;

/// What one cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// Phase after the tick.
    pub phase: Phase,
    /// Tectonic stress after the tick.
    pub stress: f64,
    /// Scenario handed to the models.
    pub scenario: Scenario,
    /// Natural events first, then forced ones.
    pub events: Vec<HazardEvent>,
    /// Categories whose model failed or timed out this cycle.
    pub model_failures: Vec<HazardKind>,
    /// Gap counters after this cycle.
    pub gap_counters: BTreeMap<HazardKind, u32>,
}

impl CycleReport {
    /// Events of one kind.
    pub fn events_of(&self, kind: HazardKind) -> impl Iterator<Item = &HazardEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

/// The simulated hazard source.
///
/// Owns its tectonic state, random source, models, and gap counters so
/// independent instances never share state.
pub struct HazardSimulation<R> {
    engine: TectonicEngine,
    rng: R,
    models: ModelSet,
    monitor: StarvationMonitor,
    model_timeout: Duration,
    cycle: u64,
}

impl<R: Rng + Send> HazardSimulation<R> {
    /// Create a simulation with a randomised initial state.
    pub fn new(mut rng: R, models: ModelSet, gap_limit: u32, model_timeout: Duration) -> Self {
        let engine = TectonicEngine::new(&mut rng);
        Self {
            engine,
            rng,
            models,
            monitor: StarvationMonitor::new(gap_limit),
            model_timeout,
            cycle: 0,
        }
    }

    /// Cycles completed so far.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Current tectonic state.
    pub const fn state(&self) -> &SimulationState {
        self.engine.state()
    }

    /// Current gap counters.
    pub fn gap_counters(&self) -> &BTreeMap<HazardKind, u32> {
        self.monitor.counters()
    }

    /// Run one cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle = self.cycle.saturating_add(1);
        let scenario = self.engine.step(&mut self.rng);
        let mut events = Vec::new();
        let mut failures = Vec::new();

        match self.classify_earthquake(&scenario).await {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => {
                warn!(cycle = self.cycle, error = %e, "Earthquake classifier gave no signal");
                failures.push(HazardKind::Earthquake);
            }
        }
        match self.classify_tsunami(&scenario).await {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => {
                warn!(cycle = self.cycle, error = %e, "Tsunami model gave no signal");
                failures.push(HazardKind::Tsunami);
            }
        }
        match self.classify_landslide(&scenario).await {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => {
                warn!(cycle = self.cycle, error = %e, "Landslide predictor gave no signal");
                failures.push(HazardKind::Landslide);
            }
        }

        let fired: BTreeSet<HazardKind> = events.iter().map(|e| e.kind).collect();
        for kind in self.monitor.record_cycle(&fired) {
            let event = self.forced_event(kind);
            info!(
                cycle = self.cycle,
                kind = %kind,
                location = %event.location,
                "Forced event after prolonged silence"
            );
            events.push(event);
        }

        for event in &events {
            debug!(
                cycle = self.cycle,
                kind = %event.kind,
                severity = %event.severity,
                forced = event.forced,
                "{}",
                event.message
            );
        }

        CycleReport {
            cycle: self.cycle,
            phase: scenario.phase,
            stress: round_to(self.engine.state().tectonic_stress, 2),
            scenario,
            events,
            model_failures: failures,
            gap_counters: self.monitor.counters().clone(),
        }
    }

    async fn classify_earthquake(
        &mut self,
        scenario: &Scenario,
    ) -> Result<Option<HazardEvent>, ModelError> {
        let features = SeismicFeatures::from_scenario(scenario);
        let model = std::sync::Arc::clone(&self.models.earthquake);
        let probability = call_model("earthquake", self.model_timeout, move || {
            model.probability(&features)
        })
        .await?;
        if probability < EARTHQUAKE_CONFIDENCE {
            return Ok(None);
        }

        let region = Region::SEISMIC
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Region::Himalayas);
        let magnitude = scenario.magnitude;
        Ok(Some(self.place_event(
            HazardKind::Earthquake,
            earthquake_severity(magnitude),
            region,
            region.seismic_spread(),
            false,
            |city| format!("M{magnitude:.1} earthquake near {city}"),
        )))
    }

    async fn classify_tsunami(
        &mut self,
        scenario: &Scenario,
    ) -> Result<Option<HazardEvent>, ModelError> {
        if !tsunami_possible(scenario) {
            return Ok(None);
        }
        let owned = scenario.clone();
        let model = std::sync::Arc::clone(&self.models.tsunami);
        let probability =
            call_model("tsunami", self.model_timeout, move || model.probability(&owned)).await?;

        let assessment = evaluate_tsunami(scenario, probability);
        let Some(severity) = assessment.severity else {
            return Ok(None);
        };
        let grade = severity.as_str().to_lowercase();
        Ok(Some(self.place_event(
            HazardKind::Tsunami,
            severity,
            Region::BayOfBengal,
            TSUNAMI_SPREAD,
            false,
            |city| format!("{grade} tsunami risk near {city}"),
        )))
    }

    async fn classify_landslide(
        &mut self,
        scenario: &Scenario,
    ) -> Result<Option<HazardEvent>, ModelError> {
        let features = TerrainFeatures::from_scenario(scenario);
        if !features.is_susceptible() {
            return Ok(None);
        }
        let model = std::sync::Arc::clone(&self.models.landslide);
        let risk = call_model("landslide", self.model_timeout, move || model.predict(&features)).await?;
        if !risk.alert {
            return Ok(None);
        }
        Ok(Some(self.place_event(
            HazardKind::Landslide,
            Severity::High,
            Region::Himalayas,
            DEFAULT_SPREAD,
            false,
            |city| format!("Landslide warning near {city}"),
        )))
    }

    fn forced_event(&mut self, kind: HazardKind) -> HazardEvent {
        match kind {
            HazardKind::Tsunami => self.place_event(
                kind,
                Severity::Low,
                Region::BayOfBengal,
                FORCED_TSUNAMI_SPREAD,
                true,
                |_| "Weak tsunami triggered after prolonged seismic inactivity".to_owned(),
            ),
            HazardKind::Landslide | HazardKind::Earthquake => self.place_event(
                kind,
                Severity::Low,
                Region::Himalayas,
                DEFAULT_SPREAD,
                true,
                |_| "Localized landslide after prolonged instability".to_owned(),
            ),
        }
    }

    fn place_event(
        &mut self,
        kind: HazardKind,
        severity: Severity,
        region: Region,
        spread: f64,
        forced: bool,
        message: impl FnOnce(&str) -> String,
    ) -> HazardEvent {
        let (lat, lon) = random_point(&mut self.rng, region, spread);
        let latitude = round_to(lat, EVENT_POSITION_DECIMALS);
        let longitude = round_to(lon, EVENT_POSITION_DECIMALS);
        let city = nearest_city(latitude, longitude);
        HazardEvent {
            id: HazardEventId::new(),
            timestamp: Utc::now(),
            kind,
            severity,
            message: message(city.name),
            latitude,
            longitude,
            location: city.name.to_owned(),
            distance_km: distance_from_observer(latitude, longitude),
            forced,
        }
    }
}

impl<R> std::fmt::Debug for HazardSimulation<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HazardSimulation")
            .field("cycle", &self.cycle)
            .field("engine", &self.engine)
            .field("monitor", &self.monitor)
            .field("model_timeout", &self.model_timeout)
            .finish_non_exhaustive()
    }
}

/// Run a synchronous model call on the blocking pool under a deadline.
///
/// A call that misses the deadline keeps running on its thread but its
/// result is discarded.
///
/// # Errors
///
/// Returns the model's own error, [`ModelError::Timeout`] when the
/// deadline passes, or [`ModelError::Aborted`] if the task panicked.
pub async fn call_model<T, F>(model: &'static str, timeout: Duration, call: F) -> Result<T, ModelError>
where
    F: FnOnce() -> Result<T, ModelError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(call)).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(ModelError::Aborted { model }),
        Err(_) => Err(ModelError::Timeout {
            model,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
