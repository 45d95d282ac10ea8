//! The tectonic stress cycle and terrain random walk.
//!
//! One [`TectonicEngine::step`] per simulation cycle, always in this order:
//! evolve tectonics, evolve terrain, update phase, derive a [`Scenario`].
//!
//! ```text
//!   BUILDUP --(stress > 55)--> EVENT --(next tick)--> RECOVERY
//!      ^                                                  |
//!      +-----------------(stress < 38)--------------------+
//! ```

use hazard_geo::round_to;
use hazard_types::{FaultType, Phase, Scenario, ZoneType};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{debug, info};

/// Stress above which BUILDUP ruptures.
pub const RUPTURE_STRESS: f64 = 55.0;

/// Stress below which RECOVERY returns to BUILDUP.
pub const RELAXED_STRESS: f64 = 38.0;

const MAX_RAINFALL_MM: f64 = 300.0;
const MAX_SLOPE_DEG: f64 = 55.0;
const ZONE_MIGRATION_CHANCE: f64 = 0.2;
const MEGA_EVENT_CHANCE: f64 = 0.15;
const MARINE_FAULT_CHANCE: f64 = 0.6;

/// Process-wide state of the simulated fault and its terrain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    /// Current phase.
    pub phase: Phase,
    /// Accumulated stress.
    pub tectonic_stress: f64,
    /// Stress added per BUILDUP tick before jitter.
    pub strain_rate: f64,
    /// Geographic setting.
    pub zone_type: ZoneType,
    /// Water column in metres.
    pub ocean_depth_m: f64,
    /// Distance to the coast in km.
    pub distance_to_coast_km: f64,
    /// Accumulated rainfall in mm.
    pub rainfall_mm: f64,
    /// Soil moisture in `[0, 1]`.
    pub soil_moisture: f64,
    /// Slope angle in degrees.
    pub slope_angle_deg: f64,
    /// Vegetation cover in `[0, 1]`.
    pub vegetation_index: f64,
    /// Soil class, 0..=3.
    pub soil_type: u8,
    /// Ground vibration intensity.
    pub ground_vibration: f64,
    /// Remaining ticks of post-quake terrain destabilisation.
    pub post_quake_instability: u32,
}

impl SimulationState {
    /// Fresh state in BUILDUP with randomised stress, geography, and
    /// terrain.
    pub fn initial<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let zone_type = roll_zone(rng);
        let (ocean_depth_m, distance_to_coast_km) = geography(rng, zone_type);
        Self {
            phase: Phase::Buildup,
            tectonic_stress: rng.random_range(45.0..60.0),
            strain_rate: rng.random_range(3.5..6.0),
            zone_type,
            ocean_depth_m,
            distance_to_coast_km,
            rainfall_mm: rng.random_range(20.0..80.0),
            soil_moisture: rng.random_range(0.35..0.65),
            slope_angle_deg: rng.random_range(15.0..40.0),
            vegetation_index: rng.random_range(0.3..0.8),
            soil_type: rng.random_range(0..=3),
            ground_vibration: 0.0,
            post_quake_instability: 0,
        }
    }
}

fn roll_zone<R: Rng + ?Sized>(rng: &mut R) -> ZoneType {
    ZoneType::ALL.choose(rng).copied().unwrap_or(ZoneType::Inland)
}

/// Ocean depth and coast distance for a zone type.
fn geography<R: Rng + ?Sized>(rng: &mut R, zone_type: ZoneType) -> (f64, f64) {
    match zone_type {
        ZoneType::Offshore => (rng.random_range(2000.0..5000.0), rng.random_range(80.0..350.0)),
        ZoneType::Coastal => (rng.random_range(50.0..500.0), rng.random_range(5.0..60.0)),
        ZoneType::Inland => (0.0, rng.random_range(120.0..900.0)),
    }
}

/// Drives [`SimulationState`] forward one tick at a time.
#[derive(Debug, Clone)]
pub struct TectonicEngine {
    state: SimulationState,
}

impl TectonicEngine {
    /// Engine with a randomised initial state.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_state(SimulationState::initial(rng))
    }

    /// Engine resuming from an explicit state.
    pub const fn from_state(state: SimulationState) -> Self {
        Self { state }
    }

    /// Current state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Advance one tick and return the derived scenario.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Scenario {
        self.evolve_tectonics(rng);
        self.evolve_terrain(rng);
        self.update_phase();
        self.build_scenario(rng)
    }

    fn evolve_tectonics<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let s = &mut self.state;
        match s.phase {
            Phase::Buildup => {
                s.tectonic_stress += s.strain_rate * rng.random_range(1.0..1.4);
            }
            Phase::Event => {
                s.tectonic_stress *= rng.random_range(0.25..0.4);
                s.ground_vibration = rng.random_range(0.8..1.4);
                s.post_quake_instability = rng.random_range(4..=7);
                if rng.random_bool(ZONE_MIGRATION_CHANCE) {
                    s.zone_type = roll_zone(rng);
                    (s.ocean_depth_m, s.distance_to_coast_km) = geography(rng, s.zone_type);
                    info!(zone_type = ?s.zone_type, "Plate boundary shifted");
                }
            }
            Phase::Recovery => {
                s.tectonic_stress *= rng.random_range(0.85..0.93);
                s.ground_vibration *= 0.6;
            }
        }
    }

    fn evolve_terrain<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let s = &mut self.state;
        s.rainfall_mm = (s.rainfall_mm + rng.random_range(-10.0..15.0)).clamp(0.0, MAX_RAINFALL_MM);
        s.soil_moisture += s.rainfall_mm / 850.0 + rng.random_range(-0.04..0.04);

        if s.post_quake_instability > 0 {
            s.post_quake_instability = s.post_quake_instability.saturating_sub(1);
            s.soil_moisture += rng.random_range(0.06..0.12);
            s.slope_angle_deg += rng.random_range(1.2..2.5);
            s.ground_vibration = s.ground_vibration.max(rng.random_range(0.5..1.0));
        }

        s.soil_moisture = s.soil_moisture.clamp(0.0, 1.0);
        s.slope_angle_deg = s.slope_angle_deg.min(MAX_SLOPE_DEG);
    }

    fn update_phase(&mut self) {
        let s = &mut self.state;
        let next = match s.phase {
            Phase::Buildup if s.tectonic_stress > RUPTURE_STRESS => Phase::Event,
            Phase::Event => Phase::Recovery,
            Phase::Recovery if s.tectonic_stress < RELAXED_STRESS => Phase::Buildup,
            unchanged => unchanged,
        };
        if next != s.phase {
            debug!(from = ?s.phase, to = ?next, stress = s.tectonic_stress, "Phase transition");
            s.phase = next;
        }
    }

    fn build_scenario<R: Rng + ?Sized>(&self, rng: &mut R) -> Scenario {
        let s = &self.state;
        let magnitude = match s.phase {
            Phase::Event if rng.random_bool(MEGA_EVENT_CHANCE) => rng.random_range(7.8..9.2),
            Phase::Event => rng.random_range(6.8..7.8),
            Phase::Buildup | Phase::Recovery => rng.random_range(4.8..6.6),
        };
        let depth_km = rng.random_range(5.0..45.0);

        let marine = matches!(s.zone_type, ZoneType::Offshore | ZoneType::Coastal);
        let candidates = if marine && rng.random_bool(MARINE_FAULT_CHANCE) {
            [FaultType::Reverse, FaultType::Normal]
        } else {
            [FaultType::Normal, FaultType::StrikeSlip]
        };
        let fault_type = candidates.choose(rng).copied().unwrap_or(FaultType::Normal);

        let vertical_displacement_m = match fault_type {
            FaultType::Reverse => rng.random_range(0.8..6.0),
            FaultType::Normal => rng.random_range(0.3..2.0),
            FaultType::StrikeSlip => rng.random_range(0.05..0.6),
        };

        Scenario {
            magnitude: round_to(magnitude, 2),
            depth_km: round_to(depth_km, 1),
            ocean_depth_m: s.ocean_depth_m,
            fault_type,
            vertical_displacement_m: round_to(vertical_displacement_m, 2),
            distance_to_coast_km: round_to(s.distance_to_coast_km, 1),
            rainfall_mm: round_to(s.rainfall_mm, 1),
            soil_moisture: round_to(s.soil_moisture, 2),
            slope_angle_deg: round_to(s.slope_angle_deg, 1),
            vegetation_index: round_to(s.vegetation_index, 2),
            soil_type: s.soil_type,
            ground_vibration: round_to(s.ground_vibration, 2),
            phase: s.phase,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn buildup_state(stress: f64) -> SimulationState {
        SimulationState {
            phase: Phase::Buildup,
            tectonic_stress: stress,
            strain_rate: 5.0,
            zone_type: ZoneType::Offshore,
            ocean_depth_m: 3000.0,
            distance_to_coast_km: 120.0,
            rainfall_mm: 50.0,
            soil_moisture: 0.5,
            slope_angle_deg: 30.0,
            vegetation_index: 0.5,
            soil_type: 1,
            ground_vibration: 0.0,
            post_quake_instability: 0,
        }
    }

    #[test]
    fn initial_state_ranges() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let s = SimulationState::initial(&mut rng);
            assert_eq!(s.phase, Phase::Buildup);
            assert!((45.0..60.0).contains(&s.tectonic_stress));
            assert!((3.5..6.0).contains(&s.strain_rate));
            assert!(s.soil_type <= 3);
            match s.zone_type {
                ZoneType::Offshore => assert!(s.ocean_depth_m >= 2000.0),
                ZoneType::Coastal => assert!((50.0..500.0).contains(&s.ocean_depth_m)),
                ZoneType::Inland => assert!(s.ocean_depth_m.abs() < f64::EPSILON),
            }
        }
    }

    #[test]
    fn buildup_ruptures_then_recovers_then_rebuilds() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut engine = TectonicEngine::from_state(buildup_state(40.0));

        let mut phases = Vec::new();
        for _ in 0..200 {
            phases.push(engine.step(&mut rng).phase);
        }

        assert!(phases.contains(&Phase::Event));
        for pair in phases.windows(2) {
            let [prev, next] = pair else { continue };
            match prev {
                // EVENT lasts exactly one tick.
                Phase::Event => assert_eq!(*next, Phase::Recovery),
                Phase::Buildup => assert!(matches!(next, Phase::Buildup | Phase::Event)),
                Phase::Recovery => assert!(matches!(next, Phase::Recovery | Phase::Buildup)),
            }
        }
        assert!(phases.windows(2).any(|p| p == [Phase::Recovery, Phase::Buildup]));
    }

    #[test]
    fn event_collapses_stress_and_shakes_ground() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut state = buildup_state(60.0);
        state.phase = Phase::Event;
        let mut engine = TectonicEngine::from_state(state);
        let scenario = engine.step(&mut rng);

        let s = engine.state();
        assert_eq!(scenario.phase, Phase::Recovery);
        assert!(s.tectonic_stress <= 60.0 * 0.4);
        assert!(s.ground_vibration >= 0.5);
        // One instability tick is consumed by the same step's terrain update.
        assert!((3..=6).contains(&s.post_quake_instability));
    }

    #[test]
    fn terrain_stays_bounded() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut engine = TectonicEngine::new(&mut rng);
        for _ in 0..2_000 {
            let scenario = engine.step(&mut rng);
            assert!((0.0..=300.0).contains(&scenario.rainfall_mm));
            assert!((0.0..=1.0).contains(&scenario.soil_moisture));
            assert!(scenario.slope_angle_deg <= 55.0);
        }
    }

    #[test]
    fn scenario_magnitude_tracks_phase() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut engine = TectonicEngine::new(&mut rng);
        for _ in 0..1_000 {
            let scenario = engine.step(&mut rng);
            match scenario.phase {
                Phase::Event => assert!((6.8..=9.2).contains(&scenario.magnitude)),
                _ => assert!((4.8..=6.6).contains(&scenario.magnitude)),
            }
            assert!((5.0..=45.0).contains(&scenario.depth_km));
            let d = scenario.vertical_displacement_m;
            match scenario.fault_type {
                FaultType::Reverse => assert!((0.8..=6.0).contains(&d)),
                FaultType::Normal => assert!((0.3..=2.0).contains(&d)),
                FaultType::StrikeSlip => assert!((0.05..=0.6).contains(&d)),
            }
        }
    }

    #[test]
    fn inland_faults_are_never_reverse() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut state = buildup_state(10.0);
        state.zone_type = ZoneType::Inland;
        state.ocean_depth_m = 0.0;
        let mut engine = TectonicEngine::from_state(state);
        // At most 6 * 5.0 * 1.4 = 42 stress is added, so the run stays in
        // BUILDUP and the zone type never migrates.
        for _ in 0..6 {
            let scenario = engine.step(&mut rng);
            assert_ne!(scenario.fault_type, FaultType::Reverse);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let run = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut engine = TectonicEngine::new(&mut rng);
            (0..50).map(|_| engine.step(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(17), run(17));
    }
}
