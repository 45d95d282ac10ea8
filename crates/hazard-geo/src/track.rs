//! The moving hazard track.
//!
//! A two-state machine (Inactive, Active) holding an append-only list of
//! positions. The first report seeds the track at its raw coordinates;
//! every later report moves the track one 10-minute step toward the
//! centroid of the zone nearest to the last position. The raw coordinates
//! of later reports are ignored.

use chrono::{DateTime, Utc};
use hazard_types::TrackPoint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distance::round_to;
use crate::zones::ZoneSet;

/// Kilometres per degree used for the step conversion.
const KM_PER_DEGREE: f64 = 111.0;

/// Simulated hours covered by one step (10 minutes).
const STEP_HOURS: f64 = 10.0 / 60.0;

/// Axis deltas smaller than this are treated as "already there".
const AXIS_EPSILON: f64 = 0.0001;

/// Decimal places kept on recorded positions.
const POSITION_DECIMALS: i32 = 4;

/// When, if ever, an active track returns to Inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationPolicy {
    /// The track stays active for the life of the process.
    #[default]
    Never,
    /// Deactivate after this many consecutive reports below the quiet
    /// density threshold. The next report re-seeds from raw coordinates.
    AfterQuietEvents(u32),
}

/// Mutable state of the tracked hazard.
#[derive(Debug, Clone)]
pub struct HazardTrack {
    active: bool,
    positions: Vec<TrackPoint>,
    speed_kmh: f64,
    policy: DeactivationPolicy,
    quiet_streak: u32,
}

impl HazardTrack {
    /// Create an inactive track moving at `speed_kmh`.
    pub const fn new(speed_kmh: f64, policy: DeactivationPolicy) -> Self {
        Self {
            active: false,
            positions: Vec::new(),
            speed_kmh,
            policy,
            quiet_streak: 0,
        }
    }

    /// Whether the track has been seeded and not deactivated.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Configured forward speed.
    pub const fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Every recorded position, oldest first.
    pub fn positions(&self) -> &[TrackPoint] {
        &self.positions
    }

    /// The most recent position, if any.
    pub fn current(&self) -> Option<&TrackPoint> {
        self.positions.last()
    }

    /// Degrees travelled per step.
    pub fn step_degrees(&self) -> f64 {
        self.speed_kmh * STEP_HOURS / KM_PER_DEGREE
    }

    /// Record one report and return the new track position.
    ///
    /// Inactive: activate and record the raw coordinates. Active: step
    /// from the last position toward the nearest zone centroid, ignoring
    /// the raw coordinates.
    pub fn advance(
        &mut self,
        raw_lat: f64,
        raw_lon: f64,
        zones: &ZoneSet,
        now: DateTime<Utc>,
    ) -> TrackPoint {
        let point = match (self.active, self.positions.last()) {
            (true, Some(last)) => {
                let (lat, lon) = self.step_from(last.latitude, last.longitude, zones);
                TrackPoint {
                    latitude: lat,
                    longitude: lon,
                    recorded_at: now,
                }
            }
            _ => {
                self.active = true;
                self.quiet_streak = 0;
                debug!(lat = raw_lat, lon = raw_lon, "Hazard track activated");
                TrackPoint {
                    latitude: raw_lat,
                    longitude: raw_lon,
                    recorded_at: now,
                }
            }
        };
        self.positions.push(point);
        point
    }

    /// Feed the density of the report just recorded into the
    /// deactivation policy.
    pub fn observe_density(&mut self, density: f64, quiet_below: f64) {
        let DeactivationPolicy::AfterQuietEvents(limit) = self.policy else {
            return;
        };
        if density < quiet_below {
            self.quiet_streak = self.quiet_streak.saturating_add(1);
        } else {
            self.quiet_streak = 0;
        }
        if self.active && limit > 0 && self.quiet_streak >= limit {
            self.active = false;
            self.quiet_streak = 0;
            debug!(limit, "Hazard track deactivated after quiet reports");
        }
    }

    /// One step from `(lat, lon)` toward the nearest zone centroid.
    fn step_from(&self, lat: f64, lon: f64, zones: &ZoneSet) -> (f64, f64) {
        let Some(target) = zones.nearest(lat, lon) else {
            return (lat, lon);
        };
        let (target_lat, target_lon) = target.centroid();
        let delta = self.step_degrees();
        let next_lat = lat + delta * unit_direction(target_lat - lat);
        let next_lon = lon + delta * unit_direction(target_lon - lon);
        (
            round_to(next_lat, POSITION_DECIMALS),
            round_to(next_lon, POSITION_DECIMALS),
        )
    }
}

/// Sign of `d`, scaled down linearly once `|d|` falls under the epsilon.
fn unit_direction(d: f64) -> f64 {
    d / d.abs().max(AXIS_EPSILON)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hazard_types::Zone;

    use super::*;

    fn track() -> HazardTrack {
        HazardTrack::new(18.0, DeactivationPolicy::Never)
    }

    #[test]
    fn starts_inactive_and_empty() {
        let t = track();
        assert!(!t.is_active());
        assert!(t.positions().is_empty());
    }

    #[test]
    fn first_report_seeds_raw_position() {
        let mut t = track();
        let p = t.advance(13.0, 80.3, &ZoneSet::coastal(), Utc::now());
        assert!(t.is_active());
        assert!((p.latitude - 13.0).abs() < f64::EPSILON);
        assert!((p.longitude - 80.3).abs() < f64::EPSILON);
    }

    #[test]
    fn later_reports_step_toward_nearest_centroid() {
        let mut t = track();
        let zones = ZoneSet::coastal();
        t.advance(13.0, 80.3, &zones, Utc::now());
        // Raw coordinates of the second report are ignored.
        let p = t.advance(0.0, 0.0, &zones, Utc::now());

        // Andhra Pradesh centroid is (15.75, 83.0): north-east.
        let step = 18.0 * (10.0 / 60.0) / 111.0;
        assert!((p.latitude - round_to(13.0 + step, 4)).abs() < 1e-9);
        assert!((p.longitude - round_to(80.3 + step, 4)).abs() < 1e-9);
    }

    #[test]
    fn positions_are_rounded_to_four_places() {
        let mut t = track();
        let zones = ZoneSet::coastal();
        t.advance(13.0, 80.3, &zones, Utc::now());
        let p = t.advance(0.0, 0.0, &zones, Utc::now());
        assert!((p.latitude * 10_000.0 - (p.latitude * 10_000.0).round()).abs() < 1e-6);
    }

    #[test]
    fn axis_already_aligned_barely_moves() {
        let zones = ZoneSet::new(vec![Zone::new("Box", (9.0, 11.0), (79.0, 81.0))]).unwrap();
        let mut t = track();
        // Start exactly on the centroid latitude.
        t.advance(10.0, 85.0, &zones, Utc::now());
        let p = t.advance(0.0, 0.0, &zones, Utc::now());
        assert!((p.latitude - 10.0).abs() < 1e-9);
        assert!(p.longitude < 85.0);
        assert!(p.latitude.is_finite() && p.longitude.is_finite());
    }

    #[test]
    fn length_tracks_report_count_and_never_deactivates() {
        let mut t = track();
        let zones = ZoneSet::coastal();
        for n in 1..=25 {
            t.advance(13.0, 80.3, &zones, Utc::now());
            t.observe_density(0.0, 0.3);
            assert!(t.is_active());
            assert_eq!(t.positions().len(), n);
        }
    }

    #[test]
    fn track_converges_on_centroid() {
        let mut t = track();
        let zones = ZoneSet::coastal();
        t.advance(13.0, 80.3, &zones, Utc::now());
        for _ in 0..500 {
            t.advance(0.0, 0.0, &zones, Utc::now());
        }
        let last = t.current().unwrap();
        // Inside Andhra Pradesh the nearest zone is itself, so it settles
        // near its centroid.
        assert!((last.latitude - 15.75).abs() < 0.05, "lat {}", last.latitude);
        assert!((last.longitude - 83.0).abs() < 0.05, "lon {}", last.longitude);
    }

    #[test]
    fn empty_zone_set_holds_position() {
        let zones = ZoneSet::new(Vec::new()).unwrap();
        let mut t = track();
        t.advance(13.0, 80.3, &zones, Utc::now());
        let p = t.advance(0.0, 0.0, &zones, Utc::now());
        assert!((p.latitude - 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn quiet_policy_deactivates_and_reseeds() {
        let zones = ZoneSet::coastal();
        let mut t = HazardTrack::new(18.0, DeactivationPolicy::AfterQuietEvents(2));
        t.advance(13.0, 80.3, &zones, Utc::now());
        t.observe_density(0.1, 0.3);
        assert!(t.is_active());
        t.advance(0.0, 0.0, &zones, Utc::now());
        t.observe_density(0.1, 0.3);
        assert!(!t.is_active());

        let p = t.advance(20.0, 86.0, &zones, Utc::now());
        assert!(t.is_active());
        assert!((p.latitude - 20.0).abs() < f64::EPSILON);
        assert_eq!(t.positions().len(), 3);
    }

    #[test]
    fn loud_report_resets_quiet_streak() {
        let zones = ZoneSet::coastal();
        let mut t = HazardTrack::new(18.0, DeactivationPolicy::AfterQuietEvents(2));
        t.advance(13.0, 80.3, &zones, Utc::now());
        t.observe_density(0.1, 0.3);
        t.advance(0.0, 0.0, &zones, Utc::now());
        t.observe_density(0.5, 0.3);
        t.advance(0.0, 0.0, &zones, Utc::now());
        t.observe_density(0.1, 0.3);
        assert!(t.is_active());
    }
}
