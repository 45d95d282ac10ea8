//! The tiered dispatcher.
//!
//! One [`Dispatcher::ingest`] call classifies a report, advances the hazard
//! track, recomputes affected zones around the track's position, and fans
//! out to the three tiers:
//!
//! | Tier | Gate | When |
//! |------|------|------|
//! | monitor | none | immediately |
//! | authority | density >= authority threshold | immediately |
//! | civilian | density >= civilian threshold and an affected zone | after the civilian delay |
//!
//! The whole call runs under the track lock, so reports are processed one
//! at a time and the track stays append-only and monotonically advanced.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hazard_geo::{HazardTrack, ZoneSet, eta_hours};
use hazard_types::{
    AlertEventId, AlertPayload, AuthorityPayload, ClassifiedEvent, DisasterType, IngestAck,
    IngestReport, MonitorPayload, Tier, TrackPoint, UnknownSeverity,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::DispatchConfig;
use crate::scheduler::{AlertScheduler, CivilianAlert};
use crate::severity::{self, SeveritySignal, Thresholds};
use crate::subscriber::TierGroups;

/// Reasons an ingestion record is rejected.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Latitude outside `[-90, 90]` or not a number.
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside `[-180, 180]` or not a number.
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Intensity outside `[0, 1]` or not finite.
    #[error("invalid intensity: {0}")]
    InvalidIntensity(f64),

    /// Declared severity label not recognised.
    #[error(transparent)]
    UnknownSeverity(#[from] UnknownSeverity),
}

/// Snapshot of the hazard track for status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackStatus {
    /// Whether the track is active.
    pub active: bool,
    /// Number of recorded positions.
    pub positions: usize,
    /// Latest position.
    pub current: Option<TrackPoint>,
    /// Forward speed.
    pub speed_kmh: f64,
}

/// Routes classified reports to the three subscriber tiers.
#[derive(Debug)]
pub struct Dispatcher {
    thresholds: Thresholds,
    zones: ZoneSet,
    track: Mutex<HazardTrack>,
    groups: TierGroups,
    scheduler: AlertScheduler,
}

impl Dispatcher {
    /// Create a dispatcher with empty subscriber groups and an inactive
    /// track.
    pub fn new(config: &DispatchConfig, zones: ZoneSet) -> Self {
        Self {
            thresholds: Thresholds {
                authority: config.authority_threshold,
                civilian: config.civilian_threshold,
            },
            zones,
            track: Mutex::new(HazardTrack::new(
                config.track_speed_kmh,
                config.track_deactivation,
            )),
            groups: TierGroups::new(),
            scheduler: AlertScheduler::new(Duration::from_secs(config.civilian_delay_secs)),
        }
    }

    /// Subscriber groups, for transport layers to register connections.
    pub const fn groups(&self) -> &TierGroups {
        &self.groups
    }

    /// Delayed civilian alert scheduler.
    pub const fn scheduler(&self) -> &AlertScheduler {
        &self.scheduler
    }

    /// Configured tier gates.
    pub const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Known zones.
    pub const fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    /// Ingest one report and acknowledge it with the computed density.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the report is malformed. Subscriber
    /// failures never surface here.
    pub async fn ingest(&self, report: IngestReport) -> Result<IngestAck, DispatchError> {
        let event = self.ingest_event(report).await?;
        Ok(IngestAck::processed(event.density))
    }

    /// Ingest one report and return the classified event.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the report is malformed.
    pub async fn ingest_event(&self, report: IngestReport) -> Result<ClassifiedEvent, DispatchError> {
        validate(&report)?;
        let classification = severity::classify(SeveritySignal::from_report(&report)?);
        let density = severity::density(classification.intensity, report.affected_people);

        let mut track = self.track.lock().await;
        let now = Utc::now();
        let position = track.advance(report.latitude, report.longitude, &self.zones, now);
        track.observe_density(density, self.thresholds.authority);

        let affected_zones = self.zones.affected(position.latitude, position.longitude, density);
        let eta = if classification.disaster_type.has_eta() {
            self.zones
                .min_distance_km(position.latitude, position.longitude)
                .and_then(|d| eta_hours(d, track.speed_kmh()))
        } else {
            None
        };

        let event = ClassifiedEvent {
            id: AlertEventId::new(),
            disaster_type: classification.disaster_type,
            severity: classification.severity,
            intensity: classification.intensity,
            density,
            latitude: position.latitude,
            longitude: position.longitude,
            affected_zones,
            eta_hours: eta,
            place: report.place,
            timestamp: now,
        };
        info!(
            event = %event.id,
            disaster_type = %event.disaster_type,
            severity = %event.severity,
            density = event.density,
            zones = event.affected_zones.len(),
            "Report classified"
        );

        self.fan_out(&event).await;
        drop(track);
        Ok(event)
    }

    async fn fan_out(&self, event: &ClassifiedEvent) {
        let monitor = monitor_payload(event, self.thresholds);
        let outcome = self
            .groups
            .monitor
            .broadcast(&AlertPayload::Monitor(monitor.clone()))
            .await;
        debug!(delivered = outcome.delivered, "Monitor payload sent");

        if self.thresholds.alerts_authority(event.density) {
            let payload = AuthorityPayload {
                monitor,
                role: Tier::Authority,
                eta_hours: event.eta_hours,
                recommended_forces: severity::recommended_forces(
                    &event.disaster_type,
                    event.severity,
                ),
            };
            let outcome = self
                .groups
                .authority
                .broadcast(&AlertPayload::Authority(payload))
                .await;
            info!(event = %event.id, delivered = outcome.delivered, "Authority alert sent");
        }

        if self
            .thresholds
            .alerts_civilians(event.density, &event.affected_zones)
        {
            self.scheduler
                .schedule(
                    event.id,
                    Arc::clone(&self.groups.civilian),
                    civilian_alert(event),
                )
                .await;
        }
    }

    /// Current state of the hazard track.
    pub async fn track_status(&self) -> TrackStatus {
        let track = self.track.lock().await;
        TrackStatus {
            active: track.is_active(),
            positions: track.positions().len(),
            current: track.current().copied(),
            speed_kmh: track.speed_kmh(),
        }
    }

    /// Wait for every scheduled civilian alert, then refuse new ones.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }
}

fn validate(report: &IngestReport) -> Result<(), DispatchError> {
    if !(-90.0..=90.0).contains(&report.latitude) {
        return Err(DispatchError::InvalidLatitude(report.latitude));
    }
    if !(-180.0..=180.0).contains(&report.longitude) {
        return Err(DispatchError::InvalidLongitude(report.longitude));
    }
    match report.intensity {
        Some(intensity) if !(0.0..=1.0).contains(&intensity) => {
            Err(DispatchError::InvalidIntensity(intensity))
        }
        _ => Ok(()),
    }
}

fn monitor_payload(event: &ClassifiedEvent, thresholds: Thresholds) -> MonitorPayload {
    MonitorPayload {
        latitude: event.latitude,
        longitude: event.longitude,
        place: event.place.clone(),
        disaster_type: event.disaster_type.clone(),
        severity: event.severity,
        density: event.density,
        affected_zones: event.affected_zones.clone(),
        status: thresholds.status(event.density),
        timestamp: event.timestamp,
    }
}

/// Plain-language warning for civilians.
pub fn civilian_message(disaster_type: &DisasterType, affected_zones: &[String]) -> String {
    format!("⚠️ {disaster_type} expected in {}", affected_zones.join(", "))
}

/// Human-readable ETA; a zero or missing estimate yields `None`.
pub fn format_eta(eta_hours: Option<f64>) -> Option<String> {
    eta_hours.filter(|h| *h > 0.0).map(|h| format!("~{h:.1} hours"))
}

fn civilian_alert(event: &ClassifiedEvent) -> CivilianAlert {
    CivilianAlert {
        message: civilian_message(&event.disaster_type, &event.affected_zones),
        severity: event.severity,
        eta: format_eta(event.eta_hours),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use hazard_types::{MonitorStatus, Severity, Zone};

    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&DispatchConfig::default(), ZoneSet::coastal())
    }

    fn chennai(people: u64, intensity: f64) -> IngestReport {
        IngestReport::at(13.0, 80.3, people).with_intensity(intensity)
    }

    #[tokio::test(start_paused = true)]
    async fn reference_scenario_reaches_every_tier() {
        let d = dispatcher();
        let (_m, mut monitor) = d.groups().monitor.subscribe(8).await;
        let (_a, mut authority) = d.groups().authority.subscribe(8).await;
        let (_c, mut civilian) = d.groups().civilian.subscribe(8).await;

        let event = d.ingest_event(chennai(900, 0.9)).await.unwrap();
        assert_eq!(event.disaster_type, DisasterType::Tsunami);
        assert_eq!(event.severity, Severity::High);
        assert!((event.density - 0.81).abs() < 1e-12);
        assert_eq!(event.affected_zones, vec!["Andhra Pradesh", "Tamil Nadu"]);
        assert_eq!(event.eta_hours, Some(1.2));

        let AlertPayload::Monitor(m) = monitor.try_recv().unwrap() else {
            panic!("expected monitor payload");
        };
        assert_eq!(m.status, MonitorStatus::Warning);

        let AlertPayload::Authority(a) = authority.try_recv().unwrap() else {
            panic!("expected authority payload");
        };
        assert_eq!(a.eta_hours, Some(1.2));
        assert!(a.recommended_forces.contains(&"Indian Navy".to_owned()));

        assert!(civilian.try_recv().is_err());
        tokio::time::sleep(Duration::from_secs(11)).await;
        let AlertPayload::Civilian(c) = civilian.try_recv().unwrap() else {
            panic!("expected civilian payload");
        };
        assert_eq!(c.message, "⚠️ Tsunami expected in Andhra Pradesh, Tamil Nadu");
        assert_eq!(c.eta.as_deref(), Some("~1.2 hours"));
    }

    #[tokio::test]
    async fn ack_carries_density() {
        let ack = dispatcher().ingest(chennai(900, 0.9)).await.unwrap();
        assert_eq!(ack.status, "processed");
        assert!((ack.density - 0.81).abs() < 1e-12);
    }

    #[tokio::test]
    async fn authority_gate_boundary() {
        let d = dispatcher();
        let (_a, mut authority) = d.groups().authority.subscribe(8).await;

        // 0.5 * 599 / 1000 = 0.2995
        d.ingest(chennai(599, 0.5)).await.unwrap();
        assert!(authority.try_recv().is_err());

        // 0.5 * 600 / 1000 = 0.3
        d.ingest(chennai(600, 0.5)).await.unwrap();
        assert!(authority.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn civilian_gate_needs_an_affected_zone() {
        // One zone far from the report, so nothing is affected.
        let zones = ZoneSet::new(vec![Zone::new("Far", (30.0, 31.0), (70.0, 71.0))]).unwrap();
        let d = Dispatcher::new(&DispatchConfig::default(), zones);
        let (_c, mut civilian) = d.groups().civilian.subscribe(8).await;

        // 0.75 * 800 / 1000 = 0.6
        let event = d.ingest_event(chennai(800, 0.75)).await.unwrap();
        assert!((event.density - 0.6).abs() < f64::EPSILON);
        assert!(event.affected_zones.is_empty());
        assert_eq!(d.scheduler().pending().await, 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(civilian.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn civilian_group_is_evaluated_at_send_time() {
        let d = dispatcher();
        let (leaver, mut early) = d.groups().civilian.subscribe(8).await;

        d.ingest(chennai(900, 0.9)).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        let (_joiner, mut late) = d.groups().civilian.subscribe(8).await;
        d.groups().civilian.remove(leaver).await;

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(late.try_recv().is_ok());
        assert!(early.try_recv().is_err());
    }

    #[tokio::test]
    async fn track_advances_from_second_report() {
        let d = dispatcher();
        d.ingest(chennai(100, 0.5)).await.unwrap();
        let second = d.ingest_event(IngestReport::at(0.0, 0.0, 100)).await.unwrap();
        // The raw (0, 0) is ignored; the track moved north-east.
        assert!(second.latitude > 13.0);
        assert!(second.longitude > 80.3);

        let status = d.track_status().await;
        assert!(status.active);
        assert_eq!(status.positions, 2);
    }

    #[tokio::test]
    async fn earthquake_has_no_eta() {
        let d = dispatcher();
        let event = d.ingest_event(chennai(900, 0.2)).await.unwrap();
        assert_eq!(event.disaster_type, DisasterType::Earthquake);
        assert!(event.eta_hours.is_none());
    }

    #[tokio::test]
    async fn zero_speed_yields_no_eta() {
        let config = DispatchConfig {
            track_speed_kmh: 0.0,
            ..DispatchConfig::default()
        };
        let d = Dispatcher::new(&config, ZoneSet::coastal());
        let event = d.ingest_event(chennai(900, 0.9)).await.unwrap();
        assert!(event.eta_hours.is_none());
    }

    #[tokio::test]
    async fn malformed_reports_are_rejected() {
        let d = dispatcher();
        assert!(matches!(
            d.ingest(IngestReport::at(91.0, 80.0, 1)).await,
            Err(DispatchError::InvalidLatitude(_))
        ));
        assert!(matches!(
            d.ingest(IngestReport::at(f64::NAN, 80.0, 1)).await,
            Err(DispatchError::InvalidLatitude(_))
        ));
        assert!(matches!(
            d.ingest(IngestReport::at(10.0, 181.0, 1)).await,
            Err(DispatchError::InvalidLongitude(_))
        ));
        assert!(matches!(
            d.ingest(chennai(1, -0.1)).await,
            Err(DispatchError::InvalidIntensity(_))
        ));
        assert!(matches!(
            d.ingest(IngestReport::at(10.0, 80.0, 1).declared("Cyclone", "extreme")).await,
            Err(DispatchError::UnknownSeverity(_))
        ));
        // Rejected reports never touch the track.
        assert!(!d.track_status().await.active);
    }

    #[tokio::test(start_paused = true)]
    async fn intensity_is_capped_at_one() {
        let d = dispatcher();
        assert!(matches!(
            d.ingest(chennai(100, 1.0001)).await,
            Err(DispatchError::InvalidIntensity(_))
        ));
        assert!(matches!(
            d.ingest(chennai(100, f64::INFINITY)).await,
            Err(DispatchError::InvalidIntensity(_))
        ));
        assert!(!d.track_status().await.active);

        let event = d.ingest_event(chennai(100, 1.0)).await.unwrap();
        assert!((event.intensity - 1.0).abs() < f64::EPSILON);
        assert!((event.density - 0.1).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_pending_civilian_alerts() {
        let d = dispatcher();
        let (_c, mut civilian) = d.groups().civilian.subscribe(8).await;
        d.ingest(chennai(900, 0.9)).await.unwrap();
        d.shutdown().await;
        assert!(civilian.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn civilian_message_uses_canonical_label() {
        let d = dispatcher();
        let (_c, mut civilian) = d.groups().civilian.subscribe(8).await;
        d.ingest(IngestReport::at(13.0, 80.3, 900).declared(" cyclone ", "high"))
            .await
            .unwrap();
        d.shutdown().await;

        let AlertPayload::Civilian(c) = civilian.try_recv().unwrap() else {
            panic!("expected civilian payload");
        };
        assert_eq!(c.message, "⚠️ Cyclone expected in Andhra Pradesh, Tamil Nadu");

        let unknown = DisasterType::from("Flash flood");
        assert_eq!(
            civilian_message(&unknown, &["Odisha".to_owned()]),
            "⚠️ Flash flood expected in Odisha"
        );
    }

    #[test]
    fn eta_formatting() {
        assert_eq!(format_eta(Some(1.2)).as_deref(), Some("~1.2 hours"));
        assert_eq!(format_eta(Some(3.0)).as_deref(), Some("~3.0 hours"));
        assert_eq!(format_eta(Some(0.0)), None);
        assert_eq!(format_eta(None), None);
    }
}
