//! Cycle callback that bridges the simulation to the API and dispatcher.
//!
//! The callback runs synchronously inside the cycle loop, so it only
//! broadcasts to `/ws/simulation` clients and hands the summary to a
//! feeder task. The feeder appends events to the recent-events log and
//! ingests each one into the tiered dispatcher.

use std::sync::Arc;

use hazard_observer::state::{AppState, CycleBroadcast};
use hazard_sim::cycle::CycleReport;
use hazard_sim::runner::CycleCallback;
use hazard_types::{HazardEvent, IngestReport, Severity};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Summaries buffered between the loop and the feeder.
const FEED_CAPACITY: usize = 64;

/// Callback that publishes each cycle.
pub struct SimulationCallback {
    state: Arc<AppState>,
    feed: mpsc::Sender<CycleBroadcast>,
}

impl SimulationCallback {
    /// Create a callback publishing to `state` and feeding `feed`.
    pub const fn new(state: Arc<AppState>, feed: mpsc::Sender<CycleBroadcast>) -> Self {
        Self { state, feed }
    }
}

impl CycleCallback for SimulationCallback {
    fn on_cycle(&mut self, report: &CycleReport) {
        let summary = CycleBroadcast::from(report);
        let receivers = self.state.broadcast(&summary);
        debug!(cycle = report.cycle, receivers, "Cycle broadcast sent");

        if let Err(e) = self.feed.try_send(summary) {
            warn!(cycle = report.cycle, error = %e, "Feeder is behind, dropping cycle summary");
        }
    }
}

/// The ingestion record for a simulated event.
///
/// The dispatcher has no dedicated intensity for CRITICAL, so simulated
/// critical events are declared HIGH to keep them at least as loud as
/// moderate ones.
pub fn to_report(event: &HazardEvent, exposure: u64) -> IngestReport {
    IngestReport::at(event.latitude, event.longitude, exposure)
        .declared(event.kind.as_str(), declared_severity(event.severity).as_str())
        .with_place(event.location.clone())
}

const fn declared_severity(severity: Severity) -> Severity {
    match severity {
        Severity::Critical => Severity::High,
        other => other,
    }
}

/// Spawn the feeder task.
///
/// The task exits once every sender is dropped and the buffer drains.
pub fn spawn_feeder(
    state: Arc<AppState>,
    exposure: u64,
) -> (mpsc::Sender<CycleBroadcast>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<CycleBroadcast>(FEED_CAPACITY);
    let handle = tokio::spawn(async move {
        while let Some(summary) = rx.recv().await {
            for event in &summary.events {
                match state.dispatcher.ingest(to_report(event, exposure)).await {
                    Ok(ack) => debug!(kind = %event.kind, density = ack.density, "Simulated event dispatched"),
                    Err(e) => warn!(kind = %event.kind, error = %e, "Simulated event rejected"),
                }
            }
            state.record(summary).await;
        }
        debug!("Feeder finished");
    });
    (tx, handle)
}
