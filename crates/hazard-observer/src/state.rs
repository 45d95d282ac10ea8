//! Shared application state for the observer API server.
//!
//! [`AppState`] holds the dispatcher that `POST /ingest` and the tier
//! sockets talk to, the broadcast channel for per-cycle simulation
//! summaries, and the bounded log of recent simulation events.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hazard_core::dispatch::Dispatcher;
use hazard_sim::cycle::CycleReport;
use hazard_sim::operator::OperatorState;
use hazard_types::{HazardEvent, HazardKind, Phase};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for cycle summaries.
///
/// A client that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
const BROADCAST_CAPACITY: usize = 256;

/// Number of simulation events kept for `GET /events`.
pub const MAX_EVENTS: usize = 50;

/// Per-connection buffer for tier subscribers. A client this far behind
/// is dropped from its tier.
pub const SUBSCRIBER_BUFFER: usize = 64;

/// JSON-serializable cycle summary pushed over `/ws/simulation`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CycleBroadcast {
    /// Cycle number.
    pub cycle: u64,
    /// Tectonic phase after the cycle.
    pub phase: Phase,
    /// Tectonic stress after the cycle.
    pub stress: f64,
    /// Events emitted this cycle.
    pub events: Vec<HazardEvent>,
    /// Gap counters after the cycle.
    pub gap_counters: BTreeMap<HazardKind, u32>,
    /// Categories whose model gave no signal.
    pub model_failures: Vec<HazardKind>,
    /// When the summary was published.
    pub published_at: DateTime<Utc>,
}

impl From<&CycleReport> for CycleBroadcast {
    fn from(report: &CycleReport) -> Self {
        Self {
            cycle: report.cycle,
            phase: report.phase,
            stress: report.stress,
            events: report.events.clone(),
            gap_counters: report.gap_counters.clone(),
            model_failures: report.model_failures.clone(),
            published_at: Utc::now(),
        }
    }
}

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// The tiered dispatcher.
    pub dispatcher: Arc<Dispatcher>,
    /// Broadcast sender for cycle summaries.
    pub tx: broadcast::Sender<CycleBroadcast>,
    /// Recent simulation events, oldest first.
    pub events: Arc<RwLock<VecDeque<HazardEvent>>>,
    /// The most recent cycle summary.
    pub latest: Arc<RwLock<Option<CycleBroadcast>>>,
    /// Shared operator control state (present when the simulation runs).
    pub operator_state: Option<Arc<OperatorState>>,
}

impl AppState {
    /// Application state without a running simulation.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            dispatcher,
            tx,
            events: Arc::new(RwLock::new(VecDeque::with_capacity(MAX_EVENTS))),
            latest: Arc::new(RwLock::new(None)),
            operator_state: None,
        }
    }

    /// Application state with operator control attached.
    pub fn with_operator(dispatcher: Arc<Dispatcher>, operator: Arc<OperatorState>) -> Self {
        Self {
            operator_state: Some(operator),
            ..Self::new(dispatcher)
        }
    }

    /// Subscribe to the cycle broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<CycleBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a cycle summary to all connected clients.
    ///
    /// Returns the number of receivers; zero when nobody is listening.
    pub fn broadcast(&self, summary: &CycleBroadcast) -> usize {
        self.tx.send(summary.clone()).unwrap_or(0)
    }

    /// Append a cycle's events to the log and remember it as the latest.
    pub async fn record(&self, summary: CycleBroadcast) {
        {
            let mut log = self.events.write().await;
            for event in &summary.events {
                if log.len() >= MAX_EVENTS {
                    log.pop_front();
                }
                log.push_back(event.clone());
            }
        }
        *self.latest.write().await = Some(summary);
    }

    /// Recent events, oldest first.
    pub async fn recent_events(&self) -> Vec<HazardEvent> {
        self.events.read().await.iter().cloned().collect()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("receivers", &self.tx.receiver_count())
            .field("operator", &self.operator_state.is_some())
            .finish_non_exhaustive()
    }
}
