//! Delayed civilian alerts.
//!
//! Each alert is a spawned task that sleeps for the configured delay and
//! then broadcasts to the civilian group as it exists at that moment.
//! Pending alerts are keyed by the triggering [`AlertEventId`] so they can
//! be cancelled one at a time. [`AlertScheduler::shutdown`] waits for every
//! pending alert to go out; a process that exits without calling it drops
//! them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hazard_types::{AlertEventId, AlertPayload, CivilianPayload, Severity, Tier};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::subscriber::SubscriberGroup;

/// Civilian alert content, stamped with the send time when it goes out.
#[derive(Debug, Clone, PartialEq)]
pub struct CivilianAlert {
    /// Plain-language warning.
    pub message: String,
    /// Severity grade.
    pub severity: Severity,
    /// Formatted arrival estimate.
    pub eta: Option<String>,
}

impl CivilianAlert {
    /// Wire payload sent at `sent_at`.
    pub fn into_payload(self, sent_at: DateTime<Utc>) -> CivilianPayload {
        CivilianPayload {
            role: Tier::Civilian,
            message: self.message,
            severity: self.severity,
            eta: self.eta,
            timestamp: sent_at,
        }
    }
}

type PendingMap = HashMap<AlertEventId, JoinHandle<()>>;

/// Schedules, cancels, and drains delayed civilian alerts.
#[derive(Debug)]
pub struct AlertScheduler {
    delay: Duration,
    pending: Arc<Mutex<PendingMap>>,
    closed: AtomicBool,
}

impl AlertScheduler {
    /// Create a scheduler with the given send delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            closed: AtomicBool::new(false),
        }
    }

    /// The configured delay.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `alert` for delivery to `group` after the delay.
    ///
    /// Returns `false` once the scheduler has been shut down.
    pub async fn schedule(
        &self,
        id: AlertEventId,
        group: Arc<SubscriberGroup>,
        alert: CivilianAlert,
    ) -> bool {
        if self.closed.load(Ordering::Acquire) {
            warn!(event = %id, "Scheduler is shut down, dropping civilian alert");
            return false;
        }

        // The entry is inserted while the lock is held, so the task cannot
        // try to remove itself before it is registered.
        let mut pending = self.pending.lock().await;
        // `shutdown` flips the flag under this lock before draining.
        if self.closed.load(Ordering::Acquire) {
            warn!(event = %id, "Scheduler shut down while scheduling, dropping civilian alert");
            return false;
        }
        let registry = Arc::clone(&self.pending);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let payload = AlertPayload::Civilian(alert.into_payload(Utc::now()));
            let outcome = group.broadcast(&payload).await;
            info!(
                event = %id,
                delivered = outcome.delivered,
                pruned = outcome.pruned,
                "Civilian alert sent"
            );
            registry.lock().await.remove(&id);
        });
        if let Some(previous) = pending.insert(id, handle) {
            previous.abort();
        }
        debug!(event = %id, delay_ms = delay.as_millis(), "Civilian alert scheduled");
        true
    }

    /// Cancel one pending alert. Returns whether it was still pending.
    pub async fn cancel(&self, id: AlertEventId) -> bool {
        let handle = self.pending.lock().await.remove(&id);
        match handle {
            Some(handle) => {
                handle.abort();
                info!(event = %id, "Civilian alert cancelled");
                true
            }
            None => false,
        }
    }

    /// Number of alerts waiting to go out.
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Stop accepting new alerts and wait for every pending one to be
    /// delivered.
    pub async fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().await;
            self.closed.store(true, Ordering::Release);
            pending.drain().map(|(_, h)| h).collect()
        };
        if handles.is_empty() {
            return;
        }
        info!(count = handles.len(), "Waiting for pending civilian alerts");
        for result in futures::future::join_all(handles).await {
            match result {
                Err(e) if !e.is_cancelled() => warn!(error = %e, "Civilian alert task failed"),
                _ => {}
            }
        }
    }
}
