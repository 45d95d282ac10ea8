//! Anti-starvation monitor.
//!
//! Counts consecutive cycles in which a hazard category produced no
//! qualifying event. When a counter reaches the limit the category is
//! reported as due and its counter restarts from zero, so no category can
//! stay silent for more than `limit` cycles.

use std::collections::{BTreeMap, BTreeSet};

use hazard_types::HazardKind;
use tracing::debug;

/// Categories guarded against starvation.
pub const GUARDED: [HazardKind; 2] = [HazardKind::Tsunami, HazardKind::Landslide];

/// Per-category gap counters.
#[derive(Debug, Clone)]
pub struct StarvationMonitor {
    limit: u32,
    counters: BTreeMap<HazardKind, u32>,
}

impl StarvationMonitor {
    /// Create a monitor that forces an event after `limit` silent cycles.
    ///
    /// A limit of zero is treated as one.
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            counters: GUARDED.iter().map(|&kind| (kind, 0)).collect(),
        }
    }

    /// The configured limit.
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Record one cycle's natural events and return the categories that
    /// must be forced this cycle.
    ///
    /// Unguarded kinds in `fired` (earthquakes) are ignored.
    pub fn record_cycle(&mut self, fired: &BTreeSet<HazardKind>) -> Vec<HazardKind> {
        let mut due = Vec::new();
        for (kind, counter) in &mut self.counters {
            if fired.contains(kind) {
                *counter = 0;
                continue;
            }
            *counter = counter.saturating_add(1);
            if *counter >= self.limit {
                debug!(kind = %kind, gap = *counter, "Gap limit reached");
                *counter = 0;
                due.push(*kind);
            }
        }
        due
    }

    /// Current gap counters.
    pub fn counters(&self) -> &BTreeMap<HazardKind, u32> {
        &self.counters
    }
}

impl Default for StarvationMonitor {
    fn default() -> Self {
        Self::new(5)
    }
}
