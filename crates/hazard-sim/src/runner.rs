//! Simulation loop runner with operator controls.
//!
//! [`run_simulation`] drives [`HazardSimulation::run_cycle`] with:
//!
//! - **Bounded runs**: stop after `max_cycles`
//! - **Pause/resume**: the operator can halt and continue the loop
//! - **Variable speed**: the cycle interval is adjustable at runtime
//! - **Operator stop**: also interrupts the inter-cycle sleep
//!
//! Cycles never overlap: the next one starts only after the previous one
//! and its callback have finished.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use crate::cycle::{CycleReport, HazardSimulation};
use crate::operator::{OperatorState, SimulationEndReason};

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last cycle report, if any cycle completed.
    pub final_report: Option<CycleReport>,
    /// Total number of cycles executed.
    pub total_cycles: u64,
}

/// Callback invoked after each cycle completes.
///
/// Implementations publish the report to observers and feed events to
/// the dispatcher. The callback must not block; hand slow work to a task.
pub trait CycleCallback: Send {
    /// Called after a cycle completes.
    fn on_cycle(&mut self, report: &CycleReport);
}

/// A no-op cycle callback for testing.
pub struct NoOpCallback;

impl CycleCallback for NoOpCallback {
    fn on_cycle(&mut self, _report: &CycleReport) {}
}

/// Run the simulation loop until a termination condition is met.
pub async fn run_simulation<R: Rng + Send>(
    simulation: &mut HazardSimulation<R>,
    operator: &Arc<OperatorState>,
    callback: &mut dyn CycleCallback,
) -> SimulationResult {
    let mut last_report: Option<CycleReport> = None;
    let mut total_cycles: u64 = 0;

    info!(
        max_cycles = operator.max_cycles(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        if operator.is_paused() {
            info!("Simulation paused, waiting for resume...");
            operator.wait_if_paused().await;
            info!("Simulation resumed");
        }

        if operator.is_stop_requested() {
            info!("Operator stop requested");
            let reason = SimulationEndReason::OperatorStop;
            operator.set_end_reason(reason).await;
            return SimulationResult {
                end_reason: reason,
                final_report: last_report,
                total_cycles,
            };
        }

        let report = simulation.run_cycle().await;
        total_cycles = total_cycles.saturating_add(1);
        operator.record_cycle(report.cycle);

        callback.on_cycle(&report);

        if operator.cycle_limit_reached(report.cycle) {
            info!(
                cycle = report.cycle,
                max_cycles = operator.max_cycles(),
                "Cycle limit reached"
            );
            let reason = SimulationEndReason::MaxCyclesReached;
            operator.set_end_reason(reason).await;
            return SimulationResult {
                end_reason: reason,
                final_report: Some(report),
                total_cycles,
            };
        }

        last_report = Some(report);

        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(interval_ms)) => {}
                () = operator.stopped() => {}
            }
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_cycles = result.total_cycles,
        final_cycle = result.final_report.as_ref().map(|r| r.cycle),
        "Simulation ended"
    );

    if let Some(ref report) = result.final_report {
        info!(
            cycle = report.cycle,
            phase = ?report.phase,
            stress = report.stress,
            gaps = ?report.gap_counters,
            "Final cycle report"
        );
    } else {
        warn!("Simulation ended with no cycles executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::models::ModelSet;

    fn simulation() -> HazardSimulation<SmallRng> {
        HazardSimulation::new(
            SmallRng::seed_from_u64(3),
            ModelSet::heuristic(),
            5,
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn bounded_by_max_cycles() {
        let mut sim = simulation();
        let operator = Arc::new(OperatorState::new(0, 5));

        let result = run_simulation(&mut sim, &operator, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, SimulationEndReason::MaxCyclesReached);
        assert_eq!(result.total_cycles, 5);
        assert_eq!(result.final_report.unwrap().cycle, 5);
        assert_eq!(operator.cycles(), 5);
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxCyclesReached)
        );
    }

    #[tokio::test]
    async fn operator_stop() {
        let mut sim = simulation();
        let operator = Arc::new(OperatorState::new(0, 0));
        operator.request_stop();

        let result = run_simulation(&mut sim, &operator, &mut NoOpCallback).await;

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_cycles, 0);
        assert!(result.final_report.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_sleep() {
        let mut sim = simulation();
        let operator = Arc::new(OperatorState::new(60_000, 0));
        let stopper = {
            let operator = Arc::clone(&operator);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                operator.request_stop();
            })
        };

        let started = tokio::time::Instant::now();
        let result = run_simulation(&mut sim, &operator, &mut NoOpCallback).await;
        stopper.await.unwrap();

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_cycles, 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn cycle_callback_is_called() {
        struct CountCallback {
            count: u64,
            last_cycle: u64,
        }
        impl CycleCallback for CountCallback {
            fn on_cycle(&mut self, report: &CycleReport) {
                self.count = self.count.saturating_add(1);
                self.last_cycle = report.cycle;
            }
        }

        let mut sim = simulation();
        let operator = Arc::new(OperatorState::new(0, 3));
        let mut cb = CountCallback {
            count: 0,
            last_cycle: 0,
        };

        let _ = run_simulation(&mut sim, &operator, &mut cb).await;

        assert_eq!(cb.count, 3);
        assert_eq!(cb.last_cycle, 3);
    }

    #[test]
    fn variable_speed_changes_interval() {
        let operator = OperatorState::new(1000, 0);
        let _ = operator.set_tick_interval_ms(500);
        assert_eq!(operator.tick_interval_ms(), 500);
    }
}
