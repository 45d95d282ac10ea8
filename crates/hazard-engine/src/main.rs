//! Hazard engine binary.
//!
//! This is the main entry point that wires together the tiered
//! dispatcher, the HTTP/WebSocket API, and the tectonic simulation loop.
//! It loads configuration, initializes all subsystems, and runs the
//! simulation until the operator stops it.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `hazard-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the zone set and the tiered dispatcher
//! 4. Create operator state from simulation bounds
//! 5. Start the API server
//! 6. Start the feeder that moves simulated events into the dispatcher
//! 7. Seed the simulation and enter the cycle loop
//! 8. Drain the feeder, flush pending civilian alerts, and exit

mod error;
mod sim_callback;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hazard_core::config::{HazardConfig, LogFormat};
use hazard_core::dispatch::Dispatcher;
use hazard_observer::state::AppState;
use hazard_sim::cycle::HazardSimulation;
use hazard_sim::models::ModelSet;
use hazard_sim::operator::{OperatorState, SimulationEndReason};
use hazard_sim::runner;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::sim_callback::SimulationCallback;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "hazard-config.yaml";

/// Application entry point for the hazard engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the API server cannot
/// bind its address.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config);
    info!(
        config_file = Path::new(CONFIG_PATH).exists(),
        tick_interval_ms = config.simulation.tick_interval_ms,
        gap_limit = config.simulation.gap_limit,
        authority_threshold = config.dispatch.authority_threshold,
        civilian_threshold = config.dispatch.civilian_threshold,
        "hazard-engine starting"
    );

    // 3. Build the dispatcher.
    let zones = config.zone_set()?;
    let dispatcher = Arc::new(Dispatcher::new(&config.dispatch, zones));
    info!(zones = config.zones.len(), "Dispatcher initialized");

    // 4. Create operator state.
    let operator = Arc::new(OperatorState::new(
        config.simulation.tick_interval_ms,
        config.simulation.max_cycles,
    ));

    // 5. Start the API server.
    let app_state = Arc::new(AppState::with_operator(
        Arc::clone(&dispatcher),
        Arc::clone(&operator),
    ));
    let server = hazard_observer::spawn_observer(&config.server, Arc::clone(&app_state))
        .await
        .map_err(|e| EngineError::Observer {
            message: format!("{e}"),
        })?;
    info!(host = config.server.host, port = config.server.port, "API server started");

    // 6. Start the feeder.
    let (feed, feeder) =
        sim_callback::spawn_feeder(Arc::clone(&app_state), config.simulation.simulated_exposure);
    let mut callback = SimulationCallback::new(Arc::clone(&app_state), feed);

    // 7. Seed and run the simulation.
    let rng = config
        .simulation
        .seed
        .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
    let mut simulation = HazardSimulation::new(
        rng,
        ModelSet::heuristic(),
        config.simulation.gap_limit,
        Duration::from_millis(config.simulation.classifier_timeout_ms),
    );

    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Interrupt received, stopping"),
                Err(e) => warn!(error = %e, "Failed to listen for interrupt"),
            }
            operator.request_stop();
        });
    }

    let result = runner::run_simulation(&mut simulation, &operator, &mut callback).await;
    runner::log_simulation_end(&result);

    // Ingestion stays available after a bounded run until the operator
    // stops the engine.
    if result.end_reason == SimulationEndReason::MaxCyclesReached {
        info!("Cycle limit reached, API remains available until stop");
        operator.stopped().await;
    }

    // 8. Drain and shut down.
    drop(callback);
    if let Err(e) = feeder.await {
        warn!(error = %e, "Feeder task failed");
    }
    dispatcher.shutdown().await;
    server.abort();

    info!(
        end_reason = ?result.end_reason,
        total_cycles = result.total_cycles,
        "hazard-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `hazard-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Without a file, defaults are used; environment overrides still apply.
fn load_config() -> Result<HazardConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(HazardConfig::from_file(config_path)?)
    } else {
        Ok(HazardConfig::parse("")?)
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(config: &HazardConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
