//! Simulated hazard source for the alert system.
//!
//! A tectonic stress cycle drives synthetic scenarios; predictive models
//! turn them into earthquake, tsunami, and landslide events; an
//! anti-starvation monitor bounds how long any category stays silent.
//!
//! # Modules
//!
//! - [`tectonic`] -- BUILDUP / EVENT / RECOVERY state machine and scenario
//!   derivation.
//! - [`models`] -- Predictive-model traits, heuristic defaults, tsunami
//!   gating.
//! - [`starvation`] -- Gap counters and forced events.
//! - [`cycle`] -- [`HazardSimulation`], one cycle end to end.
//! - [`operator`] -- Pause, resume, speed, and stop controls.
//! - [`runner`] -- The cycle loop under operator control.
//!
//! [`HazardSimulation`]: cycle::HazardSimulation

pub mod cycle;
pub mod models;
pub mod operator;
pub mod runner;
pub mod starvation;
pub mod tectonic;
