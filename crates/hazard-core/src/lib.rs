//! Classification and tiered alert dispatch for the hazard alert system.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `hazard-config.yaml` into
//!   strongly-typed structs.
//! - [`severity`] -- Severity classifier, exposure density, forces table.
//! - [`subscriber`] -- [`Subscriber`] trait and per-tier groups.
//! - [`scheduler`] -- Delayed, cancellable civilian alerts.
//! - [`dispatch`] -- The [`Dispatcher`] tying it together.
//!
//! [`Subscriber`]: subscriber::Subscriber
//! [`Dispatcher`]: dispatch::Dispatcher

pub mod config;
pub mod dispatch;
pub mod scheduler;
pub mod severity;
pub mod subscriber;
