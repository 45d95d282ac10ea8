//! Shared type definitions for the hazard tracking and alert system.
//!
//! Every type that crosses a crate or wire boundary lives here. Payload
//! types flow downstream to `TypeScript` via `ts-rs` for dashboard clients.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for events and subscribers
//! - [`enums`] -- Disaster kinds, severities, tiers, tectonic phases
//! - [`structs`] -- Zones, track points, classified events, scenarios
//! - [`alerts`] -- Tier-specific subscriber payloads
//! - [`ingest`] -- The ingestion record and its acknowledgement

pub mod alerts;
pub mod enums;
pub mod ids;
pub mod ingest;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use alerts::{AlertPayload, AuthorityPayload, CivilianPayload, MonitorPayload};
pub use enums::{
    DisasterType, FaultType, HazardKind, MonitorStatus, Phase, Severity, Tier, UnknownSeverity,
    ZoneType,
};
pub use ids::{AlertEventId, HazardEventId, SubscriberId};
pub use ingest::{IngestAck, IngestReport};
pub use structs::{ClassifiedEvent, HazardEvent, Scenario, TrackPoint, Zone};
