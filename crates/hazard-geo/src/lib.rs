//! Geospatial layer for the hazard alert system.
//!
//! - [`distance`] -- haversine, point-to-zone distance, impact radius, ETA
//! - [`zones`] -- the validated, ordered zone set
//! - [`track`] -- the moving hazard track state machine
//! - [`regions`] -- source regions, reference cities, observer point
//! - [`error`] -- zone validation errors

pub mod distance;
pub mod error;
pub mod regions;
pub mod track;
pub mod zones;

pub use distance::{distance_km, distance_to_zone, eta_hours, impact_radius_km, round_to};
pub use error::GeoError;
pub use regions::{CITIES, OBSERVER, Place, Region, distance_from_observer, nearest_city, random_point};
pub use track::{DeactivationPolicy, HazardTrack};
pub use zones::{ZoneSet, default_coastal_zones};
