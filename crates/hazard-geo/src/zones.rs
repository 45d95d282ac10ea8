//! The validated set of hazard-exposure zones and queries over it.

use std::collections::BTreeSet;

use hazard_types::Zone;

use crate::distance::{distance_to_zone, impact_radius_km};
use crate::error::GeoError;

/// The four coastal states of the reference deployment, in lookup order.
pub fn default_coastal_zones() -> Vec<Zone> {
    vec![
        Zone::new("Odisha", (18.0, 22.5), (84.5, 88.8)),
        Zone::new("West Bengal", (21.5, 26.0), (86.5, 91.0)),
        Zone::new("Andhra Pradesh", (13.0, 18.5), (80.5, 85.5)),
        Zone::new("Tamil Nadu", (9.0, 11.8), (78.5, 82.0)),
    ]
}

/// An immutable, ordered collection of zones.
///
/// Order matters: it is the tie-break order for [`ZoneSet::nearest`] and
/// the output order of [`ZoneSet::affected`].
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Validate and wrap a list of zones.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if a bound is non-finite, a range is inverted,
    /// or two zones share a name.
    pub fn new(zones: Vec<Zone>) -> Result<Self, GeoError> {
        let mut names = BTreeSet::new();
        for zone in &zones {
            let bounds = [zone.lat_min, zone.lat_max, zone.lon_min, zone.lon_max];
            if bounds.iter().any(|b| !b.is_finite()) {
                return Err(GeoError::NonFinite {
                    name: zone.name.clone(),
                });
            }
            if zone.lat_min > zone.lat_max {
                return Err(GeoError::InvertedRange {
                    name: zone.name.clone(),
                    axis: "latitude",
                    min: zone.lat_min,
                    max: zone.lat_max,
                });
            }
            if zone.lon_min > zone.lon_max {
                return Err(GeoError::InvertedRange {
                    name: zone.name.clone(),
                    axis: "longitude",
                    min: zone.lon_min,
                    max: zone.lon_max,
                });
            }
            if !names.insert(zone.name.as_str()) {
                return Err(GeoError::DuplicateZone(zone.name.clone()));
            }
        }
        Ok(Self { zones })
    }

    /// The reference coastal zone set.
    pub fn coastal() -> Self {
        Self {
            zones: default_coastal_zones(),
        }
    }

    /// All zones in configuration order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The zone closest to the point; the first one wins on exact ties.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<&Zone> {
        let mut best: Option<(&Zone, f64)> = None;
        for zone in &self.zones {
            let d = distance_to_zone(lat, lon, zone);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ if d.is_nan() => {}
                _ => best = Some((zone, d)),
            }
        }
        best.map(|(zone, _)| zone)
    }

    /// Smallest point-to-zone distance across the set.
    pub fn min_distance_km(&self, lat: f64, lon: f64) -> Option<f64> {
        self.zones
            .iter()
            .map(|zone| distance_to_zone(lat, lon, zone))
            .filter(|d| !d.is_nan())
            .reduce(f64::min)
    }

    /// Names of zones within the density-derived impact radius.
    pub fn affected(&self, lat: f64, lon: f64, density: f64) -> Vec<String> {
        let radius = impact_radius_km(density);
        self.zones
            .iter()
            .filter(|zone| distance_to_zone(lat, lon, zone) <= radius)
            .map(|zone| zone.name.clone())
            .collect()
    }
}

impl Default for ZoneSet {
    fn default() -> Self {
        Self::coastal()
    }
}
