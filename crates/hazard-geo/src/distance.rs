//! Great-circle distance and point-to-zone geometry.
//!
//! All functions here are pure. NaN inputs propagate as NaN; nothing
//! panics. Rectangle distance is the haversine distance to the clamped
//! nearest corner/edge point, which is an approximation of true geodesic
//! rectangle distance that is good enough for zones a few degrees wide.

use hazard_types::Zone;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per nautical mile.
pub const KM_PER_NAUTICAL_MILE: f64 = 1.852;

/// Base impact radius in nautical miles at zero density.
const BASE_IMPACT_NM: f64 = 150.0;

/// Extra impact radius in nautical miles at full density.
const DENSITY_IMPACT_NM: f64 = 200.0;

/// Haversine distance between two points in kilometres.
pub fn distance_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let d_phi = (lat_b - lat_a).to_radians();
    let d_lambda = (lon_b - lon_a).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Distance from a point to the nearest point of a zone rectangle.
///
/// Latitude and longitude are clamped into the zone's ranges
/// independently. A point inside the zone is at distance 0.
pub fn distance_to_zone(lat: f64, lon: f64, zone: &Zone) -> f64 {
    // max/min rather than f64::clamp so an inverted zone cannot panic.
    let clamped_lat = lat.max(zone.lat_min).min(zone.lat_max);
    let clamped_lon = lon.max(zone.lon_min).min(zone.lon_max);
    distance_km(lat, lon, clamped_lat, clamped_lon)
}

/// Impact radius in kilometres for a given density score.
pub fn impact_radius_km(density: f64) -> f64 {
    (BASE_IMPACT_NM + density * DENSITY_IMPACT_NM) * KM_PER_NAUTICAL_MILE
}

/// Hours to cover `distance_km` at `speed_kmh`, rounded to 1 decimal.
///
/// Returns `None` for a non-positive speed or a non-finite result.
pub fn eta_hours(distance_km: f64, speed_kmh: f64) -> Option<f64> {
    if speed_kmh.is_nan() || speed_kmh <= 0.0 {
        return None;
    }
    let hours = round_to(distance_km / speed_kmh, 1);
    hours.is_finite().then_some(hours)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
