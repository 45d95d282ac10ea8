//! Simulation geography: hazard source regions, reference cities, and the
//! fixed observer point that `distance_km` on simulated events is measured
//! from.

use rand::Rng;

use crate::distance::{distance_km, round_to};

/// A named reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    /// Display name.
    pub name: &'static str,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Place {
    const fn new(name: &'static str, latitude: f64, longitude: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
        }
    }
}

/// Cities used to label simulated events.
pub const CITIES: [Place; 13] = [
    Place::new("Srinagar", 34.08, 74.79),
    Place::new("Shimla", 31.10, 77.17),
    Place::new("Dehradun", 30.32, 78.03),
    Place::new("Delhi", 28.61, 77.20),
    Place::new("Jaipur", 26.91, 75.79),
    Place::new("Ahmedabad", 23.02, 72.57),
    Place::new("Mumbai", 19.07, 72.87),
    Place::new("Bangalore", 12.97, 77.59),
    Place::new("Hyderabad", 17.38, 78.48),
    Place::new("Chennai", 13.08, 80.27),
    Place::new("Kochi", 9.93, 76.26),
    Place::new("Visakhapatnam", 17.69, 83.22),
    Place::new("Kolkata", 22.57, 88.36),
];

/// Fixed observer location (geographic centre of India).
pub const OBSERVER: Place = Place::new("Observer", 20.59, 78.96);

/// Default scatter around a source anchor, in degrees.
pub const DEFAULT_SPREAD: f64 = 0.6;

const HIMALAYAS: [(f64, f64); 3] = [(30.0, 79.0), (32.0, 77.0), (34.0, 75.0)];
const BAY_OF_BENGAL: [(f64, f64); 3] = [(12.0, 88.0), (14.0, 90.0), (16.0, 92.0)];
const ARABIAN_SEA: [(f64, f64); 2] = [(18.0, 66.0), (14.0, 70.0)];

/// A hazard source region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Himalayan thrust belt.
    Himalayas,
    /// Bay of Bengal subduction margin.
    BayOfBengal,
    /// Arabian Sea (Makran side).
    ArabianSea,
}

impl Region {
    /// Regions an earthquake may originate in.
    pub const SEISMIC: [Self; 3] = [Self::Himalayas, Self::BayOfBengal, Self::ArabianSea];

    /// Anchor points within the region.
    pub const fn anchors(self) -> &'static [(f64, f64)] {
        match self {
            Self::Himalayas => &HIMALAYAS,
            Self::BayOfBengal => &BAY_OF_BENGAL,
            Self::ArabianSea => &ARABIAN_SEA,
        }
    }

    /// Scatter used when an earthquake is placed in this region.
    pub const fn seismic_spread(self) -> f64 {
        match self {
            Self::Himalayas => DEFAULT_SPREAD,
            Self::BayOfBengal | Self::ArabianSea => 1.2,
        }
    }
}

/// A random point near one of the region's anchors, scattered uniformly by
/// up to `spread` degrees on each axis.
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, region: Region, spread: f64) -> (f64, f64) {
    let anchors = region.anchors();
    let idx = rng.random_range(0..anchors.len());
    let (lat, lon) = anchors.get(idx).copied().unwrap_or((OBSERVER.latitude, OBSERVER.longitude));
    let spread = spread.abs();
    if spread <= 0.0 || !spread.is_finite() {
        return (lat, lon);
    }
    (
        lat + rng.random_range(-spread..=spread),
        lon + rng.random_range(-spread..=spread),
    )
}

/// The reference city closest to the point.
pub fn nearest_city(lat: f64, lon: f64) -> &'static Place {
    let mut best = &OBSERVER;
    let mut best_d = f64::INFINITY;
    for city in &CITIES {
        let d = distance_km(lat, lon, city.latitude, city.longitude);
        if d < best_d {
            best = city;
            best_d = d;
        }
    }
    best
}

/// Distance from the observer point in kilometres, rounded to 1 decimal.
pub fn distance_from_observer(lat: f64, lon: f64) -> f64 {
    round_to(distance_km(OBSERVER.latitude, OBSERVER.longitude, lat, lon), 1)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn random_points_stay_within_spread() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let (lat, lon) = random_point(&mut rng, Region::BayOfBengal, 1.5);
            let near_anchor = BAY_OF_BENGAL
                .iter()
                .any(|(a_lat, a_lon)| (lat - a_lat).abs() <= 1.5 && (lon - a_lon).abs() <= 1.5);
            assert!(near_anchor, "({lat}, {lon}) is off every anchor");
        }
    }

    #[test]
    fn zero_spread_returns_anchor() {
        let mut rng = SmallRng::seed_from_u64(1);
        let point = random_point(&mut rng, Region::ArabianSea, 0.0);
        assert!(ARABIAN_SEA.contains(&point));
    }

    #[test]
    fn nearest_city_labels() {
        assert_eq!(nearest_city(13.0, 80.3).name, "Chennai");
        assert_eq!(nearest_city(32.0, 77.0).name, "Shimla");
        assert_eq!(nearest_city(16.0, 92.0).name, "Kolkata");
    }

    #[test]
    fn nearest_city_with_nan_falls_back_to_observer() {
        assert_eq!(nearest_city(f64::NAN, 80.0).name, "Observer");
    }

    #[test]
    fn observer_distance_is_rounded() {
        assert!(distance_from_observer(OBSERVER.latitude, OBSERVER.longitude).abs() < f64::EPSILON);
        let d = distance_from_observer(13.08, 80.27);
        assert!((d * 10.0 - (d * 10.0).round()).abs() < 1e-9);
        assert!(d > 800.0 && d < 900.0, "got {d}");
    }

    #[test]
    fn seismic_spreads() {
        assert!((Region::Himalayas.seismic_spread() - 0.6).abs() < f64::EPSILON);
        assert!((Region::BayOfBengal.seismic_spread() - 1.2).abs() < f64::EPSILON);
    }
}
