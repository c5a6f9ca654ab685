//! Geographic primitives: coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Quantization factor for cache keys: 1e-5 degrees is roughly one metre.
const KEY_SCALE: f64 = 1e5;

/// A WGS-84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lng1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lng2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlng = (dlng * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// A coordinate quantized for use as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    lat_e5: i64,
    lng_e5: i64,
}

impl From<Coordinate> for CoordKey {
    fn from(c: Coordinate) -> Self {
        Self {
            lat_e5: (c.lat * KEY_SCALE).round() as i64,
            lng_e5: (c.lng * KEY_SCALE).round() as i64,
        }
    }
}

/// Symmetric cache key: smaller endpoint first, doubling the hit rate for
/// bidirectional queries.
pub fn pair_key(a: Coordinate, b: Coordinate) -> (CoordKey, CoordKey) {
    let (ka, kb) = (CoordKey::from(a), CoordKey::from(b));
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}
