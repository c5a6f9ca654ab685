//! Pluggable distance backends: trait abstraction over geographic queries.
//!
//! Two implementations, selectable via [`OracleKind`]:
//!
//! - **`HaversineOracle`**: great-circle distance plus constant-speed travel
//!   time. Zero dependencies, always available.
//! - **`OsrmBackend`** (feature `osrm`): queries an OSRM HTTP endpoint for
//!   road distance and duration, wrapped in [`CachedDistanceOracle`] which
//!   caches results and falls back to Haversine times a detour factor when
//!   the service is unreachable.
//!
//! The oracle is stored as an `Arc<dyn DistanceOracle>` ECS resource,
//! constructed from `OracleKind` during scenario building. It is read-only
//! after construction and safe to query from parallel bid sweeps.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::Resource;
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::geo::{haversine_km, pair_key, Coordinate, CoordKey};

/// Multiplier applied to Haversine distance when the road backend fails.
/// City road networks run 1.3-1.5x longer than the straight line.
pub const DETOUR_FACTOR: f64 = 1.4;

/// Default capacity for the road-result cache.
#[cfg(feature = "osrm")]
const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Read-only geographic queries. `distance_km` must be non-negative and
/// symmetric; `travel_time_mins` is the matching leg duration.
pub trait DistanceOracle: Send + Sync {
    fn distance_km(&self, a: Coordinate, b: Coordinate) -> f64;

    fn travel_time_mins(&self, a: Coordinate, b: Coordinate) -> f64;

    /// Pairwise distance matrix. The default builds it from individual
    /// queries; cached backends answer repeat lookups from memory.
    fn table(&self, points: &[Coordinate]) -> Vec<Vec<f64>> {
        points
            .iter()
            .map(|&a| points.iter().map(|&b| self.distance_km(a, b)).collect())
            .collect()
    }

    /// Pre-populate any internal cache for the given locations.
    fn warm(&self, _points: &[Coordinate]) {}
}

/// ECS resource wrapping the shared oracle.
#[derive(Resource, Clone)]
pub struct DistanceOracleResource(pub Arc<dyn DistanceOracle>);

impl std::ops::Deref for DistanceOracleResource {
    type Target = dyn DistanceOracle;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Which backend to use. Serializes into run parameters.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum OracleKind {
    /// Great-circle distance at a constant average speed.
    #[default]
    Haversine,
    /// OSRM HTTP endpoint (e.g. `"http://localhost:5000"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

// ---------------------------------------------------------------------------
// Haversine backend (always available)
// ---------------------------------------------------------------------------

pub struct HaversineOracle {
    avg_speed_kmh: f64,
}

impl HaversineOracle {
    pub fn new(avg_speed_kmh: f64) -> Self {
        Self { avg_speed_kmh }
    }
}

impl DistanceOracle for HaversineOracle {
    fn distance_km(&self, a: Coordinate, b: Coordinate) -> f64 {
        haversine_km(a, b)
    }

    fn travel_time_mins(&self, a: Coordinate, b: Coordinate) -> f64 {
        if self.avg_speed_kmh <= 0.0 {
            return f64::INFINITY;
        }
        self.distance_km(a, b) / self.avg_speed_kmh * 60.0
    }
}

// ---------------------------------------------------------------------------
// Fallible road backends + caching wrapper
// ---------------------------------------------------------------------------

/// A backend that may fail per query (e.g. an HTTP routing service).
/// Returns `(distance_km, duration_mins)` on success.
pub trait RoadBackend: Send + Sync {
    fn query(&self, a: Coordinate, b: Coordinate) -> Option<(f64, f64)>;
}

/// LRU-cached wrapper around a [`RoadBackend`].
///
/// Cache key is the symmetric quantized coordinate pair. On backend failure
/// the result falls back to Haversine distance times [`DETOUR_FACTOR`], with
/// travel time derived from the configured average speed; failures are also
/// cached so an unreachable service is not re-queried per leg.
pub struct CachedDistanceOracle {
    backend: Box<dyn RoadBackend>,
    avg_speed_kmh: f64,
    detour_factor: f64,
    cache: Mutex<LruCache<(CoordKey, CoordKey), (f64, f64)>>,
}

impl CachedDistanceOracle {
    pub fn new(backend: Box<dyn RoadBackend>, avg_speed_kmh: f64, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be > 0");
        Self {
            backend,
            avg_speed_kmh,
            detour_factor: DETOUR_FACTOR,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn fallback(&self, a: Coordinate, b: Coordinate) -> (f64, f64) {
        let km = haversine_km(a, b) * self.detour_factor;
        let mins = if self.avg_speed_kmh > 0.0 {
            km / self.avg_speed_kmh * 60.0
        } else {
            f64::INFINITY
        };
        (km, mins)
    }

    fn lookup(&self, a: Coordinate, b: Coordinate) -> (f64, f64) {
        let key = pair_key(a, b);

        {
            let mut cache = match self.cache.lock() {
                Ok(guard) => guard,
                Err(_) => return self.backend.query(a, b).unwrap_or_else(|| self.fallback(a, b)),
            };
            if let Some(&hit) = cache.get(&key) {
                return hit;
            }
        }

        let result = self
            .backend
            .query(a, b)
            .unwrap_or_else(|| self.fallback(a, b));

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, result);
        }
        result
    }
}

impl DistanceOracle for CachedDistanceOracle {
    fn distance_km(&self, a: Coordinate, b: Coordinate) -> f64 {
        self.lookup(a, b).0
    }

    fn travel_time_mins(&self, a: Coordinate, b: Coordinate) -> f64 {
        self.lookup(a, b).1
    }

    fn warm(&self, points: &[Coordinate]) {
        for (i, &a) in points.iter().enumerate() {
            for &b in points.iter().skip(i + 1) {
                self.lookup(a, b);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// OSRM backend (behind `osrm` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "osrm")]
pub mod osrm {
    use super::*;
    use reqwest::blocking::Client;
    use std::time::Duration;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Thin HTTP client for the OSRM route service.
    pub struct OsrmBackend {
        client: Client,
        endpoint: String,
    }

    impl OsrmBackend {
        pub fn new(endpoint: &str) -> Self {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client");
            Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            }
        }
    }

    /// Minimal OSRM JSON response structures.
    #[derive(Deserialize)]
    struct OsrmResponse {
        code: String,
        routes: Option<Vec<OsrmRoute>>,
    }

    #[derive(Deserialize)]
    struct OsrmRoute {
        distance: f64, // metres
        duration: f64, // seconds
    }

    impl RoadBackend for OsrmBackend {
        fn query(&self, a: Coordinate, b: Coordinate) -> Option<(f64, f64)> {
            // OSRM expects lng,lat order.
            let url = format!(
                "{}/route/v1/driving/{},{};{},{}?overview=false",
                self.endpoint, a.lng, a.lat, b.lng, b.lat,
            );
            let resp: OsrmResponse = self.client.get(&url).send().ok()?.json().ok()?;
            if resp.code != "Ok" {
                return None;
            }
            let route = resp.routes?.into_iter().next()?;
            Some((route.distance / 1000.0, route.duration / 60.0))
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Construct a shared oracle from an [`OracleKind`] descriptor.
pub fn build_distance_oracle(kind: &OracleKind, avg_speed_kmh: f64) -> Arc<dyn DistanceOracle> {
    match kind {
        OracleKind::Haversine => Arc::new(HaversineOracle::new(avg_speed_kmh)),

        #[cfg(feature = "osrm")]
        OracleKind::Osrm { endpoint } => Arc::new(CachedDistanceOracle::new(
            Box::new(osrm::OsrmBackend::new(endpoint)),
            avg_speed_kmh,
            DEFAULT_CACHE_CAPACITY,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingBackend;

    impl RoadBackend for FailingBackend {
        fn query(&self, _a: Coordinate, _b: Coordinate) -> Option<(f64, f64)> {
            None
        }
    }

    struct FixedBackend(f64, f64);

    impl RoadBackend for FixedBackend {
        fn query(&self, _a: Coordinate, _b: Coordinate) -> Option<(f64, f64)> {
            Some((self.0, self.1))
        }
    }

    #[test]
    fn haversine_travel_time_uses_average_speed() {
        let oracle = HaversineOracle::new(35.0);
        let a = Coordinate::new(25.20, 51.40);
        let b = Coordinate::new(25.30, 51.40);
        let km = oracle.distance_km(a, b);
        let mins = oracle.travel_time_mins(a, b);
        assert!((mins - km / 35.0 * 60.0).abs() < 1e-9);
    }

    #[test]
    fn cached_oracle_falls_back_with_detour_factor() {
        let oracle = CachedDistanceOracle::new(Box::new(FailingBackend), 35.0, 16);
        let a = Coordinate::new(25.20, 51.40);
        let b = Coordinate::new(25.30, 51.40);
        let expected = haversine_km(a, b) * DETOUR_FACTOR;
        assert!((oracle.distance_km(a, b) - expected).abs() < 1e-9);
        // Second query answers from cache with the same value.
        assert_eq!(oracle.distance_km(a, b), oracle.distance_km(b, a));
    }

    #[test]
    fn cached_oracle_prefers_backend_result() {
        let oracle = CachedDistanceOracle::new(Box::new(FixedBackend(3.2, 6.4)), 35.0, 16);
        let a = Coordinate::new(25.20, 51.40);
        let b = Coordinate::new(25.30, 51.40);
        assert_eq!(oracle.distance_km(a, b), 3.2);
        assert_eq!(oracle.travel_time_mins(a, b), 6.4);
    }

    #[test]
    fn table_is_square_with_zero_diagonal() {
        let oracle = HaversineOracle::new(35.0);
        let points = vec![
            Coordinate::new(25.20, 51.40),
            Coordinate::new(25.25, 51.45),
            Coordinate::new(25.30, 51.50),
        ];
        let table = oracle.table(&points);
        assert_eq!(table.len(), 3);
        for (i, row) in table.iter().enumerate() {
            assert_eq!(row.len(), 3);
            assert_eq!(row[i], 0.0);
        }
    }
}
