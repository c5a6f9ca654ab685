//! Synthetic scenario generation for demos, benches and load tests.
//!
//! Deterministic for a given seed, so generated scenarios double as
//! reproducibility fixtures.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{mins_to_ms, SimMillis, ONE_HOUR_MS};
use crate::ecs::VehicleClass;
use crate::geo::Coordinate;
use crate::scenario::{DriverSpec, OrderSpec};

/// Geographic bounding box for generated locations.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl BoundingBox {
    pub fn sample(&self, rng: &mut impl Rng) -> Coordinate {
        Coordinate::new(
            rng.gen_range(self.lat_min..self.lat_max),
            rng.gen_range(self.lng_min..self.lng_max),
        )
    }
}

impl Default for BoundingBox {
    /// Central Doha, the city the bundled datasets cover.
    fn default() -> Self {
        Self {
            lat_min: 25.20,
            lat_max: 25.38,
            lng_min: 51.42,
            lng_max: 51.58,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub seed: u64,
    pub bounds: BoundingBox,
    pub order_count: usize,
    pub driver_count: usize,
    /// When orders start arriving.
    pub window_start: SimMillis,
    /// Arrival window length in minutes.
    pub window_mins: u64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            seed: 42,
            bounds: BoundingBox::default(),
            order_count: 50,
            driver_count: 15,
            window_start: 17 * ONE_HOUR_MS,
            window_mins: 60,
        }
    }
}

/// Generate a matched set of orders and drivers.
pub fn generate_scenario(params: &GeneratorParams) -> (Vec<OrderSpec>, Vec<DriverSpec>) {
    let mut rng = StdRng::seed_from_u64(params.seed);

    let orders = (0..params.order_count)
        .map(|i| {
            let pickup = params.bounds.sample(&mut rng);
            let dropoff = params.bounds.sample(&mut rng);
            let created_at = params.window_start
                + mins_to_ms(rng.gen_range(0..params.window_mins.max(1)) as f64);
            let estimated_mins = rng.gen_range(20.0..40.0);
            OrderSpec {
                order_id: format!("O{i:04}"),
                pickup,
                dropoff,
                created_at,
                deadline: created_at + mins_to_ms(estimated_mins),
                estimated_mins,
            }
        })
        .collect();

    let drivers = (0..params.driver_count)
        .map(|i| {
            let roll: f64 = rng.gen();
            let vehicle = if roll < 0.6 {
                VehicleClass::Motorbike
            } else if roll < 0.8 {
                VehicleClass::Bike
            } else {
                VehicleClass::Car
            };
            DriverSpec {
                driver_id: format!("D{i:03}"),
                start: params.bounds.sample(&mut rng),
                vehicle,
                capacity: 2,
                available_from: params.window_start,
            }
        })
        .collect();

    (orders, drivers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic_per_seed() {
        let params = GeneratorParams::default();
        let (orders_a, drivers_a) = generate_scenario(&params);
        let (orders_b, drivers_b) = generate_scenario(&params);
        assert_eq!(orders_a.len(), orders_b.len());
        for (a, b) in orders_a.iter().zip(&orders_b) {
            assert_eq!(a.pickup, b.pickup);
            assert_eq!(a.created_at, b.created_at);
        }
        for (a, b) in drivers_a.iter().zip(&drivers_b) {
            assert_eq!(a.start, b.start);
            assert_eq!(a.vehicle, b.vehicle);
        }
    }

    #[test]
    fn generated_points_stay_in_bounds() {
        let params = GeneratorParams {
            order_count: 100,
            ..Default::default()
        };
        let (orders, drivers) = generate_scenario(&params);
        let bounds = params.bounds;
        for o in &orders {
            for p in [o.pickup, o.dropoff] {
                assert!((bounds.lat_min..bounds.lat_max).contains(&p.lat));
                assert!((bounds.lng_min..bounds.lng_max).contains(&p.lng));
            }
            assert!(o.deadline > o.created_at);
        }
        assert!(drivers.iter().all(|d| d.capacity == 2));
    }
}
