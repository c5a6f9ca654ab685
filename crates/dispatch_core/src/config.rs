//! Dispatch configuration: one immutable record threaded through the run.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::{SimMillis, ONE_HOUR_MS};
use crate::ecs::VehicleClass;

/// All tunable parameters for a simulation run. Constructed once, inserted as
/// a resource, and never mutated afterwards.
#[derive(Debug, Clone, Resource, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Simulation clock bounds (ms since midnight).
    pub start_time: SimMillis,
    pub end_time: SimMillis,
    /// Clock advance per tick in minutes.
    pub tick_mins: f64,

    /// Minutes to accumulate pending orders before an auction.
    pub batch_window_mins: f64,
    /// Orders/minute at which the adaptive policy switches to combinatorial.
    pub high_load_threshold: f64,
    /// Window (minutes) for the rolling order-rate estimate.
    pub combinatorial_window_mins: f64,

    /// Cap on orders per candidate bundle.
    pub max_bundle_size: usize,
    /// Pickup proximity under which order pairs are emitted as bundles (km).
    pub max_pickup_distance_km: f64,

    /// Cost weights for marginal distance and projected delay.
    pub w_distance: f64,
    pub w_delay: f64,
    /// Cost reduction per additional order in a bundle.
    pub bundle_discount_per_order: f64,
    /// Hard SLA: bids projecting a delivery older than this are rejected.
    pub max_delivery_time_mins: f64,

    /// Handover time spent at every stop.
    pub service_time_mins: f64,
    /// Average speed used to turn distances into travel time.
    pub avg_speed_kmh: f64,

    /// Vehicle cost multipliers.
    pub penalty_motorbike: f64,
    pub penalty_bike: f64,
    pub penalty_car: f64,

    /// Use the road-distance backend instead of plain Haversine.
    pub use_road_distance: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            start_time: 17 * ONE_HOUR_MS,
            end_time: 22 * ONE_HOUR_MS,
            tick_mins: 1.0,
            batch_window_mins: 1.0,
            high_load_threshold: 2.0,
            combinatorial_window_mins: 5.0,
            max_bundle_size: 2,
            max_pickup_distance_km: 5.0,
            w_distance: 1.0,
            w_delay: 1.5,
            bundle_discount_per_order: 0.25,
            max_delivery_time_mins: 52.0,
            service_time_mins: 5.0,
            avg_speed_kmh: 35.0,
            penalty_motorbike: 1.0,
            penalty_bike: 1.2,
            penalty_car: 1.4,
            use_road_distance: false,
        }
    }
}

impl DispatchConfig {
    /// Cost multiplier for a vehicle class.
    pub fn vehicle_penalty(&self, vehicle: VehicleClass) -> f64 {
        match vehicle {
            VehicleClass::Motorbike => self.penalty_motorbike,
            VehicleClass::Bike => self.penalty_bike,
            VehicleClass::Car => self.penalty_car,
        }
    }

    pub fn with_time_bounds(mut self, start: SimMillis, end: SimMillis) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_batch_window_mins(mut self, mins: f64) -> Self {
        self.batch_window_mins = mins;
        self
    }

    pub fn with_max_bundle_size(mut self, size: usize) -> Self {
        self.max_bundle_size = size;
        self
    }

    pub fn with_max_delivery_time_mins(mut self, mins: f64) -> Self {
        self.max_delivery_time_mins = mins;
        self
    }

    pub fn with_avg_speed_kmh(mut self, kmh: f64) -> Self {
        self.avg_speed_kmh = kmh;
        self
    }

    pub fn with_high_load_threshold(mut self, per_min: f64) -> Self {
        self.high_load_threshold = per_min;
        self
    }
}
