//! Auction data: read-only snapshots handed to policies and the assignments
//! they hand back.

use bevy_ecs::prelude::Entity;

use crate::clock::SimMillis;
use crate::config::DispatchConfig;
use crate::ecs::{DriverStatus, Stop, VehicleClass};
use crate::geo::Coordinate;
use crate::oracle::DistanceOracle;

/// Read-only snapshot of an order used during the auction.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub entity: Entity,
    pub id: String,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub created_at: SimMillis,
    pub deadline: SimMillis,
    pub estimated_mins: f64,
    pub picked_up: bool,
}

/// Working snapshot of an eligible driver. Policies update `assigned`,
/// `existing_route_km` and `status` locally as assignments land within the
/// tick, so later bids see earlier wins.
#[derive(Debug, Clone)]
pub struct DriverView {
    pub entity: Entity,
    pub id: String,
    pub position: Coordinate,
    pub vehicle: VehicleClass,
    pub capacity: usize,
    pub available_from: SimMillis,
    pub status: DriverStatus,
    pub assigned: Vec<OrderView>,
    /// Length of the committed remaining route from the current position.
    pub existing_route_km: f64,
}

impl DriverView {
    pub fn has_capacity(&self) -> bool {
        self.assigned.len() < self.capacity
    }
}

/// A candidate contract: the driver's full prospective order set together
/// with a concrete precedence-respecting visit sequence and its distance.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub orders: Vec<OrderView>,
    pub stops: Vec<Stop>,
    pub distance_km: f64,
}

/// A winning (driver, bundle) pairing, ready to apply to the world.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub driver: Entity,
    /// The driver's full assigned order set after this assignment.
    pub orders: Vec<Entity>,
    pub route: Vec<Stop>,
    pub total_distance_km: f64,
    /// Orders newly drawn from the pending queue.
    pub new_orders: Vec<Entity>,
    /// True when the SLA rejection was bypassed via the nearest-driver rule.
    pub fallback: bool,
}

/// Per-tick auction inputs shared by all policies.
pub struct AuctionContext<'a> {
    pub now: SimMillis,
    /// Order inflow over the rolling rate window, in orders per minute.
    pub order_rate_per_min: f64,
    pub cfg: &'a DispatchConfig,
    pub oracle: &'a dyn DistanceOracle,
}
