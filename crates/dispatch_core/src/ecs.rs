//! Domain components: orders, drivers, and route stops.

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::clock::SimMillis;
use crate::geo::Coordinate;

/// Order lifecycle. Transitions are strictly forward:
/// `Pending → Assigned → PickedUp → Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderStatus {
    Pending,
    Assigned,
    PickedUp,
    Delivered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Motorbike,
    Bike,
    Car,
}

impl VehicleClass {
    /// Parse a vehicle type as it appears in courier files.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motorbike" => Some(Self::Motorbike),
            "bike" => Some(Self::Bike),
            "car" => Some(Self::Car),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motorbike => "motorbike",
            Self::Bike => "bike",
            Self::Car => "car",
        }
    }
}

/// Driver state machine.
///
/// - `Idle`: no assigned orders, may bid on anything.
/// - `Accruing`: at least one pickup still pending; more orders may be
///   attached while capacity allows.
/// - `Delivering`: all pickups done, route frozen until exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Idle,
    Accruing,
    Delivering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Pickup,
    Dropoff,
}

/// One stop in a driver's route. Orders are referenced by entity id; the
/// world is the central index that resolves them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub location: Coordinate,
    pub kind: StopKind,
    pub order: Entity,
}

#[derive(Debug, Clone, Component)]
pub struct Order {
    pub id: String,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub created_at: SimMillis,
    pub deadline: SimMillis,
    pub estimated_mins: f64,
    pub status: OrderStatus,
    /// Owning driver once assigned; cleared never (orders keep their final owner).
    pub assigned_to: Option<Entity>,
    pub pickup_time: Option<SimMillis>,
    pub dropoff_time: Option<SimMillis>,
}

#[derive(Debug, Clone, Component)]
pub struct Driver {
    pub id: String,
    pub origin: Coordinate,
    pub vehicle: VehicleClass,
    pub capacity: usize,
    pub available_from: SimMillis,
    pub status: DriverStatus,
    pub assigned_orders: Vec<Entity>,
    pub route: Vec<Stop>,
    pub current_stop_index: usize,
    pub eta_next_stop: Option<SimMillis>,
}

impl Driver {
    pub fn has_capacity(&self) -> bool {
        self.assigned_orders.len() < self.capacity
    }

    /// Stops not yet visited.
    pub fn remaining_stops(&self) -> &[Stop] {
        &self.route[self.current_stop_index.min(self.route.len())..]
    }
}

/// Current position, separate from the driver record so movement and
/// auction systems can borrow them independently.
#[derive(Debug, Clone, Copy, Component)]
pub struct Position(pub Coordinate);
