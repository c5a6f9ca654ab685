//! Shared fixtures for policy unit tests.

use bevy_ecs::prelude::Entity;

use super::types::{AuctionContext, DriverView, OrderView};
use crate::clock::{mins_to_ms, ONE_HOUR_MS, ONE_MIN_MS};
use crate::config::DispatchConfig;
use crate::ecs::{DriverStatus, VehicleClass};
use crate::geo::Coordinate;
use crate::oracle::DistanceOracle;

/// Auction fires one minute into the evening shift; orders are created on
/// the hour.
pub(crate) const CREATED: u64 = 17 * ONE_HOUR_MS;
pub(crate) const NOW: u64 = 17 * ONE_HOUR_MS + ONE_MIN_MS;

pub(crate) fn ctx_with<'a>(
    cfg: &'a DispatchConfig,
    oracle: &'a dyn DistanceOracle,
) -> AuctionContext<'a> {
    AuctionContext {
        now: NOW,
        order_rate_per_min: 0.0,
        cfg,
        oracle,
    }
}

pub(crate) fn pending_order(raw: u32, pickup: Coordinate, dropoff: Coordinate) -> OrderView {
    OrderView {
        entity: Entity::from_raw(raw),
        id: format!("O{raw}"),
        pickup,
        dropoff,
        created_at: CREATED,
        deadline: CREATED + mins_to_ms(30.0),
        estimated_mins: 30.0,
        picked_up: false,
    }
}

pub(crate) fn idle_driver(raw: u32, position: Coordinate) -> DriverView {
    DriverView {
        entity: Entity::from_raw(raw),
        id: format!("D{raw}"),
        position,
        vehicle: VehicleClass::Motorbike,
        capacity: 2,
        available_from: CREATED,
        status: DriverStatus::Idle,
        assigned: Vec::new(),
        existing_route_km: 0.0,
    }
}

pub(crate) fn accruing_driver(
    raw: u32,
    position: Coordinate,
    assigned: Vec<OrderView>,
    existing_route_km: f64,
) -> DriverView {
    DriverView {
        status: DriverStatus::Accruing,
        assigned,
        existing_route_km,
        ..idle_driver(raw, position)
    }
}
