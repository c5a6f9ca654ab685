#![allow(dead_code)]

use bevy_ecs::prelude::World;

use dispatch_core::clock::{mins_to_ms, SimMillis, ONE_HOUR_MS, ONE_MIN_MS};
use dispatch_core::config::DispatchConfig;
use dispatch_core::dispatch::PolicyKind;
use dispatch_core::ecs::{Driver, DriverStatus, Order, OrderStatus, StopKind, VehicleClass};
use dispatch_core::geo::Coordinate;
use dispatch_core::runner::{run_to_completion, simulation_schedule, RunSummary};
use dispatch_core::scenario::{build_world, DriverSpec, OrderSpec, ScenarioParams};
use dispatch_core::telemetry::SimTelemetry;

pub const T17: SimMillis = 17 * ONE_HOUR_MS;

pub fn minute(m: u64) -> SimMillis {
    T17 + m * ONE_MIN_MS
}

pub fn order_spec(
    id: &str,
    pickup: Coordinate,
    dropoff: Coordinate,
    created_at: SimMillis,
    estimated_mins: f64,
) -> OrderSpec {
    OrderSpec {
        order_id: id.to_string(),
        pickup,
        dropoff,
        created_at,
        deadline: created_at + mins_to_ms(estimated_mins),
        estimated_mins,
    }
}

pub fn driver_spec(id: &str, start: Coordinate) -> DriverSpec {
    DriverSpec {
        driver_id: id.to_string(),
        start,
        vehicle: VehicleClass::Motorbike,
        capacity: 2,
        available_from: T17,
    }
}

/// Build a world for the given policy with default configuration.
pub fn world_for(orders: &[OrderSpec], drivers: &[DriverSpec], policy: PolicyKind) -> World {
    build_world(
        orders,
        drivers,
        ScenarioParams::default()
            .with_policy(policy)
            .with_config(DispatchConfig::default()),
    )
}

/// Build and run a scenario to completion, returning the finished world.
pub fn run_scenario(orders: &[OrderSpec], drivers: &[DriverSpec], policy: PolicyKind) -> World {
    let mut world = world_for(orders, drivers, policy);
    let mut schedule = simulation_schedule();
    let summary: RunSummary =
        run_to_completion(&mut world, &mut schedule).expect("run must not fault");
    assert!(summary.ticks > 0, "scenario should take at least one tick");
    world
}

pub fn delivered_count(world: &mut World) -> usize {
    world
        .query::<&Order>()
        .iter(world)
        .filter(|o| o.status == OrderStatus::Delivered)
        .count()
}

pub fn drivers_activated(world: &World) -> usize {
    world.resource::<SimTelemetry>().drivers_activated.len()
}

pub fn order_by_id(world: &mut World, id: &str) -> Order {
    world
        .query::<&Order>()
        .iter(world)
        .find(|o| o.id == id)
        .unwrap_or_else(|| panic!("order {id} not found"))
        .clone()
}

pub fn driver_by_id(world: &mut World, id: &str) -> Driver {
    world
        .query::<&Driver>()
        .iter(world)
        .find(|d| d.id == id)
        .unwrap_or_else(|| panic!("driver {id} not found"))
        .clone()
}

/// Structural invariants that must hold at every tick boundary.
pub fn assert_invariants(world: &mut World) {
    let drivers: Vec<Driver> = world.query::<&Driver>().iter(world).cloned().collect();
    for driver in &drivers {
        assert!(
            driver.assigned_orders.len() <= driver.capacity,
            "driver {} exceeds capacity",
            driver.id
        );

        for stop in driver.remaining_stops() {
            if stop.kind == StopKind::Pickup {
                assert_ne!(
                    driver.status,
                    DriverStatus::Delivering,
                    "driver {} is Delivering with a pickup outstanding",
                    driver.id
                );
            }
        }

        // Each order's pickup precedes its dropoff over the whole route.
        for (i, stop) in driver.route.iter().enumerate() {
            if stop.kind == StopKind::Dropoff {
                let has_earlier_pickup = driver.route[..i]
                    .iter()
                    .any(|s| s.kind == StopKind::Pickup && s.order == stop.order);
                let pickup_anywhere = driver
                    .route
                    .iter()
                    .any(|s| s.kind == StopKind::Pickup && s.order == stop.order);
                assert!(
                    has_earlier_pickup || !pickup_anywhere,
                    "driver {} routes a dropoff before its pickup",
                    driver.id
                );
            }
        }
    }
}
