//! World construction: spawn entities, insert resources, sort the backlog.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, World};

use super::params::{DriverSpec, OrderSpec, ScenarioParams};
use super::{BatchState, OrderArrivals, OrderBacklog, PendingOrders};
use crate::clock::{mins_to_ms, SimMillis, SimulationClock};
use crate::dispatch::{build_policy, DispatchPolicyResource};
use crate::ecs::{Driver, DriverStatus, Order, OrderStatus, Position};
use crate::error::SimFault;
use crate::geo::Coordinate;
use crate::oracle::{build_distance_oracle, DistanceOracleResource};
use crate::telemetry::SimTelemetry;

/// Build a ready-to-run world from order and driver specs.
pub fn build_world(orders: &[OrderSpec], drivers: &[DriverSpec], params: ScenarioParams) -> World {
    let mut world = World::new();
    let cfg = params.config.clone();
    let oracle = build_distance_oracle(&params.oracle, cfg.avg_speed_kmh);

    let mut release: Vec<(SimMillis, Entity)> = Vec::with_capacity(orders.len());
    let mut points: Vec<Coordinate> = Vec::with_capacity(orders.len() * 2 + drivers.len());
    for spec in orders {
        let entity = world
            .spawn(Order {
                id: spec.order_id.clone(),
                pickup: spec.pickup,
                dropoff: spec.dropoff,
                created_at: spec.created_at,
                deadline: spec.deadline,
                estimated_mins: spec.estimated_mins,
                status: OrderStatus::Pending,
                assigned_to: None,
                pickup_time: None,
                dropoff_time: None,
            })
            .id();
        release.push((spec.created_at, entity));
        points.push(spec.pickup);
        points.push(spec.dropoff);
    }
    // Stable release order: creation time, then spawn order.
    release.sort_by_key(|&(created_at, entity)| (created_at, entity));
    let backlog: VecDeque<Entity> = release.into_iter().map(|(_, entity)| entity).collect();

    for spec in drivers {
        world.spawn((
            Driver {
                id: spec.driver_id.clone(),
                origin: spec.start,
                vehicle: spec.vehicle,
                capacity: spec.capacity,
                available_from: spec.available_from,
                status: DriverStatus::Idle,
                assigned_orders: Vec::new(),
                route: Vec::new(),
                current_stop_index: 0,
                eta_next_stop: None,
            },
            Position(spec.start),
        ));
        points.push(spec.start);
    }

    // Road-backed oracles answer every later leg from a warm cache.
    if cfg.use_road_distance {
        oracle.warm(&points);
    }

    world.insert_resource(SimulationClock::new(cfg.start_time, mins_to_ms(cfg.tick_mins)));
    world.insert_resource(DistanceOracleResource(oracle));
    world.insert_resource(DispatchPolicyResource::new(build_policy(params.policy)));
    world.insert_resource(OrderBacklog(backlog));
    world.insert_resource(PendingOrders::default());
    world.insert_resource(OrderArrivals::default());
    world.insert_resource(BatchState::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(SimFault::default());
    world.insert_resource(cfg);

    world
}
