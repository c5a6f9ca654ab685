//! Driver traversal: arrivals, stop handling, and state transitions.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::{mins_to_ms, SimulationClock};
use crate::config::DispatchConfig;
use crate::ecs::{Driver, DriverStatus, Order, OrderStatus, Position, StopKind};
use crate::oracle::DistanceOracleResource;
use crate::telemetry::{DeliveryRecord, SimTelemetry};

/// Advance every non-idle driver: process each stop whose ETA has passed,
/// update the order it serves, and schedule the next leg. The handover time
/// at a stop is charged against the next leg's arrival, so a stop's own
/// service never delays its own timestamp.
///
/// Transitions: Accruing → Delivering once only dropoffs remain,
/// Delivering → Idle once the route is exhausted.
pub fn advance_drivers_system(
    clock: Res<SimulationClock>,
    cfg: Res<DispatchConfig>,
    oracle: Res<DistanceOracleResource>,
    mut telemetry: ResMut<SimTelemetry>,
    mut drivers: Query<(Entity, &mut Driver, &mut Position)>,
    mut orders: Query<&mut Order>,
) {
    let now = clock.now();

    for (driver_entity, mut driver, mut position) in drivers.iter_mut() {
        if driver.status == DriverStatus::Idle {
            continue;
        }

        // A single tick can cover several short legs.
        while driver.status != DriverStatus::Idle
            && driver.current_stop_index < driver.route.len()
            && driver.eta_next_stop.is_some_and(|eta| eta <= now)
        {
            let stop = driver.route[driver.current_stop_index];

            telemetry.distance_km += oracle.distance_km(position.0, stop.location);
            position.0 = stop.location;
            telemetry.record_position(driver_entity, stop.location);

            let Ok(mut order) = orders.get_mut(stop.order) else {
                break;
            };
            match stop.kind {
                StopKind::Pickup => {
                    order.status = OrderStatus::PickedUp;
                    order.pickup_time = Some(now);
                }
                StopKind::Dropoff => {
                    order.status = OrderStatus::Delivered;
                    order.dropoff_time = Some(now);
                    telemetry.deliveries.push(DeliveryRecord {
                        order: stop.order,
                        driver: driver_entity,
                        created_at: order.created_at,
                        delivered_at: now,
                    });
                    driver.assigned_orders.retain(|&o| o != stop.order);
                }
            }

            driver.current_stop_index += 1;
            if driver.current_stop_index >= driver.route.len() {
                driver.status = DriverStatus::Idle;
                driver.route.clear();
                driver.current_stop_index = 0;
                driver.eta_next_stop = None;
                driver.assigned_orders.clear();
            } else {
                let next = driver.route[driver.current_stop_index];
                let leg_mins =
                    cfg.service_time_mins + oracle.travel_time_mins(position.0, next.location);
                driver.eta_next_stop = Some(now + mins_to_ms(leg_mins));

                let only_dropoffs = driver.route[driver.current_stop_index..]
                    .iter()
                    .all(|s| s.kind == StopKind::Dropoff);
                if only_dropoffs {
                    driver.status = DriverStatus::Delivering;
                }
            }
        }
    }
}
