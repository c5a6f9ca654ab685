//! The per-tick auction: batching gate, snapshotting, policy execution and
//! assignment application.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::{mins_to_ms, ms_to_mins, SimMillis, SimulationClock};
use crate::config::DispatchConfig;
use crate::dispatch::{AuctionContext, DispatchPolicyResource, DriverView, OrderView};
use crate::ecs::{Driver, DriverStatus, Order, OrderStatus, Position, StopKind};
use crate::error::{DispatchError, SimFault};
use crate::geo::Coordinate;
use crate::oracle::{DistanceOracle, DistanceOracleResource};
use crate::scenario::{BatchState, OrderArrivals, PendingOrders};
use crate::telemetry::SimTelemetry;

/// Snapshot pending orders and eligible drivers, run the active policy, and
/// apply the winning assignments.
///
/// The baseline policy dispatches every tick; the market policies hold until
/// the batch window elapses or an urgent order forces a flush.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_system(
    clock: Res<SimulationClock>,
    cfg: Res<DispatchConfig>,
    oracle: Res<DistanceOracleResource>,
    policy: Res<DispatchPolicyResource>,
    mut pending: ResMut<PendingOrders>,
    mut batch: ResMut<BatchState>,
    arrivals: Res<OrderArrivals>,
    mut telemetry: ResMut<SimTelemetry>,
    mut fault: ResMut<SimFault>,
    mut drivers: Query<(Entity, &mut Driver, &Position)>,
    mut orders: Query<(Entity, &mut Order)>,
) {
    if fault.0.is_some() || pending.0.is_empty() {
        return;
    }
    let now = clock.now();

    let mut pending_views: Vec<OrderView> = Vec::with_capacity(pending.0.len());
    for &entity in pending.0.iter() {
        if let Ok((_, order)) = orders.get(entity) {
            pending_views.push(order_view(entity, order));
        }
    }

    if policy.name() != "baseline" && !gate_open(&pending_views, &batch, now, &cfg) {
        return;
    }

    // Eligibility: idle and on shift, or accruing with spare capacity.
    // Delivering routes are frozen.
    let mut driver_views: Vec<DriverView> = Vec::new();
    for (entity, driver, position) in drivers.iter() {
        let eligible = match driver.status {
            DriverStatus::Idle => driver.available_from <= now,
            DriverStatus::Accruing => driver.has_capacity(),
            DriverStatus::Delivering => false,
        };
        if !eligible {
            continue;
        }
        let assigned: Vec<OrderView> = driver
            .assigned_orders
            .iter()
            .filter_map(|&e| orders.get(e).ok().map(|(_, o)| order_view(e, o)))
            .collect();
        let existing_route_km = committed_route_km(driver, position.0, &**oracle);
        driver_views.push(DriverView {
            entity,
            id: driver.id.clone(),
            position: position.0,
            vehicle: driver.vehicle,
            capacity: driver.capacity,
            available_from: driver.available_from,
            status: driver.status,
            assigned,
            existing_route_km,
        });
    }

    let ctx = AuctionContext {
        now,
        order_rate_per_min: order_rate(&arrivals.0, now, cfg.combinatorial_window_mins),
        cfg: &cfg,
        oracle: &**oracle,
    };
    let assignments = policy.dispatch(&ctx, &pending_views, &driver_views);
    batch.opened_at = None;

    for assignment in &assignments {
        // State-corruption guards: a picked-up order may never change hands
        // and a driver may never exceed capacity.
        {
            let Ok((_, driver, _)) = drivers.get(assignment.driver) else {
                continue;
            };
            if assignment.orders.len() > driver.capacity {
                fault.0 = Some(DispatchError::StateCorruption(format!(
                    "driver {} awarded {} orders with capacity {}",
                    driver.id,
                    assignment.orders.len(),
                    driver.capacity
                )));
                return;
            }
            for &entity in &assignment.orders {
                let Ok((_, order)) = orders.get(entity) else {
                    continue;
                };
                let foreign = order.assigned_to.is_some_and(|d| d != assignment.driver);
                if order.status == OrderStatus::PickedUp && foreign {
                    fault.0 = Some(DispatchError::StateCorruption(format!(
                        "picked-up order {} moved to driver {}",
                        order.id, driver.id
                    )));
                    return;
                }
                if order.status == OrderStatus::Delivered {
                    fault.0 = Some(DispatchError::StateCorruption(format!(
                        "delivered order {} re-awarded to driver {}",
                        order.id, driver.id
                    )));
                    return;
                }
            }
        }

        let Ok((_, mut driver, position)) = drivers.get_mut(assignment.driver) else {
            continue;
        };
        driver.assigned_orders = assignment.orders.clone();
        driver.route = assignment.route.clone();
        driver.current_stop_index = 0;
        driver.eta_next_stop = assignment
            .route
            .first()
            .map(|stop| now + mins_to_ms(oracle.travel_time_mins(position.0, stop.location)));
        driver.status = if assignment.route.iter().any(|s| s.kind == StopKind::Pickup) {
            DriverStatus::Accruing
        } else {
            DriverStatus::Delivering
        };

        telemetry.drivers_activated.insert(assignment.driver);
        telemetry.record_position(assignment.driver, position.0);
        if assignment.fallback {
            telemetry.fallback_assignments += 1;
        }

        for &entity in &assignment.new_orders {
            if let Ok((_, mut order)) = orders.get_mut(entity) {
                order.status = OrderStatus::Assigned;
                order.assigned_to = Some(assignment.driver);
            }
        }
        pending.0.retain(|e| !assignment.new_orders.contains(e));
    }
}

fn order_view(entity: Entity, order: &Order) -> OrderView {
    OrderView {
        entity,
        id: order.id.clone(),
        pickup: order.pickup,
        dropoff: order.dropoff,
        created_at: order.created_at,
        deadline: order.deadline,
        estimated_mins: order.estimated_mins,
        picked_up: order.status == OrderStatus::PickedUp,
    }
}

/// True when the batching gate lets this tick's auction run: the window has
/// elapsed, or an order is within a third of its estimated duration of its
/// deadline.
fn gate_open(
    pending: &[OrderView],
    batch: &BatchState,
    now: SimMillis,
    cfg: &DispatchConfig,
) -> bool {
    if pending.is_empty() {
        return false;
    }
    if let Some(opened_at) = batch.opened_at {
        if ms_to_mins(now.saturating_sub(opened_at)) >= cfg.batch_window_mins {
            return true;
        }
    }
    pending.iter().any(|o| {
        let to_deadline = ms_to_mins(o.deadline.saturating_sub(now));
        to_deadline <= o.estimated_mins / 3.0
    })
}

/// Orders per minute over the trailing rate window.
pub(crate) fn order_rate(arrivals: &[SimMillis], now: SimMillis, window_mins: f64) -> f64 {
    if window_mins <= 0.0 {
        return 0.0;
    }
    let cutoff = now.saturating_sub(mins_to_ms(window_mins));
    let recent = arrivals.iter().filter(|&&t| t > cutoff).count();
    recent as f64 / window_mins
}

/// Length of the driver's remaining committed route from `from`.
fn committed_route_km(driver: &Driver, from: Coordinate, oracle: &dyn DistanceOracle) -> f64 {
    let mut last = from;
    let mut total = 0.0;
    for stop in driver.remaining_stops() {
        total += oracle.distance_km(last, stop.location);
        last = stop.location;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ONE_HOUR_MS, ONE_MIN_MS};

    const T17: u64 = 17 * ONE_HOUR_MS;

    #[test]
    fn order_rate_counts_strictly_inside_the_window() {
        let now = T17 + 5 * ONE_MIN_MS;
        let arrivals: Vec<u64> = vec![
            T17,                  // exactly at the cutoff: excluded
            T17 + ONE_MIN_MS,     // in
            T17 + 2 * ONE_MIN_MS, // in
            T17 + 5 * ONE_MIN_MS, // in
        ];
        assert_eq!(order_rate(&arrivals, now, 5.0), 3.0 / 5.0);
    }

    const HALF_SEC: u64 = 500;

    #[test]
    fn order_rate_with_burst_crosses_the_threshold() {
        // Twelve orders over five minutes: 2.4 orders/minute.
        let mut arrivals = Vec::new();
        for minute in 0..5u64 {
            for _ in 0..2 {
                arrivals.push(T17 + minute * ONE_MIN_MS + HALF_SEC);
            }
        }
        arrivals.push(T17 + 2 * ONE_MIN_MS + HALF_SEC);
        arrivals.push(T17 + 3 * ONE_MIN_MS + HALF_SEC);
        let now = T17 + 5 * ONE_MIN_MS + HALF_SEC;
        assert!(order_rate(&arrivals, now, 5.0) >= 2.0);
    }

    #[test]
    fn gate_opens_after_the_batch_window() {
        let cfg = DispatchConfig::default();
        let order = OrderView {
            entity: Entity::from_raw(1),
            id: "O1".into(),
            pickup: Coordinate::new(25.30, 51.50),
            dropoff: Coordinate::new(25.31, 51.50),
            created_at: T17,
            deadline: T17 + 30 * ONE_MIN_MS,
            estimated_mins: 30.0,
            picked_up: false,
        };
        let batch = BatchState { opened_at: Some(T17) };

        assert!(!gate_open(&[order.clone()], &batch, T17, &cfg));
        assert!(gate_open(&[order], &batch, T17 + ONE_MIN_MS, &cfg));
    }

    #[test]
    fn gate_opens_early_for_urgent_orders() {
        let cfg = DispatchConfig::default();
        // Nine minutes to a 30-minute-estimate deadline: inside the urgency
        // third, so the gate opens with a fresh batch window.
        let order = OrderView {
            entity: Entity::from_raw(1),
            id: "O1".into(),
            pickup: Coordinate::new(25.30, 51.50),
            dropoff: Coordinate::new(25.31, 51.50),
            created_at: T17,
            deadline: T17 + 9 * ONE_MIN_MS,
            estimated_mins: 30.0,
            picked_up: false,
        };
        let batch = BatchState { opened_at: Some(T17) };
        assert!(gate_open(&[order], &batch, T17, &cfg));
    }
}
