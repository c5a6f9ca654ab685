//! Shared auction mechanics: candidate construction, assignment commits and
//! the nearest-driver search.

use crate::dispatch::types::{Assignment, Bundle, DriverView, OrderView};
use crate::ecs::{DriverStatus, Stop, StopKind};
use crate::geo::Coordinate;
use crate::oracle::DistanceOracle;
use crate::route::plan_route;

/// Route-optimize the driver's assigned orders plus `new_orders` from the
/// driver's current position. `None` when there is nothing to route.
pub(crate) fn candidate_bundle(
    driver: &DriverView,
    new_orders: &[OrderView],
    oracle: &dyn DistanceOracle,
) -> Option<Bundle> {
    let mut orders: Vec<OrderView> = driver.assigned.clone();
    orders.extend(new_orders.iter().cloned());
    let plan = plan_route(driver.position, &orders, oracle)?;
    Some(Bundle {
        orders,
        stops: plan.stops,
        distance_km: plan.distance_km,
    })
}

/// Trivial pickup→dropoff route for a single order starting at `from`.
pub(crate) fn direct_bundle(
    from: Coordinate,
    order: &OrderView,
    oracle: &dyn DistanceOracle,
) -> Bundle {
    let stops = vec![
        Stop {
            location: order.pickup,
            kind: StopKind::Pickup,
            order: order.entity,
        },
        Stop {
            location: order.dropoff,
            kind: StopKind::Dropoff,
            order: order.entity,
        },
    ];
    let distance_km =
        oracle.distance_km(from, order.pickup) + oracle.distance_km(order.pickup, order.dropoff);
    Bundle {
        orders: vec![order.clone()],
        stops,
        distance_km,
    }
}

/// Record a win against the policy's working driver copy and emit the
/// assignment to apply to the world.
pub(crate) fn commit(
    driver: &mut DriverView,
    bundle: &Bundle,
    new_orders: &[OrderView],
    fallback: bool,
) -> Assignment {
    driver.assigned = bundle.orders.clone();
    driver.existing_route_km = bundle.distance_km;
    driver.status = DriverStatus::Accruing;
    Assignment {
        driver: driver.entity,
        orders: bundle.orders.iter().map(|o| o.entity).collect(),
        route: bundle.stops.clone(),
        total_distance_km: bundle.distance_km,
        new_orders: new_orders.iter().map(|o| o.entity).collect(),
        fallback,
    }
}

/// Index of the driver nearest to `pickup` among those in one of `statuses`
/// with spare capacity.
pub(crate) fn nearest_with_capacity(
    drivers: &[DriverView],
    pickup: Coordinate,
    oracle: &dyn DistanceOracle,
    statuses: &[DriverStatus],
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, driver) in drivers.iter().enumerate() {
        if !statuses.contains(&driver.status) || !driver.has_capacity() {
            continue;
        }
        let dist = oracle.distance_km(driver.position, pickup);
        match best {
            None => best = Some((i, dist)),
            Some((_, best_dist)) if dist < best_dist => best = Some((i, dist)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}
