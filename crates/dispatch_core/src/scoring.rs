//! Bid scoring: the marginal trip cost a driver quotes for a candidate bundle.
//!
//! Lower is better. Bids are marginal: the driver is charged only for the
//! distance the bundle adds on top of the committed route, which is what
//! makes a nearby mid-route driver cheap and bundling attractive.

use crate::clock::{ms_to_mins, SimMillis};
use crate::config::DispatchConfig;
use crate::dispatch::types::{Bundle, DriverView};
use crate::ecs::StopKind;
use crate::oracle::DistanceOracle;

/// Per-order lateness cap in minutes. Keeps one pathological stop from
/// dominating the whole bid.
const DELAY_CAP_MINS: f64 = 20.0;

/// Compute the cost for `driver` to take on `bundle` starting at `now`, or
/// `f64::INFINITY` when the bundle is infeasible: over capacity, or any
/// projected delivery would break the hard SLA.
///
/// The projection shares the simulator's timeline: arrival at stop `k` is
/// `now + Σ_{i≤k} travel_i + Σ_{i<k} service_i`, so the handover at a stop
/// delays every later stop but not that stop's own delivery timestamp.
pub fn trip_cost(
    driver: &DriverView,
    bundle: &Bundle,
    now: SimMillis,
    existing_route_km: f64,
    oracle: &dyn DistanceOracle,
    cfg: &DispatchConfig,
) -> f64 {
    if bundle.orders.len() > driver.capacity {
        return f64::INFINITY;
    }

    let mut arrival_mins = ms_to_mins(now);
    let mut last = driver.position;
    let mut total_delay_mins = 0.0;

    for (i, stop) in bundle.stops.iter().enumerate() {
        if i > 0 {
            arrival_mins += cfg.service_time_mins;
        }
        arrival_mins += oracle.travel_time_mins(last, stop.location);

        if stop.kind == StopKind::Dropoff {
            let Some(order) = bundle.orders.iter().find(|o| o.entity == stop.order) else {
                return f64::INFINITY;
            };
            let duration_mins = arrival_mins - ms_to_mins(order.created_at);
            if duration_mins > cfg.max_delivery_time_mins {
                return f64::INFINITY;
            }
            let delay = duration_mins - order.estimated_mins;
            if delay > 0.0 {
                total_delay_mins += delay.min(DELAY_CAP_MINS);
            }
        }
        last = stop.location;
    }

    let marginal_km = bundle.distance_km - existing_route_km;
    let base = cfg.w_distance * marginal_km + cfg.w_delay * total_delay_mins;
    let with_vehicle = base * cfg.vehicle_penalty(driver.vehicle);
    let per_order = with_vehicle / bundle.orders.len() as f64;
    let discount =
        (1.0 - cfg.bundle_discount_per_order * (bundle.orders.len() as f64 - 1.0)).max(0.0);
    per_order * discount
}
