//! Route construction: minimum-distance visit sequences under the
//! pickup-before-dropoff precedence constraint.

use crate::dispatch::types::OrderView;
use crate::ecs::{Stop, StopKind};
use crate::geo::Coordinate;
use crate::oracle::DistanceOracle;

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub stops: Vec<Stop>,
    pub distance_km: f64,
}

/// Find the minimum-distance stop sequence for `orders` starting at `start`.
///
/// Each order not yet picked up contributes a pickup and a dropoff stop;
/// picked-up orders contribute their dropoff only. Every order's pickup
/// precedes its dropoff in the result. Returns `None` when `orders` is empty.
///
/// Depth-first enumeration with precedence pruning and a running-distance
/// bound; exact for the sizes the auction produces (bundle cap 2, at most
/// four stops). Equal-distance sequences resolve to whichever is found
/// first; callers must not depend on which.
pub fn plan_route(
    start: Coordinate,
    orders: &[OrderView],
    oracle: &dyn DistanceOracle,
) -> Option<RoutePlan> {
    if orders.is_empty() {
        return None;
    }

    let mut stops = Vec::with_capacity(orders.len() * 2);
    for order in orders {
        if !order.picked_up {
            stops.push(Stop {
                location: order.pickup,
                kind: StopKind::Pickup,
                order: order.entity,
            });
        }
        stops.push(Stop {
            location: order.dropoff,
            kind: StopKind::Dropoff,
            order: order.entity,
        });
    }

    let mut best: Option<(Vec<Stop>, f64)> = None;
    let mut used = vec![false; stops.len()];
    let mut current = Vec::with_capacity(stops.len());
    search(start, &stops, &mut used, &mut current, 0.0, &mut best, oracle);

    best.map(|(stops, distance_km)| RoutePlan { stops, distance_km })
}

fn search(
    last: Coordinate,
    stops: &[Stop],
    used: &mut [bool],
    current: &mut Vec<Stop>,
    travelled: f64,
    best: &mut Option<(Vec<Stop>, f64)>,
    oracle: &dyn DistanceOracle,
) {
    if let Some((_, best_km)) = best {
        if travelled >= *best_km {
            return;
        }
    }
    if current.len() == stops.len() {
        *best = Some((current.clone(), travelled));
        return;
    }

    for i in 0..stops.len() {
        if used[i] {
            continue;
        }
        let stop = stops[i];
        if stop.kind == StopKind::Dropoff {
            let pickup_outstanding = stops
                .iter()
                .enumerate()
                .any(|(j, s)| !used[j] && s.kind == StopKind::Pickup && s.order == stop.order);
            if pickup_outstanding {
                continue;
            }
        }
        used[i] = true;
        current.push(stop);
        let leg = oracle.distance_km(last, stop.location);
        search(stop.location, stops, used, current, travelled + leg, best, oracle);
        current.pop();
        used[i] = false;
    }
}
