//! Combinatorial dispatch: a bundle auction over spatially clustered
//! candidate groups.
//!
//! Each round generates candidate bundles over the remaining pending orders,
//! collects a marginal bid from every (bundle, driver) pairing, and awards
//! the minimum under the key `(cost, −new_orders, driver_id, bundle_key)`.
//! Preferring larger new-order sets at equal cost is the fleet-compression
//! lever: it is what lets one driver absorb a whole cluster.

use std::collections::HashSet;

use bevy_ecs::prelude::Entity;
use rayon::prelude::*;

use super::common::{candidate_bundle, commit, direct_bundle, nearest_with_capacity};
use super::policy::DispatchPolicy;
use super::types::{Assignment, AuctionContext, Bundle, DriverView, OrderView};
use crate::bundles::generate_bundles;
use crate::ecs::DriverStatus;
use crate::scoring::trip_cost;

#[derive(Debug, Default)]
pub struct CombinatorialPolicy;

struct Bid {
    cost: f64,
    driver_idx: usize,
    bundle: Bundle,
    new_orders: Vec<OrderView>,
    /// Sorted new-order ids: the deterministic final tie-break.
    key: Vec<String>,
}

impl DispatchPolicy for CombinatorialPolicy {
    fn name(&self) -> &'static str {
        "combinatorial"
    }

    fn dispatch(
        &self,
        ctx: &AuctionContext<'_>,
        pending: &[OrderView],
        drivers: &[DriverView],
    ) -> Vec<Assignment> {
        let mut drivers: Vec<DriverView> = drivers.to_vec();
        let mut pending: Vec<OrderView> = pending.to_vec();
        let mut assignments = Vec::new();

        while !pending.is_empty() && !drivers.is_empty() {
            let groups = generate_bundles(&pending, ctx.oracle, ctx.cfg);

            // Bid sweep over every (group, driver) pairing. All reads are
            // pure within the tick; the selection below applies a total
            // order, so parallelism cannot change the winner.
            let pending_ref: &[OrderView] = &pending;
            let drivers_ref: &[DriverView] = &drivers;
            let bids: Vec<Bid> = groups
                .par_iter()
                .flat_map_iter(|group| {
                    drivers_ref.iter().enumerate().filter_map(move |(di, driver)| {
                        if driver.assigned.len() + group.len() > driver.capacity {
                            return None;
                        }
                        let new_orders: Vec<OrderView> =
                            group.iter().map(|&gi| pending_ref[gi].clone()).collect();
                        let bundle = candidate_bundle(driver, &new_orders, ctx.oracle)?;
                        let cost = trip_cost(
                            driver,
                            &bundle,
                            ctx.now,
                            driver.existing_route_km,
                            ctx.oracle,
                            ctx.cfg,
                        );
                        if !cost.is_finite() {
                            return None;
                        }
                        let mut key: Vec<String> =
                            new_orders.iter().map(|o| o.id.clone()).collect();
                        key.sort();
                        Some(Bid { cost, driver_idx: di, bundle, new_orders, key })
                    })
                })
                .collect();

            if bids.is_empty() {
                assignments.extend(fallback_assignments(ctx, &mut pending, &mut drivers));
                break;
            }

            let Some(best) = bids.into_iter().min_by(|a, b| {
                a.cost
                    .total_cmp(&b.cost)
                    .then_with(|| b.new_orders.len().cmp(&a.new_orders.len()))
                    .then_with(|| drivers[a.driver_idx].id.cmp(&drivers[b.driver_idx].id))
                    .then_with(|| a.key.cmp(&b.key))
            }) else {
                break;
            };

            let di = best.driver_idx;
            assignments.push(commit(&mut drivers[di], &best.bundle, &best.new_orders, false));

            let awarded: HashSet<Entity> = best.new_orders.iter().map(|o| o.entity).collect();
            pending.retain(|o| !awarded.contains(&o.entity));
            if !drivers[di].has_capacity() {
                drivers.remove(di);
            }
        }

        assignments
    }
}

/// Assign each remaining pending order to the nearest driver with spare
/// capacity (idle first, then accruing), bypassing the SLA rejection.
fn fallback_assignments(
    ctx: &AuctionContext<'_>,
    pending: &mut Vec<OrderView>,
    drivers: &mut Vec<DriverView>,
) -> Vec<Assignment> {
    let mut assignments = Vec::new();
    let snapshot: Vec<OrderView> = pending.clone();

    for order in snapshot {
        if drivers.is_empty() {
            break;
        }
        let choice =
            nearest_with_capacity(drivers, order.pickup, ctx.oracle, &[DriverStatus::Idle])
                .or_else(|| {
                    nearest_with_capacity(
                        drivers,
                        order.pickup,
                        ctx.oracle,
                        &[DriverStatus::Accruing],
                    )
                });
        let Some(i) = choice else { continue };

        let assignment = if drivers[i].status == DriverStatus::Idle {
            let bundle = direct_bundle(drivers[i].position, &order, ctx.oracle);
            commit(&mut drivers[i], &bundle, std::slice::from_ref(&order), true)
        } else {
            let Some(bundle) =
                candidate_bundle(&drivers[i], std::slice::from_ref(&order), ctx.oracle)
            else {
                continue;
            };
            commit(&mut drivers[i], &bundle, std::slice::from_ref(&order), true)
        };
        assignments.push(assignment);
        pending.retain(|o| o.entity != order.entity);
        if !drivers[i].has_capacity() {
            drivers.remove(i);
        }
    }

    assignments
}
