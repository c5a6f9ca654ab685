//! Sequential market-based dispatch: per-order marginal auction.
//!
//! For each pending order in arrival order, every eligible driver bids the
//! marginal cost of absorbing the order into its route; the lowest bid wins.
//! When every bid is infinite the order still ships anyway, better late
//! than never, to the nearest idle driver with spare capacity.

use super::common::{candidate_bundle, commit, direct_bundle, nearest_with_capacity};
use super::policy::DispatchPolicy;
use super::types::{Assignment, AuctionContext, Bundle, DriverView, OrderView};
use crate::ecs::DriverStatus;
use crate::scoring::trip_cost;

#[derive(Debug, Default)]
pub struct SequentialPolicy;

impl DispatchPolicy for SequentialPolicy {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn dispatch(
        &self,
        ctx: &AuctionContext<'_>,
        pending: &[OrderView],
        drivers: &[DriverView],
    ) -> Vec<Assignment> {
        let mut drivers: Vec<DriverView> = drivers.to_vec();
        let mut assignments = Vec::new();

        for order in pending {
            let mut best: Option<(f64, usize, Bundle)> = None;

            for (i, driver) in drivers.iter().enumerate() {
                if driver.assigned.len() + 1 > driver.capacity {
                    continue;
                }
                let Some(bundle) =
                    candidate_bundle(driver, std::slice::from_ref(order), ctx.oracle)
                else {
                    continue;
                };
                let cost = trip_cost(
                    driver,
                    &bundle,
                    ctx.now,
                    driver.existing_route_km,
                    ctx.oracle,
                    ctx.cfg,
                );
                if !cost.is_finite() {
                    continue;
                }
                if best.as_ref().map_or(true, |(c, _, _)| cost < *c) {
                    best = Some((cost, i, bundle));
                }
            }

            if let Some((_, i, bundle)) = best {
                assignments.push(commit(
                    &mut drivers[i],
                    &bundle,
                    std::slice::from_ref(order),
                    false,
                ));
                if !drivers[i].has_capacity() {
                    drivers.remove(i);
                }
            } else if let Some(i) =
                nearest_with_capacity(&drivers, order.pickup, ctx.oracle, &[DriverStatus::Idle])
            {
                let bundle = direct_bundle(drivers[i].position, order, ctx.oracle);
                assignments.push(commit(
                    &mut drivers[i],
                    &bundle,
                    std::slice::from_ref(order),
                    true,
                ));
                if !drivers[i].has_capacity() {
                    drivers.remove(i);
                }
            }
            // No bid and no idle fallback: the order defers to the next tick.
        }

        assignments
    }
}
