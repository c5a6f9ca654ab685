//! Baseline greedy dispatch: each order goes to the nearest idle driver on a
//! two-stop route. No bundling, no re-routing. The comparison floor.

use super::common::{commit, direct_bundle, nearest_with_capacity};
use super::policy::DispatchPolicy;
use super::types::{Assignment, AuctionContext, DriverView, OrderView};
use crate::ecs::DriverStatus;

#[derive(Debug, Default)]
pub struct BaselinePolicy;

impl DispatchPolicy for BaselinePolicy {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn dispatch(
        &self,
        ctx: &AuctionContext<'_>,
        pending: &[OrderView],
        drivers: &[DriverView],
    ) -> Vec<Assignment> {
        let mut idle: Vec<DriverView> = drivers
            .iter()
            .filter(|d| d.status == DriverStatus::Idle)
            .cloned()
            .collect();
        let mut assignments = Vec::new();

        for order in pending {
            if idle.is_empty() {
                break; // remaining orders defer to the next tick
            }
            let Some(i) =
                nearest_with_capacity(&idle, order.pickup, ctx.oracle, &[DriverStatus::Idle])
            else {
                break;
            };
            let bundle = direct_bundle(idle[i].position, order, ctx.oracle);
            assignments.push(commit(&mut idle[i], &bundle, std::slice::from_ref(order), false));
            idle.remove(i);
        }

        assignments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testutil::{ctx_with, idle_driver, pending_order};
    use crate::config::DispatchConfig;
    use crate::geo::Coordinate;
    use crate::oracle::HaversineOracle;

    #[test]
    fn each_order_takes_the_nearest_idle_driver_once() {
        let oracle = HaversineOracle::new(35.0);
        let cfg = DispatchConfig::default();
        let ctx = ctx_with(&cfg, &oracle);

        let near = idle_driver(1, Coordinate::new(25.300, 51.500));
        let far = idle_driver(2, Coordinate::new(25.340, 51.540));
        let o1 = pending_order(10, Coordinate::new(25.301, 51.500), Coordinate::new(25.310, 51.500));
        let o2 = pending_order(11, Coordinate::new(25.302, 51.501), Coordinate::new(25.315, 51.505));

        let policy = BaselinePolicy;
        let assignments = policy.dispatch(&ctx, &[o1.clone(), o2.clone()], &[near.clone(), far.clone()]);

        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].driver, near.entity);
        assert_eq!(assignments[0].new_orders, vec![o1.entity]);
        // The nearest driver is consumed, so the second order falls to the far one.
        assert_eq!(assignments[1].driver, far.entity);
        assert_eq!(assignments[1].route.len(), 2);
    }

    #[test]
    fn orders_defer_when_no_idle_driver_remains() {
        let oracle = HaversineOracle::new(35.0);
        let cfg = DispatchConfig::default();
        let ctx = ctx_with(&cfg, &oracle);

        let only = idle_driver(1, Coordinate::new(25.300, 51.500));
        let o1 = pending_order(10, Coordinate::new(25.301, 51.500), Coordinate::new(25.310, 51.500));
        let o2 = pending_order(11, Coordinate::new(25.302, 51.501), Coordinate::new(25.315, 51.505));

        let assignments = BaselinePolicy.dispatch(&ctx, &[o1, o2], &[only]);
        assert_eq!(assignments.len(), 1);
    }
}
