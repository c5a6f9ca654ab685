//! Load-adaptive dispatch: combinatorial under heavy order inflow,
//! sequential otherwise.

use super::combinatorial::CombinatorialPolicy;
use super::policy::DispatchPolicy;
use super::sequential::SequentialPolicy;
use super::types::{Assignment, AuctionContext, DriverView, OrderView};

#[derive(Debug, Default)]
pub struct AdaptivePolicy {
    sequential: SequentialPolicy,
    combinatorial: CombinatorialPolicy,
}

impl AdaptivePolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DispatchPolicy for AdaptivePolicy {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn dispatch(
        &self,
        ctx: &AuctionContext<'_>,
        pending: &[OrderView],
        drivers: &[DriverView],
    ) -> Vec<Assignment> {
        if ctx.order_rate_per_min >= ctx.cfg.high_load_threshold {
            self.combinatorial.dispatch(ctx, pending, drivers)
        } else {
            self.sequential.dispatch(ctx, pending, drivers)
        }
    }
}
