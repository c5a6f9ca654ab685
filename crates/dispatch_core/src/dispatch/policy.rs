//! The policy trait implemented by every dispatch strategy.

use bevy_ecs::prelude::Resource;

use super::types::{Assignment, AuctionContext, DriverView, OrderView};

/// A dispatch strategy: given the tick's pending orders and eligible
/// drivers, decide which (driver, bundle) contracts to award.
pub trait DispatchPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce the tick's assignments. `pending` is in arrival order;
    /// `drivers` holds every driver passing the shared eligibility rules
    /// (Idle and on shift, or Accruing with spare capacity).
    fn dispatch(
        &self,
        ctx: &AuctionContext<'_>,
        pending: &[OrderView],
        drivers: &[DriverView],
    ) -> Vec<Assignment>;
}

/// Resource wrapper for the policy trait object.
#[derive(Resource)]
pub struct DispatchPolicyResource(pub Box<dyn DispatchPolicy>);

impl DispatchPolicyResource {
    pub fn new(policy: Box<dyn DispatchPolicy>) -> Self {
        Self(policy)
    }
}

impl std::ops::Deref for DispatchPolicyResource {
    type Target = dyn DispatchPolicy;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
