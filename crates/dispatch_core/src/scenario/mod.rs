mod build;
mod params;

pub use build::build_world;
pub use params::{DriverSpec, OrderSpec, ScenarioParams};

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};

use crate::clock::SimMillis;

/// Orders not yet released into the market, in creation-time order.
#[derive(Debug, Default, Resource)]
pub struct OrderBacklog(pub VecDeque<Entity>);

/// Orders released and awaiting assignment, in arrival order.
#[derive(Debug, Default, Resource)]
pub struct PendingOrders(pub Vec<Entity>);

/// Creation timestamps of released orders, for the rolling load estimate.
#[derive(Debug, Default, Resource)]
pub struct OrderArrivals(pub Vec<SimMillis>);

/// Batching gate: when the current accumulation window opened.
#[derive(Debug, Default, Resource)]
pub struct BatchState {
    pub opened_at: Option<SimMillis>,
}
