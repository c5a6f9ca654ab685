//! Tick loop: runs the per-tick schedule and advances the clock.
//!
//! The schedule chains the systems in the tick order the simulation
//! contract fixes: traversal, then order release, then the auction, then
//! bookkeeping. Each tick runs to fixed point before the clock moves.

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::SimulationClock;
use crate::config::DispatchConfig;
use crate::ecs::{Order, OrderStatus};
use crate::error::{DispatchError, SimFault};
use crate::systems::auction::dispatch_system;
use crate::systems::injection::inject_orders_system;
use crate::systems::movement::advance_drivers_system;
use crate::systems::telemetry_snapshot::record_utilization_system;

/// Safety valve against runaway loops when the configured end time is far out.
const MAX_TICKS: usize = 100_000;

/// Build the per-tick schedule with systems in the contract order.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            advance_drivers_system,
            inject_orders_system,
            dispatch_system,
            record_utilization_system,
        )
            .chain(),
    );
    schedule
}

/// Run one tick, then advance the clock.
pub fn run_tick(world: &mut World, schedule: &mut Schedule) {
    schedule.run(world);
    world.resource_mut::<SimulationClock>().advance();
}

/// True once every order has been delivered.
pub fn all_delivered(world: &mut World) -> bool {
    world
        .query::<&Order>()
        .iter(world)
        .all(|order| order.status == OrderStatus::Delivered)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: usize,
}

/// Run until the end time passes or every order is delivered. A detected
/// state corruption aborts the run with its diagnostic.
pub fn run_to_completion(
    world: &mut World,
    schedule: &mut Schedule,
) -> Result<RunSummary, DispatchError> {
    let end_time = world.resource::<DispatchConfig>().end_time;
    let mut ticks = 0;

    while ticks < MAX_TICKS {
        let now = world.resource::<SimulationClock>().now();
        if now >= end_time || all_delivered(world) {
            break;
        }
        run_tick(world, schedule);
        ticks += 1;
        if let Some(fault) = world.resource::<SimFault>().0.clone() {
            return Err(fault);
        }
    }

    Ok(RunSummary { ticks })
}
