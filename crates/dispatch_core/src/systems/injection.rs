//! Order release: move backlog orders into the pending queue once their
//! creation time passes.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::SimulationClock;
use crate::ecs::Order;
use crate::scenario::{BatchState, OrderArrivals, OrderBacklog, PendingOrders};

pub fn inject_orders_system(
    clock: Res<SimulationClock>,
    mut backlog: ResMut<OrderBacklog>,
    mut pending: ResMut<PendingOrders>,
    mut arrivals: ResMut<OrderArrivals>,
    mut batch: ResMut<BatchState>,
    orders: Query<&Order>,
) {
    let now = clock.now();

    while let Some(&entity) = backlog.0.front() {
        let Ok(order) = orders.get(entity) else {
            backlog.0.pop_front();
            continue;
        };
        if order.created_at > now {
            break; // backlog is sorted by creation time
        }
        backlog.0.pop_front();
        pending.0.push(entity);
        arrivals.0.push(order.created_at);
        if batch.opened_at.is_none() {
            batch.opened_at = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ONE_HOUR_MS, ONE_MIN_MS};
    use crate::ecs::OrderStatus;
    use crate::geo::Coordinate;
    use bevy_ecs::prelude::{Schedule, World};
    use std::collections::VecDeque;

    const T17: u64 = 17 * ONE_HOUR_MS;

    fn spawn_order_at(world: &mut World, created_at: u64) -> bevy_ecs::prelude::Entity {
        world
            .spawn(Order {
                id: format!("O-{created_at}"),
                pickup: Coordinate::new(25.30, 51.50),
                dropoff: Coordinate::new(25.31, 51.50),
                created_at,
                deadline: created_at + 30 * ONE_MIN_MS,
                estimated_mins: 30.0,
                status: OrderStatus::Pending,
                assigned_to: None,
                pickup_time: None,
                dropoff_time: None,
            })
            .id()
    }

    #[test]
    fn releases_due_orders_and_opens_the_batch_window() {
        let mut world = World::new();
        world.insert_resource(SimulationClock::new(T17, ONE_MIN_MS));

        let due = spawn_order_at(&mut world, T17);
        let later = spawn_order_at(&mut world, T17 + 3 * ONE_MIN_MS);
        world.insert_resource(OrderBacklog(VecDeque::from(vec![due, later])));
        world.insert_resource(PendingOrders::default());
        world.insert_resource(OrderArrivals::default());
        world.insert_resource(BatchState::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(inject_orders_system);
        schedule.run(&mut world);

        assert_eq!(world.resource::<PendingOrders>().0, vec![due]);
        assert_eq!(world.resource::<OrderBacklog>().0.len(), 1);
        assert_eq!(world.resource::<OrderArrivals>().0, vec![T17]);
        assert_eq!(world.resource::<BatchState>().opened_at, Some(T17));

        // Three minutes later the second order is released; the already-open
        // batch window is left alone.
        for _ in 0..3 {
            world.resource_mut::<SimulationClock>().advance();
        }
        schedule.run(&mut world);
        assert_eq!(world.resource::<PendingOrders>().0.len(), 2);
        assert_eq!(world.resource::<BatchState>().opened_at, Some(T17));
    }
}
