//! Per-tick fleet utilization counters.

use bevy_ecs::prelude::{Query, ResMut};

use crate::ecs::{Driver, DriverStatus};
use crate::telemetry::SimTelemetry;

pub fn record_utilization_system(mut telemetry: ResMut<SimTelemetry>, drivers: Query<&Driver>) {
    for driver in drivers.iter() {
        telemetry.total_driver_ticks += 1;
        if driver.status != DriverStatus::Idle {
            telemetry.busy_driver_ticks += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ONE_HOUR_MS;
    use crate::ecs::VehicleClass;
    use crate::geo::Coordinate;
    use bevy_ecs::prelude::{Schedule, World};

    #[test]
    fn counts_busy_and_total_driver_ticks() {
        let mut world = World::new();
        world.insert_resource(SimTelemetry::default());
        for (i, status) in [DriverStatus::Idle, DriverStatus::Accruing, DriverStatus::Delivering]
            .into_iter()
            .enumerate()
        {
            world.spawn(Driver {
                id: format!("D{i}"),
                origin: Coordinate::new(25.30, 51.50),
                vehicle: VehicleClass::Motorbike,
                capacity: 2,
                available_from: 17 * ONE_HOUR_MS,
                status,
                assigned_orders: Vec::new(),
                route: Vec::new(),
                current_stop_index: 0,
                eta_next_stop: None,
            });
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(record_utilization_system);
        schedule.run(&mut world);
        schedule.run(&mut world);

        let telemetry = world.resource::<SimTelemetry>();
        assert_eq!(telemetry.total_driver_ticks, 6);
        assert_eq!(telemetry.busy_driver_ticks, 4);
        assert!((telemetry.fleet_utilization_pct() - 66.666).abs() < 0.01);
    }
}
