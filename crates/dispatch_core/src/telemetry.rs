//! Telemetry / KPIs: delivery records and fleet counters for a run.

use std::collections::{HashMap, HashSet};

use bevy_ecs::prelude::{Entity, Resource};

use crate::clock::{ms_to_mins, SimMillis};
use crate::geo::Coordinate;

/// One completed delivery, recorded when the driver reaches the dropoff.
/// Timestamps are simulation milliseconds; use the helpers for derived KPIs.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub order: Entity,
    pub driver: Entity,
    pub created_at: SimMillis,
    pub delivered_at: SimMillis,
}

impl DeliveryRecord {
    /// Door-to-door duration in minutes.
    pub fn duration_mins(&self) -> f64 {
        ms_to_mins(self.delivered_at.saturating_sub(self.created_at))
    }
}

/// Collects simulation telemetry. Write-only inside the tick; read by the
/// reporting layer once the run ends.
#[derive(Debug, Default, Resource)]
pub struct SimTelemetry {
    pub deliveries: Vec<DeliveryRecord>,
    /// Fleet distance actually traversed, priced by the distance oracle.
    pub distance_km: f64,
    /// Distinct drivers ever assigned at least one order. Grows monotonically.
    pub drivers_activated: HashSet<Entity>,
    pub busy_driver_ticks: u64,
    pub total_driver_ticks: u64,
    /// Orders placed through the SLA-bypassing nearest-driver rule.
    pub fallback_assignments: u64,
    /// Positions visited per driver, for route logs.
    pub route_history: HashMap<Entity, Vec<Coordinate>>,
}

impl SimTelemetry {
    /// Append a driver position if it changed since the last record.
    pub fn record_position(&mut self, driver: Entity, position: Coordinate) {
        let history = self.route_history.entry(driver).or_default();
        if history.last() != Some(&position) {
            history.push(position);
        }
    }

    /// Share of driver-ticks spent non-idle, as a percentage.
    pub fn fleet_utilization_pct(&self) -> f64 {
        if self.total_driver_ticks == 0 {
            0.0
        } else {
            self.busy_driver_ticks as f64 / self.total_driver_ticks as f64 * 100.0
        }
    }
}
