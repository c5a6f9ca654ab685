//! KPI extraction and rendering: per-run report, cross-strategy comparison
//! table, JSON artifact and per-order diagnostic log.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use bevy_ecs::prelude::{Entity, World};

use dispatch_core::clock::ms_to_mins;
use dispatch_core::ecs::{Driver, Order, OrderStatus};
use dispatch_core::telemetry::SimTelemetry;

/// Deliveries inside this many minutes of creation count as on time.
const ON_TIME_MINS: f64 = 30.0;

#[derive(Debug, Clone, serde::Serialize)]
pub struct KpiReport {
    pub strategy: String,
    pub total_orders: usize,
    pub orders_delivered: usize,
    pub delivery_success_rate_pct: f64,
    pub total_drivers: usize,
    pub drivers_activated: usize,
    pub orders_per_driver: f64,
    pub total_distance_km: f64,
    pub avg_delivery_time_min: f64,
    pub median_delivery_time_min: f64,
    pub p95_delivery_time_min: f64,
    pub max_delivery_time_min: f64,
    pub on_time_deliveries: usize,
    pub on_time_rate_pct: f64,
    pub late_over_45: usize,
    pub late_over_60: usize,
    pub fleet_utilization_pct: f64,
    pub fallback_assignments: u64,
    pub unassigned_at_termination: usize,
}

/// `(avg, median, p95, max)` over a sample; zeros for an empty one.
fn stats(values: &[f64]) -> (f64, f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let avg = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    };
    let p95_idx = ((sorted.len() as f64 * 0.95) as usize).min(sorted.len() - 1);
    let p95 = sorted[p95_idx];
    let max = sorted[sorted.len() - 1];
    (avg, median, p95, max)
}

/// Pull the KPI snapshot out of a finished world.
pub fn extract_report(world: &mut World, strategy: &str) -> KpiReport {
    let orders: Vec<Order> = world.query::<&Order>().iter(world).cloned().collect();
    let total_drivers = world.query::<&Driver>().iter(world).count();

    let telemetry = world.resource::<SimTelemetry>();
    let durations: Vec<f64> = telemetry.deliveries.iter().map(|d| d.duration_mins()).collect();
    let (avg, median, p95, max) = stats(&durations);

    let delivered = durations.len();
    let on_time = durations.iter().filter(|&&d| d <= ON_TIME_MINS).count();
    let late_over_45 = durations.iter().filter(|&&d| d > 45.0).count();
    let late_over_60 = durations.iter().filter(|&&d| d > 60.0).count();
    let unassigned = orders
        .iter()
        .filter(|o| o.status != OrderStatus::Delivered)
        .count();
    let activated = telemetry.drivers_activated.len();

    let pct = |part: usize, whole: usize| {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64 * 100.0
        }
    };

    KpiReport {
        strategy: strategy.to_string(),
        total_orders: orders.len(),
        orders_delivered: delivered,
        delivery_success_rate_pct: pct(delivered, orders.len()),
        total_drivers,
        drivers_activated: activated,
        orders_per_driver: if activated == 0 {
            0.0
        } else {
            delivered as f64 / activated as f64
        },
        total_distance_km: telemetry.distance_km,
        avg_delivery_time_min: avg,
        median_delivery_time_min: median,
        p95_delivery_time_min: p95,
        max_delivery_time_min: max,
        on_time_deliveries: on_time,
        on_time_rate_pct: pct(on_time, delivered),
        late_over_45,
        late_over_60,
        fleet_utilization_pct: telemetry.fleet_utilization_pct(),
        fallback_assignments: telemetry.fallback_assignments,
        unassigned_at_termination: unassigned,
    }
}

/// Print a metric-by-strategy comparison table.
pub fn print_comparison(reports: &[KpiReport]) {
    if reports.is_empty() {
        return;
    }

    let rows: Vec<(&str, Box<dyn Fn(&KpiReport) -> String>)> = vec![
        ("Orders delivered", Box::new(|r| format!("{}/{}", r.orders_delivered, r.total_orders))),
        ("Drivers activated", Box::new(|r| r.drivers_activated.to_string())),
        ("Orders per driver", Box::new(|r| format!("{:.2}", r.orders_per_driver))),
        ("Fleet distance (km)", Box::new(|r| format!("{:.2}", r.total_distance_km))),
        ("Avg delivery (min)", Box::new(|r| format!("{:.2}", r.avg_delivery_time_min))),
        ("Median delivery (min)", Box::new(|r| format!("{:.2}", r.median_delivery_time_min))),
        ("P95 delivery (min)", Box::new(|r| format!("{:.2}", r.p95_delivery_time_min))),
        ("Max delivery (min)", Box::new(|r| format!("{:.2}", r.max_delivery_time_min))),
        ("On-time rate (%)", Box::new(|r| format!("{:.1}", r.on_time_rate_pct))),
        ("Late > 45 min", Box::new(|r| r.late_over_45.to_string())),
        ("Late > 60 min", Box::new(|r| r.late_over_60.to_string())),
        ("Fleet utilization (%)", Box::new(|r| format!("{:.1}", r.fleet_utilization_pct))),
        ("Fallback assignments", Box::new(|r| r.fallback_assignments.to_string())),
        ("Unassigned at end", Box::new(|r| r.unassigned_at_termination.to_string())),
    ];

    print!("| {:<22} |", "Metric");
    for report in reports {
        print!(" {:^15} |", report.strategy);
    }
    println!();
    print!("|{}|", "-".repeat(24));
    for _ in reports {
        print!("{}|", "-".repeat(17));
    }
    println!();

    for (label, render) in rows {
        print!("| {label:<22} |");
        for report in reports {
            print!(" {:^15} |", render(report));
        }
        println!();
    }
}

/// Write the reports as a JSON array.
pub fn write_json(reports: &[KpiReport], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, reports).map_err(io::Error::from)
}

/// Write a per-order diagnostic log as CSV.
pub fn write_order_log(world: &mut World, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let driver_names: HashMap<Entity, String> = world
        .query::<(Entity, &Driver)>()
        .iter(world)
        .map(|(entity, driver)| (entity, driver.id.clone()))
        .collect();

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "order_id",
        "status",
        "driver_id",
        "created_min",
        "pickup_min",
        "dropoff_min",
        "duration_min",
    ])?;

    let orders: Vec<Order> = world.query::<&Order>().iter(world).cloned().collect();
    for order in orders {
        let driver = order
            .assigned_to
            .and_then(|e| driver_names.get(&e).cloned())
            .unwrap_or_default();
        let fmt_opt = |t: Option<u64>| t.map(|v| format!("{:.2}", ms_to_mins(v))).unwrap_or_default();
        let duration = order
            .dropoff_time
            .map(|t| format!("{:.2}", ms_to_mins(t.saturating_sub(order.created_at))))
            .unwrap_or_default();
        writer.write_record([
            order.id.as_str(),
            match order.status {
                OrderStatus::Pending => "pending",
                OrderStatus::Assigned => "assigned",
                OrderStatus::PickedUp => "picked_up",
                OrderStatus::Delivered => "delivered",
            },
            driver.as_str(),
            &format!("{:.2}", ms_to_mins(order.created_at)),
            &fmt_opt(order.pickup_time),
            &fmt_opt(order.dropoff_time),
            &duration,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_cover_avg_median_p95_max() {
        let values: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        let (avg, median, p95, max) = stats(&values);
        assert_eq!(avg, 10.5);
        assert_eq!(median, 10.5);
        assert_eq!(p95, 20.0);
        assert_eq!(max, 20.0);
    }

    #[test]
    fn stats_on_empty_sample_are_zero() {
        assert_eq!(stats(&[]), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn stats_median_of_odd_sample() {
        let (_, median, _, _) = stats(&[3.0, 1.0, 2.0]);
        assert_eq!(median, 2.0);
    }
}
