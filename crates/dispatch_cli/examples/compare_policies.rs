//! Run every dispatch strategy over a synthetic evening and print the KPI
//! comparison.
//!
//! ```sh
//! cargo run -p dispatch_cli --example compare_policies
//! ```

use dispatch_cli::report::{extract_report, print_comparison};
use dispatch_core::dispatch::PolicyKind;
use dispatch_core::generator::{generate_scenario, GeneratorParams};
use dispatch_core::runner::{run_to_completion, simulation_schedule};
use dispatch_core::scenario::{build_world, ScenarioParams};

fn main() {
    let (orders, drivers) = generate_scenario(&GeneratorParams {
        seed: 42,
        order_count: 80,
        driver_count: 25,
        window_mins: 90,
        ..Default::default()
    });
    println!(
        "Synthetic scenario: {} orders, {} couriers",
        orders.len(),
        drivers.len()
    );

    let mut reports = Vec::new();
    for kind in PolicyKind::ALL {
        let mut world = build_world(
            &orders,
            &drivers,
            ScenarioParams::default().with_policy(kind),
        );
        let mut schedule = simulation_schedule();
        match run_to_completion(&mut world, &mut schedule) {
            Ok(summary) => {
                println!("{}: finished in {} ticks", kind.as_str(), summary.ticks);
                reports.push(extract_report(&mut world, kind.as_str()));
            }
            Err(err) => eprintln!("{}: {err}", kind.as_str()),
        }
    }

    print_comparison(&reports);
}
