//! Command-line entry point: load a dataset, run one or all dispatch
//! strategies, and print the KPI comparison.
//!
//! Exit codes: 0 success, 1 unreadable input, 2 invalid arguments (clap),
//! 3 internal simulation error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use indicatif::ProgressBar;

use dispatch_cli::{datasets, ingest, report};
use dispatch_core::clock::{fmt_clock, SimulationClock, ONE_MIN_MS};
use dispatch_core::config::DispatchConfig;
use dispatch_core::dispatch::PolicyKind;
use dispatch_core::ecs::{Order, OrderStatus};
use dispatch_core::error::SimFault;
use dispatch_core::oracle::OracleKind;
use dispatch_core::runner::{all_delivered, run_tick, run_to_completion, simulation_schedule};
use dispatch_core::scenario::{build_world, DriverSpec, OrderSpec, ScenarioParams};
use dispatch_core::telemetry::SimTelemetry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Baseline,
    Sequential,
    Combinatorial,
    Adaptive,
    All,
}

impl StrategyArg {
    fn kinds(self) -> Vec<PolicyKind> {
        match self {
            StrategyArg::Baseline => vec![PolicyKind::Baseline],
            StrategyArg::Sequential => vec![PolicyKind::Sequential],
            StrategyArg::Combinatorial => vec![PolicyKind::Combinatorial],
            StrategyArg::Adaptive => vec![PolicyKind::Adaptive],
            StrategyArg::All => PolicyKind::ALL.to_vec(),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "dispatch-sim",
    about = "Last-mile delivery dispatch simulator",
    long_about = "Replays a day of orders against a courier fleet under one or more\n\
                  dispatch strategies and reports fleet KPIs."
)]
struct Cli {
    /// Dataset name from the registry (see --list-datasets)
    #[arg(long, short, default_value = "demo")]
    dataset: String,

    /// Dispatch strategy to run
    #[arg(long, short, value_enum, default_value_t = StrategyArg::All)]
    strategy: StrategyArg,

    /// List known datasets and exit
    #[arg(long)]
    list_datasets: bool,

    /// Print tick-by-tick progress
    #[arg(long, short)]
    verbose: bool,

    /// Override the orders CSV (bypasses the dataset registry)
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Override the couriers CSV (bypasses the dataset registry)
    #[arg(long)]
    couriers: Option<PathBuf>,

    /// Write the KPI reports as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write a per-order diagnostic CSV for the last strategy run
    #[arg(long)]
    order_log: Option<PathBuf>,

    /// Route legs through an OSRM endpoint instead of Haversine
    #[cfg(feature = "osrm")]
    #[arg(long)]
    osrm_endpoint: Option<String>,
}

fn main() -> ExitCode {
    ExitCode::from(run())
}

fn run() -> u8 {
    let cli = Cli::parse();

    if cli.list_datasets {
        datasets::print_listing();
        return 0;
    }

    let (orders_path, couriers_path) = match (&cli.orders, &cli.couriers) {
        (Some(orders), Some(couriers)) => (orders.clone(), couriers.clone()),
        (None, None) => match datasets::find(&cli.dataset) {
            Some(dataset) => (dataset.orders_path(), dataset.couriers_path()),
            None => {
                eprintln!("unknown dataset '{}'", cli.dataset);
                datasets::print_listing();
                return 1;
            }
        },
        _ => {
            eprintln!("--orders and --couriers must be given together");
            return 1;
        }
    };

    let orders = match ingest::load_orders(&orders_path) {
        Ok(orders) => orders,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let drivers = match ingest::load_drivers(&couriers_path) {
        Ok(drivers) => drivers,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    println!(
        "Loaded {} orders and {} couriers from {}",
        orders.len(),
        drivers.len(),
        orders_path.display()
    );

    let kinds = cli.strategy.kinds();
    let progress = (kinds.len() > 1 && !cli.verbose).then(|| ProgressBar::new(kinds.len() as u64));

    let mut reports = Vec::new();
    for kind in &kinds {
        match run_strategy(&orders, &drivers, *kind, &cli) {
            Ok(report) => reports.push(report),
            Err(err) => {
                eprintln!("strategy {} failed: {err}", kind.as_str());
                return 3;
            }
        }
        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    report::print_comparison(&reports);

    if let Some(path) = &cli.json_out {
        if let Err(err) = report::write_json(&reports, path) {
            eprintln!("cannot write {}: {err}", path.display());
            return 3;
        }
    }

    0
}

fn scenario_params(kind: PolicyKind, cli: &Cli) -> ScenarioParams {
    #[allow(unused_mut)]
    let mut config = DispatchConfig::default();
    #[allow(unused_mut)]
    let mut oracle = OracleKind::Haversine;

    #[cfg(feature = "osrm")]
    if let Some(endpoint) = &cli.osrm_endpoint {
        config.use_road_distance = true;
        oracle = OracleKind::Osrm {
            endpoint: endpoint.clone(),
        };
    }
    #[cfg(not(feature = "osrm"))]
    let _ = cli;

    ScenarioParams::default()
        .with_policy(kind)
        .with_oracle(oracle)
        .with_config(config)
}

fn run_strategy(
    orders: &[OrderSpec],
    drivers: &[DriverSpec],
    kind: PolicyKind,
    cli: &Cli,
) -> Result<report::KpiReport, Box<dyn std::error::Error>> {
    let mut world = build_world(orders, drivers, scenario_params(kind, cli));
    let mut schedule = simulation_schedule();

    if cli.verbose {
        println!("==== {} ====", kind.as_str());
        let end_time = world.resource::<DispatchConfig>().end_time;
        loop {
            let now = world.resource::<SimulationClock>().now();
            if now >= end_time || all_delivered(&mut world) {
                break;
            }
            run_tick(&mut world, &mut schedule);
            if let Some(fault) = world.resource::<SimFault>().0.clone() {
                return Err(Box::new(fault));
            }

            let now = world.resource::<SimulationClock>().now();
            if (now / ONE_MIN_MS) % 10 == 0 {
                let delivered = world.resource::<SimTelemetry>().deliveries.len();
                let pending = world
                    .query::<&Order>()
                    .iter(&world)
                    .filter(|o| o.status != OrderStatus::Delivered)
                    .count();
                println!("[{}] delivered {delivered}, open {pending}", fmt_clock(now));
            }
        }
    } else {
        run_to_completion(&mut world, &mut schedule)?;
    }

    let kpis = report::extract_report(&mut world, kind.as_str());
    if let Some(path) = &cli.order_log {
        report::write_order_log(&mut world, path)?;
    }
    Ok(kpis)
}
