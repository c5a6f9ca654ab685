mod support;

use dispatch_core::clock::SimulationClock;
use dispatch_core::config::DispatchConfig;
use dispatch_core::dispatch::PolicyKind;
use dispatch_core::ecs::{Order, OrderStatus};
use dispatch_core::geo::Coordinate;
use dispatch_core::runner::{all_delivered, run_tick, simulation_schedule};
use dispatch_core::scenario::{build_world, ScenarioParams};

use support::{
    assert_invariants, delivered_count, driver_spec, drivers_activated, minute, order_by_id,
    order_spec, run_scenario, T17,
};

fn co_located_pair() -> Vec<dispatch_core::scenario::OrderSpec> {
    let pickup = Coordinate::new(25.30, 51.50);
    vec![
        order_spec("O1", pickup, Coordinate::new(25.318, 51.50), T17, 30.0),
        order_spec("O2", pickup, Coordinate::new(25.319, 51.50), T17, 30.0),
    ]
}

/// Two co-located orders, one driver at the pickup: the market policies put
/// both on that driver; baseline needs a second driver.
#[test]
fn co_located_orders_bundle_under_market_policies() {
    let drivers = vec![
        driver_spec("D1", Coordinate::new(25.30, 51.50)),
        driver_spec("D2", Coordinate::new(25.35, 51.55)),
    ];

    for policy in [PolicyKind::Sequential, PolicyKind::Combinatorial] {
        let mut world = run_scenario(&co_located_pair(), &drivers, policy);
        assert_eq!(delivered_count(&mut world), 2, "policy {policy:?}");
        assert_eq!(drivers_activated(&world), 1, "policy {policy:?}");

        let o1 = order_by_id(&mut world, "O1");
        let o2 = order_by_id(&mut world, "O2");
        assert_eq!(o1.assigned_to, o2.assigned_to);
    }

    let mut world = run_scenario(&co_located_pair(), &drivers, PolicyKind::Baseline);
    assert_eq!(delivered_count(&mut world), 2);
    assert_eq!(drivers_activated(&world), 2);
}

/// Baseline never activates fewer drivers than combinatorial on the same
/// input.
#[test]
fn baseline_activates_at_least_as_many_drivers_as_combinatorial() {
    // Two tight clusters of two orders each, four drivers spread around.
    let cluster_a = Coordinate::new(25.30, 51.50);
    let cluster_b = Coordinate::new(25.26, 51.46);
    let orders = vec![
        order_spec("A1", cluster_a, Coordinate::new(25.315, 51.50), T17, 30.0),
        order_spec("A2", cluster_a, Coordinate::new(25.316, 51.502), T17, 30.0),
        order_spec("B1", cluster_b, Coordinate::new(25.245, 51.46), T17, 30.0),
        order_spec("B2", cluster_b, Coordinate::new(25.246, 51.462), T17, 30.0),
    ];
    let drivers = vec![
        driver_spec("D1", cluster_a),
        driver_spec("D2", cluster_b),
        driver_spec("D3", Coordinate::new(25.33, 51.53)),
        driver_spec("D4", Coordinate::new(25.23, 51.43)),
    ];

    let mut baseline = run_scenario(&orders, &drivers, PolicyKind::Baseline);
    let mut combinatorial = run_scenario(&orders, &drivers, PolicyKind::Combinatorial);

    assert_eq!(delivered_count(&mut baseline), 4);
    assert_eq!(delivered_count(&mut combinatorial), 4);
    assert!(drivers_activated(&baseline) >= drivers_activated(&combinatorial));
    assert_eq!(drivers_activated(&combinatorial), 2);
}

/// A pair whose joint service breaks the SLA ends up as two singleton
/// assignments on two different drivers.
#[test]
fn sla_keeps_far_apart_orders_on_separate_drivers() {
    let p1 = Coordinate::new(25.20, 51.40);
    let p2 = Coordinate::new(25.20, 51.48);
    let orders = vec![
        order_spec("O1", p1, Coordinate::new(25.29, 51.40), T17, 20.0),
        order_spec("O2", p2, Coordinate::new(25.29, 51.48), T17, 20.0),
    ];
    let drivers = vec![driver_spec("D1", p1), driver_spec("D2", p2)];

    let mut world = run_scenario(&orders, &drivers, PolicyKind::Combinatorial);

    assert_eq!(delivered_count(&mut world), 2);
    let o1 = order_by_id(&mut world, "O1");
    let o2 = order_by_id(&mut world, "O2");
    assert_ne!(o1.assigned_to, o2.assigned_to, "the pair bundle must not survive the SLA");
    assert_eq!(drivers_activated(&world), 2);
}

/// A burst of orders under the adaptive policy: structural invariants hold
/// at every tick boundary and order statuses never move backwards.
#[test]
fn adaptive_burst_run_preserves_invariants_every_tick() {
    let mut orders = Vec::new();
    // Twelve orders over five minutes around two pickup clusters.
    for i in 0..12u64 {
        let cluster = if i % 2 == 0 {
            Coordinate::new(25.30, 51.50)
        } else {
            Coordinate::new(25.31, 51.51)
        };
        let dropoff = Coordinate::new(25.30 + 0.002 * i as f64, 51.53);
        orders.push(order_spec(
            &format!("O{i:02}"),
            cluster,
            dropoff,
            minute(i / 3),
            30.0,
        ));
    }
    let drivers: Vec<_> = (0..6)
        .map(|i| {
            driver_spec(
                &format!("D{i}"),
                Coordinate::new(25.29 + 0.01 * i as f64, 51.49),
            )
        })
        .collect();

    let mut world = build_world(
        &orders,
        &drivers,
        ScenarioParams::default().with_policy(PolicyKind::Adaptive),
    );
    let mut schedule = simulation_schedule();

    let mut last_status: std::collections::HashMap<String, OrderStatus> = Default::default();
    let end = world.resource::<DispatchConfig>().end_time;
    let mut guard = 0;
    loop {
        let now = world.resource::<SimulationClock>().now();
        if now >= end || all_delivered(&mut world) {
            break;
        }
        run_tick(&mut world, &mut schedule);
        assert_invariants(&mut world);

        let statuses: Vec<(String, OrderStatus)> = world
            .query::<&Order>()
            .iter(&world)
            .map(|o| (o.id.clone(), o.status))
            .collect();
        for (id, status) in statuses {
            if let Some(previous) = last_status.get(&id) {
                assert!(*previous <= status, "order {id} moved backwards");
            }
            last_status.insert(id, status);
        }

        guard += 1;
        assert!(guard < 1000, "burst run failed to terminate");
    }

    assert_eq!(delivered_count(&mut world), 12);
    assert!(drivers_activated(&world) <= 6);
}
