//! Distributed runs agree with the sequential reference on cost.

use hdastar_harness::cluster::{run_cluster, ClusterReport, Outcome};
use hdastar_search::contract::SearchDomain;
use hdastar_search::policy::EngineConfig;
use hdastar_search::sequential::sequential_search;
use lock_tests::{eight_puzzle, eight_puzzle_instances, walled_grid, ROOMY_BUFFER};

fn check_certified(report: &ClusterReport, context: &str) {
    assert_eq!(report.outcome, Outcome::Optimal, "{context}");
    for w in &report.workers {
        assert!(w.is_verified(), "{context}: worker {} not certified", w.rank);
        assert_eq!(
            w.stats.residual_nodes, 0,
            "{context}: worker {} had nodes in flight at shutdown",
            w.rank
        );
        let costs: Vec<u32> = w.incumbent_history.iter().map(|u| u.cost).collect();
        assert!(
            costs.windows(2).all(|pair| pair[1] < pair[0]),
            "{context}: worker {} incumbent history not decreasing: {costs:?}",
            w.rank
        );
        assert_eq!(Some(w.incumbent), report.cost, "{context}: worker {}", w.rank);
    }
}

#[test]
fn one_worker_matches_sequential_on_eight_puzzle() {
    let world = eight_puzzle();
    for (i, root) in eight_puzzle_instances(&world).iter().enumerate() {
        let expected = sequential_search(&world, root, &EngineConfig::default())
            .unwrap()
            .cost;
        let report = run_cluster(&world, root, &EngineConfig::default(), ROOMY_BUFFER).unwrap();
        assert_eq!(report.cost, expected, "instance {i}");
        check_certified(&report, &format!("instance {i}"));
    }
}

#[test]
fn many_workers_match_sequential_on_eight_puzzle() {
    let world = eight_puzzle();
    for (i, root) in eight_puzzle_instances(&world).iter().enumerate() {
        let expected = sequential_search(&world, root, &EngineConfig::default())
            .unwrap()
            .cost;
        assert!(expected.is_some(), "scrambled boards are solvable");
        for workers in [2, 3, 4] {
            for outgo_threshold in [0, 4] {
                let engine = EngineConfig {
                    outgo_threshold,
                    verify_node_costs: true,
                    closed_capacity: 1 << 14,
                    ..EngineConfig::for_workers(workers)
                };
                let context = format!("instance {i}, {workers} workers, threshold {outgo_threshold}");
                let report = run_cluster(&world, root, &engine, ROOMY_BUFFER).unwrap();
                assert_eq!(report.cost, expected, "{context}");
                check_certified(&report, &context);
            }
        }
    }
}

#[test]
fn walled_grid_matches_sequential() {
    let (grid, start) = walled_grid();
    let expected = sequential_search(&grid, &start, &EngineConfig::default())
        .unwrap()
        .cost;
    assert!(expected.is_some());
    for workers in [1, 2, 5] {
        let report =
            run_cluster(&grid, &start, &EngineConfig::for_workers(workers), ROOMY_BUFFER).unwrap();
        assert_eq!(report.cost, expected, "{workers} workers");
        check_certified(&report, &format!("grid, {workers} workers"));
        let goal = report.solution.as_ref().unwrap();
        assert!(grid.is_goal(&grid.unpack(&goal.state)));
    }
}

#[test]
fn small_frontier_regrows_without_losing_optimality() {
    let world = eight_puzzle();
    let root = &eight_puzzle_instances(&world)[0];
    let expected = sequential_search(&world, root, &EngineConfig::default())
        .unwrap()
        .cost;
    let engine = EngineConfig {
        frontier_capacity: 1,
        frontier_overrun: 1,
        closed_capacity: 7,
        ..EngineConfig::for_workers(2)
    };
    let report = run_cluster(&world, root, &engine, ROOMY_BUFFER).unwrap();
    assert_eq!(report.cost, expected);
    assert!(report.workers.iter().any(|w| w.stats.frontier_regrowths > 0));
}

#[test]
fn work_is_actually_distributed() {
    let world = eight_puzzle();
    let root = &eight_puzzle_instances(&world)[1];
    let report = run_cluster(&world, root, &EngineConfig::for_workers(4), ROOMY_BUFFER).unwrap();
    let summary = report.summary();
    assert!(summary.communication_overhead > 0.0);
    assert!(summary.batches_sent > 0);
    assert_eq!(summary.expansions_per_worker.len(), 4);
}
