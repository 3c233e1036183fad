//! End-to-end scenarios on explicit graphs with pinned ownership.

use hdastar_harness::cluster::{run_cluster, Outcome};
use hdastar_harness::worlds::explicit::{ExplicitGraph, Visit};
use hdastar_search::policy::EngineConfig;
use lock_tests::ROOMY_BUFFER;

#[test]
fn root_goal_costs_zero_with_no_expansions() {
    for workers in [1, 2, 4] {
        let mut g = ExplicitGraph::new(2);
        g.add_edge(0, 1, 1).unwrap();
        g.set_goal(0).unwrap();
        let report = run_cluster(
            &g,
            &Visit::at(0),
            &EngineConfig::for_workers(workers),
            ROOMY_BUFFER,
        )
        .unwrap();
        assert_eq!(report.outcome, Outcome::Optimal, "workers={workers}");
        assert_eq!(report.cost, Some(0));
        assert_eq!(report.summary().expansions, 0);
    }
}

#[test]
fn successor_owned_elsewhere_travels_as_node_batch() {
    // 0 (worker 0) -> 1 (worker 1) -> 2 (worker 0, goal)
    let mut g = ExplicitGraph::new(3);
    g.add_edge(0, 1, 2).unwrap();
    g.add_edge(1, 2, 3).unwrap();
    g.set_key(0, 0).unwrap();
    g.set_key(1, 1).unwrap();
    g.set_key(2, 0).unwrap();
    g.set_goal(2).unwrap();

    let report = run_cluster(&g, &Visit::at(0), &EngineConfig::for_workers(2), ROOMY_BUFFER).unwrap();
    assert_eq!(report.outcome, Outcome::Optimal);
    assert_eq!(report.cost, Some(5));
    assert_eq!(report.workers[1].stats.nodes_received, 1);
    assert_eq!(report.workers[1].stats.expansions, 1);
    assert_eq!(report.workers[0].stats.nodes_received, 1);
    let solution = report.solution.as_ref().unwrap();
    assert_eq!(solution.found_by, 0);
    assert_eq!(solution.state, ExplicitGraph::packed(2));
}

#[test]
fn incumbent_from_one_worker_bounds_the_other() {
    // root -> G (goal, 10, worker 0) and root -> X (12, worker 1) -> Y (goal, 13)
    let mut g = ExplicitGraph::new(4);
    g.add_edge(0, 1, 10).unwrap();
    g.add_edge(0, 2, 12).unwrap();
    g.add_edge(2, 3, 1).unwrap();
    g.set_key(0, 0).unwrap();
    g.set_key(1, 0).unwrap();
    g.set_key(2, 1).unwrap();
    g.set_key(3, 1).unwrap();
    g.set_goal(1).unwrap();
    g.set_goal(3).unwrap();

    let report = run_cluster(&g, &Visit::at(0), &EngineConfig::for_workers(2), ROOMY_BUFFER).unwrap();
    assert_eq!(report.outcome, Outcome::Optimal);
    assert_eq!(report.cost, Some(10));
    for w in &report.workers {
        assert_eq!(w.incumbent, 10, "worker {} must adopt the global best", w.rank);
    }
}

#[test]
fn equal_cost_paths_through_different_owners() {
    // Two equal-cost routes into vertex 3 arrive from different workers.
    let mut g = ExplicitGraph::new(5);
    g.add_edge(0, 1, 1).unwrap();
    g.add_edge(0, 2, 1).unwrap();
    g.add_edge(1, 3, 2).unwrap();
    g.add_edge(2, 3, 2).unwrap();
    g.add_edge(3, 4, 1).unwrap();
    for (v, key) in [(0, 0), (1, 1), (2, 2), (3, 0), (4, 1)] {
        g.set_key(v, key).unwrap();
    }
    g.set_goal(4).unwrap();

    let report = run_cluster(&g, &Visit::at(0), &EngineConfig::for_workers(3), ROOMY_BUFFER).unwrap();
    assert_eq!(report.cost, Some(4));
    assert_eq!(report.workers[0].stats.nodes_received, 2);
    // The second arrival of vertex 3 never gets expanded.
    assert_eq!(report.workers[0].stats.expansions, 2);
}
