//! Binary that solves fixed instances on an in-process cluster and prints
//! schedule-independent output lines for cross-process verification.
//!
//! Usage: `cluster_fixture <workers> [outgo_threshold]`
//!
//! Output: one block of key=value lines per instance, each line prefixed
//! with the instance name.

use hdastar_harness::cluster::run_cluster;
use hdastar_harness::report::stable_lines;
use hdastar_harness::telemetry;
use hdastar_search::policy::EngineConfig;
use lock_tests::{eight_puzzle, eight_puzzle_instances, walled_grid, ROOMY_BUFFER};

fn main() {
    telemetry::init();
    let mut args = std::env::args().skip(1);
    let workers: usize = args
        .next()
        .map_or(Ok(2), |a| a.parse())
        .expect("workers must be an integer");
    let outgo_threshold: usize = args
        .next()
        .map_or(Ok(0), |a| a.parse())
        .expect("outgo_threshold must be an integer");
    let engine = EngineConfig {
        outgo_threshold,
        verify_node_costs: true,
        ..EngineConfig::for_workers(workers)
    };

    let world = eight_puzzle();
    for (i, root) in eight_puzzle_instances(&world).iter().enumerate() {
        let report = run_cluster(&world, root, &engine, ROOMY_BUFFER).expect("tile run failed");
        for line in stable_lines(&report) {
            println!("tile{i}.{line}");
        }
    }

    let (grid, start) = walled_grid();
    let report = run_cluster(&grid, &start, &engine, ROOMY_BUFFER).expect("grid run failed");
    for line in stable_lines(&report) {
        println!("grid.{line}");
    }
}
