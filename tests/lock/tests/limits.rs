//! Resource limits: exhausted send buffers and wall-clock budgets.

use std::time::Duration;

use hdastar_harness::cluster::{run_cluster, ClusterError, Outcome};
use hdastar_harness::worlds::sliding_tile::SlidingTile;
use hdastar_kernel::transport::local::ENVELOPE_OVERHEAD;
use hdastar_kernel::transport::TransportError;
use hdastar_search::error::SearchError;
use hdastar_search::policy::EngineConfig;
use hdastar_search::search::TerminationKind;
use lock_tests::{eight_puzzle, eight_puzzle_instances, ROOMY_BUFFER};

#[test]
fn exhausted_send_buffer_fails_the_run() {
    let world = eight_puzzle();
    let root = &eight_puzzle_instances(&world)[0];
    // Too small for any NODE batch.
    let err = run_cluster(&world, root, &EngineConfig::for_workers(2), ENVELOPE_OVERHEAD).unwrap_err();
    assert!(
        matches!(
            err,
            ClusterError::Search {
                source: SearchError::Transport(TransportError::BufferExhausted { .. }),
                ..
            }
        ),
        "{err:?}"
    );
}

#[test]
fn expired_budget_yields_unverified_result() {
    let world = SlidingTile::new(4, 4).unwrap();
    let root = world.scramble(99, 400);
    let engine = EngineConfig {
        time_budget: Some(Duration::from_millis(1)),
        ..EngineConfig::for_workers(3)
    };
    let report = run_cluster(&world, &root, &engine, ROOMY_BUFFER).unwrap();
    assert_eq!(report.outcome, Outcome::Unverified);
    assert!(report.workers.iter().any(|w| matches!(
        w.termination,
        Some(TerminationKind::TimedOut | TerminationKind::Aborted { .. })
    )));
    assert!(report.workers.iter().all(|w| !w.is_verified()));
}
