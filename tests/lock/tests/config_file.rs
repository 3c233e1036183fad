//! Runs described by JSON config files.

use hdastar_harness::cluster::{run_config, Outcome};
use hdastar_harness::config::RunConfig;
use hdastar_harness::report;
use hdastar_search::policy::EngineConfig;
use hdastar_search::sequential::sequential_search;
use lock_tests::{eight_puzzle, eight_puzzle_instances, walled_grid_weights};

#[test]
fn tile_config_file_runs_to_optimum() {
    let world = eight_puzzle();
    let root = &eight_puzzle_instances(&world)[2];
    let expected = sequential_search(&world, root, &EngineConfig::default())
        .unwrap()
        .cost;

    let doc = serde_json::json!({
        "world": { "kind": "sliding_tile", "width": 3, "height": 3, "tiles": root.tiles() },
        "workers": 3,
        "engine": { "outgo_threshold": 2, "verify_node_costs": true }
    });
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.json");
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let config = RunConfig::from_path(&path).unwrap();
    let result = run_config(&config).unwrap();
    assert_eq!(result.outcome, Outcome::Optimal);
    assert_eq!(result.cost, expected);

    let rendered = report::to_json(&result);
    assert_eq!(rendered["outcome"], "optimal");
    assert_eq!(rendered["summary"]["workers"], 3);
}

#[test]
fn grid_config_file_runs_to_optimum() {
    let doc = serde_json::json!({
        "world": { "kind": "grid", "costs": walled_grid_weights(), "start": [0, 0], "goal": [11, 11] },
        "workers": 2
    });
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.json");
    std::fs::write(&path, doc.to_string()).unwrap();

    let result = run_config(&RunConfig::from_path(&path).unwrap()).unwrap();
    let (grid, start) = lock_tests::walled_grid();
    let expected = sequential_search(&grid, &start, &EngineConfig::default())
        .unwrap()
        .cost;
    assert_eq!(result.cost, expected);
    assert!(report::stable_lines(&result).contains(&"outcome=optimal".to_string()));
}
