//! Cross-process determinism of the cluster fixture.
//!
//! Spawns the `cluster_fixture` binary under several environment and
//! worker-count variants and asserts that the schedule-independent output
//! (outcome, cost, goal) never changes.

use std::path::Path;
use std::process::Command;

/// `cargo test` puts test binaries in `target/<profile>/deps/`; the
/// fixture binary lives one level up.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("cluster_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

fn run_variant(work_dir: &str, args: &[&str], env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();
    let mut command = Command::new(&bin);
    command
        .args(args)
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LANG")
        .env_remove("HDASTAR_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }
    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, args={args:?}): {e}")
    });
    assert!(
        output.status.success(),
        "cluster_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

/// Lines that do not depend on the worker count.
fn count_independent(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|line| !line.contains(".workers="))
        .collect()
}

#[test]
fn crossproc_output_is_stable_across_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &["3"], &[]);
    assert!(baseline.contains("tile0.outcome=optimal"), "{baseline}");
    assert!(baseline.contains("grid.outcome=optimal"), "{baseline}");

    let alt_cwd = if cfg!(target_os = "windows") { "C:\\" } else { "/tmp" };
    assert_eq!(baseline, run_variant(alt_cwd, &["3"], &[]), "cwd changed output");
    assert_eq!(
        baseline,
        run_variant(&root, &["3"], &[("LC_ALL", "C"), ("LANG", "C")]),
        "locale changed output"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &["3"], &[("HDASTAR_LOG", "debug"), ("TZ", "America/New_York")]),
        "log level or TZ changed output"
    );
}

#[test]
fn crossproc_cost_is_independent_of_worker_count_and_threshold() {
    let root = workspace_root();
    let single = run_variant(&root, &["1"], &[]);
    for args in [["2", "0"], ["4", "0"], ["4", "8"]] {
        let other = run_variant(&root, &args, &[]);
        assert_eq!(
            count_independent(&single),
            count_independent(&other),
            "args {args:?}"
        );
    }
    assert_eq!(single.lines().count(), 6 * 4, "six instances, four lines each");
}
