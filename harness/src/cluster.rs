//! Cluster runner: one worker per thread over an in-process network.
//!
//! Every worker is built from the same [`EngineConfig`] and the same
//! domain reference, runs to completion, and hands back its
//! [`WorkerReport`]. The runner joins them all and folds the reports into
//! one [`ClusterReport`].
//!
//! A worker that panics is caught at its thread boundary. Its endpoint
//! survives the unwind, so the runner still tells the peers to stop and
//! takes the panicked worker's place at the end-of-run barrier.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use hdastar_kernel::transport::local::{local_network, Config, LocalEndpoint};
use hdastar_kernel::transport::{Rank, Tag, Transport};
use hdastar_search::contract::SearchDomain;
use hdastar_search::error::SearchError;
use hdastar_search::incumbent::Solution;
use hdastar_search::node::Cost;
use hdastar_search::policy::EngineConfig;
use hdastar_search::search::{Worker, WorkerReport};
use thiserror::Error;

use crate::config::{ConfigError, RunConfig, WorldConfig};
use crate::report::Summary;
use crate::worlds::grid::{Cell, WeightedGrid};
use crate::worlds::sliding_tile::SlidingTile;
use crate::worlds::WorldError;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("worker {rank} failed: {source}")]
    Search {
        rank: Rank,
        #[source]
        source: SearchError,
    },
    #[error("worker {rank} panicked")]
    WorkerPanicked { rank: Rank },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// How far the run's answer can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Certified termination with a solution: its cost is optimal.
    Optimal,
    /// Certified termination, and no goal costs less than the initial incumbent.
    NoSolution,
    /// Some worker stopped early (time budget or abort). The cost, if any,
    /// is an upper bound only.
    Unverified,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Optimal => "optimal",
            Self::NoSolution => "no_solution",
            Self::Unverified => "unverified",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClusterReport {
    /// Per-worker reports, indexed by rank.
    pub workers: Vec<WorkerReport>,
    pub outcome: Outcome,
    /// Best cost any worker knows, if below the initial incumbent.
    pub cost: Option<Cost>,
    /// The goal behind `cost`, as recorded by the worker that found it.
    pub solution: Option<Solution>,
    pub elapsed: Duration,
}

impl ClusterReport {
    fn assemble(workers: Vec<WorkerReport>, initial_incumbent: Cost, elapsed: Duration) -> Self {
        let verified = workers.iter().all(WorkerReport::is_verified);
        let cost = workers
            .iter()
            .map(|w| w.incumbent)
            .min()
            .filter(|&c| c < initial_incumbent);
        let solution = workers
            .iter()
            .filter_map(|w| w.solution.clone())
            .min_by_key(|s| (s.cost, s.found_by));
        let outcome = match (verified, cost) {
            (false, _) => Outcome::Unverified,
            (true, Some(_)) => Outcome::Optimal,
            (true, None) => Outcome::NoSolution,
        };
        Self {
            workers,
            outcome,
            cost,
            solution,
            elapsed,
        }
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::from_reports(&self.workers, self.elapsed)
    }
}

/// Search `domain` from `root` with `engine.worker_count` threads.
///
/// # Errors
///
/// [`ClusterError::Config`] if `engine` is invalid; otherwise the first
/// failed worker in rank order.
pub fn run_cluster<D>(
    domain: &D,
    root: &D::State,
    engine: &EngineConfig,
    buffer_bytes: usize,
) -> Result<ClusterReport, ClusterError>
where
    D: SearchDomain + Sync,
    D::State: Sync,
{
    engine.validate().map_err(ConfigError::from)?;
    tracing::info!(
        workers = engine.worker_count,
        buffer_bytes,
        outgo_threshold = engine.outgo_threshold,
        "cluster starting"
    );

    let started = Instant::now();
    let endpoints = local_network(Config {
        size: engine.worker_count,
        buffer_bytes,
    });
    let results: Vec<Result<WorkerReport, ClusterError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = endpoints
            .into_iter()
            .map(|ep| {
                let engine = engine.clone();
                scope.spawn(move || run_worker(domain, root, ep, engine))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(ClusterError::WorkerPanicked { rank }))
            })
            .collect()
    });

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        reports.push(result?);
    }
    let report = ClusterReport::assemble(reports, engine.initial_incumbent, started.elapsed());
    tracing::info!(
        outcome = %report.outcome,
        cost = ?report.cost,
        elapsed_ms = report.elapsed.as_millis(),
        "cluster finished"
    );
    Ok(report)
}

fn run_worker<D: SearchDomain>(
    domain: &D,
    root: &D::State,
    mut endpoint: LocalEndpoint,
    engine: EngineConfig,
) -> Result<WorkerReport, ClusterError> {
    let rank = endpoint.rank();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        Worker::new(domain, &mut endpoint, engine)?.run(root)
    }));
    match outcome {
        Ok(result) => result.map_err(|source| ClusterError::Search { rank, source }),
        Err(_) => {
            tracing::error!(rank, "worker panicked; aborting peers");
            abort_peers(&mut endpoint);
            if let Err(err) = endpoint.barrier() {
                tracing::warn!(rank, %err, "barrier after panic");
            }
            Err(ClusterError::WorkerPanicked { rank })
        }
    }
}

/// Send ABORT to every other rank; returns how many sends failed.
fn abort_peers(endpoint: &mut LocalEndpoint) -> usize {
    let rank = endpoint.rank();
    let mut failed = 0;
    for dest in (0..endpoint.size()).filter(|&d| d != rank) {
        if let Err(err) = endpoint.send(dest, Tag::Abort, Vec::new()) {
            tracing::warn!(rank, dest, %err, "abort not delivered");
            failed += 1;
        }
    }
    failed
}

/// Build the world a [`RunConfig`] names and run it.
///
/// # Errors
///
/// [`ClusterError::Config`] for an invalid world or engine section, or an
/// unsolvable board; otherwise as [`run_cluster`].
pub fn run_config(config: &RunConfig) -> Result<ClusterReport, ClusterError> {
    let engine = config.engine_config()?;
    let buffer_bytes = config.resolved_buffer_bytes();
    match &config.world {
        WorldConfig::SlidingTile {
            width,
            height,
            tiles,
        } => {
            let world = SlidingTile::new(*width, *height).map_err(ConfigError::from)?;
            let root = world.state_from_tiles(tiles).map_err(ConfigError::from)?;
            if !world.is_solvable(&root) {
                return Err(ConfigError::from(WorldError::Unsolvable).into());
            }
            run_cluster(&world, &root, &engine, buffer_bytes)
        }
        WorldConfig::Grid { costs, start, goal } => {
            let world = WeightedGrid::new(
                costs,
                Cell {
                    row: goal[0],
                    col: goal[1],
                },
            )
            .map_err(ConfigError::from)?;
            let root = world
                .start(Cell {
                    row: start[0],
                    col: start[1],
                })
                .map_err(ConfigError::from)?;
            run_cluster(&world, &root, &engine, buffer_bytes)
        }
    }
}
