//! Aggregation of per-worker reports.
//!
//! Workers report raw counters; everything cross-worker (totals,
//! distributions, load balance, communication overhead) is derived here.

use std::time::Duration;

use hdastar_search::search::WorkerReport;
use serde::Serialize;

use crate::cluster::ClusterReport;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub workers: usize,
    pub expansions: u64,
    pub generations: u64,
    pub self_routed: u64,
    pub duplicates_discarded: u64,
    pub reopened: u64,
    pub frontier_dominated: u64,
    pub batches_sent: u64,
    pub nodes_sent: u64,
    pub residual_nodes: u64,
    pub expansions_per_worker: Vec<u64>,
    pub generations_per_worker: Vec<u64>,
    /// Max over mean of per-worker expansions; 1.0 is perfect balance.
    pub load_balance: f64,
    /// Population standard deviation of per-worker expansions.
    pub expansions_stddev: f64,
    /// Share of generated nodes sent to another worker.
    pub communication_overhead: f64,
    pub elapsed_ms: u64,
}

impl Summary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_reports(reports: &[WorkerReport], elapsed: Duration) -> Self {
        let sum = |f: fn(&WorkerReport) -> u64| reports.iter().map(f).sum::<u64>();
        let expansions_per_worker: Vec<u64> = reports.iter().map(|r| r.stats.expansions).collect();
        let generations_per_worker: Vec<u64> =
            reports.iter().map(|r| r.stats.generations).collect();

        let expansions = sum(|r| r.stats.expansions);
        let generations = sum(|r| r.stats.generations);
        let self_routed = sum(|r| r.stats.self_routed);

        let n = reports.len().max(1) as f64;
        let mean = expansions as f64 / n;
        let max = expansions_per_worker.iter().copied().max().unwrap_or(0) as f64;
        let load_balance = if mean > 0.0 { max / mean } else { 1.0 };
        let variance = expansions_per_worker
            .iter()
            .map(|&e| (e as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        let communication_overhead = if generations > 0 {
            (generations - self_routed) as f64 / generations as f64
        } else {
            0.0
        };

        Self {
            workers: reports.len(),
            expansions,
            generations,
            self_routed,
            duplicates_discarded: sum(|r| r.stats.duplicates_discarded),
            reopened: sum(|r| r.stats.reopened),
            frontier_dominated: sum(|r| r.stats.frontier_dominated),
            batches_sent: sum(|r| r.stats.batches_sent),
            nodes_sent: sum(|r| r.stats.nodes_sent),
            residual_nodes: sum(|r| r.stats.residual_nodes),
            expansions_per_worker,
            generations_per_worker,
            load_balance,
            expansions_stddev: variance.sqrt(),
            communication_overhead,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// The whole run as one JSON document.
#[must_use]
pub fn to_json(report: &ClusterReport) -> serde_json::Value {
    serde_json::json!({
        "outcome": report.outcome.to_string(),
        "cost": report.cost,
        "goal": report.solution.as_ref().map(|s| s.state.to_string()),
        "found_by": report.solution.as_ref().map(|s| s.found_by),
        "summary": report.summary(),
    })
}

/// Schedule-independent `key=value` lines: identical across repeated runs
/// of the same problem and worker count.
#[must_use]
pub fn stable_lines(report: &ClusterReport) -> Vec<String> {
    let cost = report
        .cost
        .map_or_else(|| "none".to_string(), |c| c.to_string());
    let goal = report
        .solution
        .as_ref()
        .map_or_else(|| "none".to_string(), |s| s.state.to_string());
    vec![
        format!("outcome={}", report.outcome),
        format!("cost={cost}"),
        format!("goal={goal}"),
        format!("workers={}", report.workers.len()),
    ]
}

/// Schedule-dependent counters as `key=value` lines.
#[must_use]
pub fn stats_lines(summary: &Summary) -> Vec<String> {
    vec![
        format!("expansions={}", summary.expansions),
        format!("generations={}", summary.generations),
        format!("self_routed={}", summary.self_routed),
        format!("duplicates_discarded={}", summary.duplicates_discarded),
        format!("batches_sent={}", summary.batches_sent),
        format!("nodes_sent={}", summary.nodes_sent),
        format!("load_balance={:.3}", summary.load_balance),
        format!("expansions_stddev={:.3}", summary.expansions_stddev),
        format!("communication_overhead={:.3}", summary.communication_overhead),
        format!("elapsed_ms={}", summary.elapsed_ms),
    ]
}
