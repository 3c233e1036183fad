//! Engine configuration.

use std::time::Duration;

use crate::error::SearchError;
use crate::node::Cost;

/// Knobs resolved once, before any worker starts.
///
/// Every worker in a run must be built from the same configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of cooperating workers (ranks `0..worker_count`).
    pub worker_count: usize,
    /// A destination buffer is flushed once it holds more than this many nodes.
    pub outgo_threshold: usize,
    /// Frontier headroom past nominal capacity before it regrows.
    pub frontier_overrun: usize,
    /// Nominal duplicate-table capacity; sets the bucket count.
    pub closed_capacity: usize,
    /// Initial nominal frontier capacity.
    pub frontier_capacity: usize,
    /// Upper bound on the solution cost. Must exceed the optimum to find it.
    pub initial_incumbent: Cost,
    /// Wall-clock budget per worker. Exceeding it yields an unverified result.
    pub time_budget: Option<Duration>,
    /// Never apply the inverse of the operator that produced a node.
    pub skip_inverse_operator: bool,
    /// Recompute `h` at every pop and fail on `f != g + h`.
    pub verify_node_costs: bool,
    /// Emit a trace event per expansion.
    pub trace_expansions: bool,
}

impl EngineConfig {
    /// Defaults for a run of `worker_count` workers.
    #[must_use]
    pub fn for_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// [`SearchError::InvalidConfig`] naming the first offending knob.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.worker_count == 0 {
            return Err(invalid("worker_count must be at least 1"));
        }
        if self.closed_capacity == 0 {
            return Err(invalid("closed_capacity must be at least 1"));
        }
        if self.frontier_capacity == 0 {
            return Err(invalid("frontier_capacity must be at least 1"));
        }
        if self.initial_incumbent == 0 {
            return Err(invalid("initial_incumbent must be positive"));
        }
        if self.time_budget == Some(Duration::ZERO) {
            return Err(invalid("time_budget must be positive when set"));
        }
        Ok(())
    }
}

fn invalid(detail: &str) -> SearchError {
    SearchError::InvalidConfig {
        detail: detail.into(),
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: 1,
            outgo_threshold: 0,
            frontier_overrun: 0,
            closed_capacity: 1_105_036,
            frontier_capacity: 100,
            initial_incumbent: 1_000_000,
            time_budget: None,
            skip_inverse_operator: true,
            verify_node_costs: false,
            trace_expansions: false,
        }
    }
}
