//! The per-worker search loop.
//!
//! A [`Worker`] owns one partition of the state space: a frontier, a
//! duplicate table, one outgoing buffer per peer, an incumbent and a
//! termination detector. `step` runs exactly one loop iteration so tests can
//! interleave several workers on one thread; `run` loops `step` until the
//! worker terminates and then shuts it down.
//!
//! # Iteration
//!
//! 1. Drain incoming NODE batches into the frontier and INCUMBENT messages
//!    into the incumbent. An ABORT ends the run.
//! 2. Check the wall-clock budget.
//! 3. If no frontier node beats the incumbent, flush every outgoing buffer
//!    and take one termination step.
//! 4. Otherwise pop the best node and apply the duplicate policy. A goal
//!    lowers the incumbent and is broadcast. Any other node is recorded in
//!    the duplicate table and expanded; each successor goes to the frontier
//!    if this worker owns it, or to the owner's outgoing buffer.

use std::time::{Duration, Instant};

use hdastar_kernel::transport::{Rank, Source, Tag, Transport};

use crate::closed::{Admission, DuplicateTable};
use crate::contract::SearchDomain;
use crate::error::SearchError;
use crate::frontier::{Frontier, PushOutcome};
use crate::incumbent::{self, Incumbent, IncumbentUpdate, Solution};
use crate::node::{Cost, Operator, SearchNode};
use crate::outgoing::{FlushReport, OutgoingBuffers};
use crate::partition::Partitioner;
use crate::policy::EngineConfig;
use crate::termination::{TerminationDetector, Verdict};
use crate::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Running,
    IdleChecking,
    Terminated,
}

/// Why a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    /// Global quiescence certified by the token ring.
    Certified,
    /// This worker ran out of wall-clock budget.
    TimedOut,
    /// A peer ran out of budget or failed and asked everyone to stop.
    Aborted { by: Rank },
}

/// What one call to [`Worker::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Expanded { successors: usize },
    /// Popped a node the duplicate table already covers.
    Discarded,
    GoalFound { cost: Cost },
    /// Nothing beats the incumbent; took a termination step.
    Idle,
    Terminated(TerminationKind),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub expansions: u64,
    pub generations: u64,
    /// Successors this worker owned itself.
    pub self_routed: u64,
    pub duplicates_discarded: u64,
    pub reopened: u64,
    /// Pushes dropped because the frontier already held the state at no higher `g`.
    pub frontier_dominated: u64,
    pub batches_sent: u64,
    pub nodes_sent: u64,
    pub batches_received: u64,
    pub nodes_received: u64,
    pub frontier_high_water: u64,
    pub frontier_regrowths: u64,
    /// Nodes still in flight to this worker when it shut down.
    pub residual_nodes: u64,
}

/// Immutable result of one worker's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub rank: Rank,
    pub stats: WorkerStats,
    /// Final incumbent, after adopting every announcement still in flight.
    pub incumbent: Cost,
    /// The best goal this worker found, if any.
    pub solution: Option<Solution>,
    pub incumbent_history: Vec<IncumbentUpdate>,
    /// Why the worker stopped; `None` for a snapshot of a live worker.
    pub termination: Option<TerminationKind>,
    pub elapsed: Duration,
}

impl WorkerReport {
    /// Whether the run ended with certified global termination.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.termination == Some(TerminationKind::Certified)
    }
}

pub struct Worker<'d, D: SearchDomain, T: Transport> {
    domain: &'d D,
    transport: T,
    config: EngineConfig,
    rank: Rank,
    partitioner: Partitioner,
    frontier: Frontier,
    closed: DuplicateTable,
    outgoing: OutgoingBuffers,
    incumbent: Incumbent,
    termination: TerminationDetector,
    phase: Phase,
    stopped: Option<TerminationKind>,
    stats: WorkerStats,
    started: Instant,
    ops: Vec<Operator>,
}

impl<'d, D: SearchDomain, T: Transport> Worker<'d, D, T> {
    /// Build the worker for `transport.rank()`.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidConfig`] if the config fails validation or its
    /// `worker_count` disagrees with the transport.
    pub fn new(domain: &'d D, transport: T, config: EngineConfig) -> Result<Self, SearchError> {
        config.validate()?;
        if transport.size() != config.worker_count {
            return Err(SearchError::InvalidConfig {
                detail: format!(
                    "worker_count is {} but the transport has {} ranks",
                    config.worker_count,
                    transport.size()
                ),
            });
        }
        let rank = transport.rank();
        Ok(Self {
            domain,
            partitioner: Partitioner::new(config.worker_count),
            frontier: Frontier::new(config.frontier_capacity, config.frontier_overrun),
            closed: DuplicateTable::new(config.closed_capacity),
            outgoing: OutgoingBuffers::new(rank, config.worker_count),
            incumbent: Incumbent::new(rank, config.initial_incumbent),
            termination: TerminationDetector::new(rank, config.worker_count),
            phase: Phase::Init,
            stopped: None,
            stats: WorkerStats::default(),
            started: Instant::now(),
            ops: Vec::new(),
            transport,
            config,
            rank,
        })
    }

    /// Insert the root. Only worker 0 holds it, whatever its distribution key.
    pub fn seed(&mut self, root: &D::State) {
        if self.rank != 0 {
            return;
        }
        let packed = self.domain.pack(root);
        let h = self.domain.heuristic(root);
        let key = self.domain.distribution_hash(root, &packed);
        self.push_local(SearchNode::new(packed, 0, h, key, None));
    }

    #[must_use]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    #[must_use]
    pub fn closed(&self) -> &DuplicateTable {
        &self.closed
    }

    #[must_use]
    pub fn incumbent(&self) -> &Incumbent {
        &self.incumbent
    }

    #[must_use]
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Run one loop iteration.
    ///
    /// # Errors
    ///
    /// Transport failures (including an exhausted outgoing pool), malformed
    /// messages and, with `verify_node_costs`, a node whose `f` disagrees
    /// with `g + h`.
    pub fn step(&mut self) -> Result<Step, SearchError> {
        if let Some(kind) = self.stopped {
            return Ok(Step::Terminated(kind));
        }
        if self.phase == Phase::Init {
            self.phase = Phase::Running;
        }

        if let Some(by) = self.receive()? {
            return Ok(self.stop(TerminationKind::Aborted { by }));
        }

        if let Some(budget) = self.config.time_budget {
            if self.started.elapsed() >= budget {
                tracing::info!(rank = self.rank, ?budget, "time budget exhausted");
                self.abort_peers();
                return Ok(self.stop(TerminationKind::TimedOut));
            }
        }

        if self.frontier.is_empty_under(self.incumbent.value()) {
            let flushed = self.outgoing.flush_all(&mut self.transport)?;
            self.record_flush(flushed);
            self.phase = Phase::IdleChecking;
            return match self.termination.step(&mut self.transport)? {
                Verdict::Terminated => Ok(self.stop(TerminationKind::Certified)),
                Verdict::Continue => Ok(Step::Idle),
            };
        }
        self.phase = Phase::Running;

        let Some(node) = self.frontier.pop() else {
            return Ok(Step::Idle);
        };
        match self.closed.admit(&node) {
            Admission::Discard => {
                self.stats.duplicates_discarded += 1;
                return Ok(Step::Discarded);
            }
            Admission::Reopen => self.stats.reopened += 1,
            Admission::Fresh => {}
        }

        let mut state = self.domain.unpack(&node.packed);
        if self.config.verify_node_costs {
            let h = self.domain.heuristic(&state);
            if node.g.saturating_add(h) != node.f {
                return Err(SearchError::CostInvariantViolated {
                    f: node.f,
                    g: node.g,
                    h,
                });
            }
        }

        if self.domain.is_goal(&state) {
            let cost = node.g;
            if self.incumbent.offer_local(cost, &node.packed) {
                tracing::info!(rank = self.rank, cost, "goal found");
                self.incumbent.broadcast(&mut self.transport)?;
            }
            return Ok(Step::GoalFound { cost });
        }

        let successors = self.expand(node, &mut state);
        let flushed = self
            .outgoing
            .flush_over(self.config.outgo_threshold, &mut self.transport)?;
        self.record_flush(flushed);
        Ok(Step::Expanded { successors })
    }

    /// Retire `node` into the duplicate table and route its successors.
    fn expand(&mut self, node: SearchNode, state: &mut D::State) -> usize {
        let (f, g, last_op) = (node.f, node.g, node.last_op);
        self.closed.add(node);
        self.stats.expansions += 1;

        let mut ops = std::mem::take(&mut self.ops);
        ops.clear();
        self.domain.operators(state, &mut ops);

        let mut successors = 0;
        for &op in &ops {
            if self.config.skip_inverse_operator && last_op == Some(op) {
                continue;
            }
            let edge = self.domain.apply(state, op);
            let packed = self.domain.pack(state);
            let h = self.domain.heuristic(state);
            let key = self.domain.distribution_hash(state, &packed);
            self.domain.undo(state, &edge);

            let child = SearchNode::new(packed, g.saturating_add(edge.cost), h, key, edge.inverse);
            successors += 1;
            self.stats.generations += 1;
            let owner = self.partitioner.owner(key);
            if owner == self.rank {
                self.stats.self_routed += 1;
                self.push_local(child);
            } else {
                self.outgoing.stage(owner, child);
            }
        }
        self.ops = ops;

        if self.config.trace_expansions {
            tracing::trace!(rank = self.rank, f, g, successors, "expanded");
        }
        successors
    }

    fn push_local(&mut self, node: SearchNode) {
        if self.frontier.push(node) == PushOutcome::Dominated {
            self.stats.frontier_dominated += 1;
        }
    }

    fn record_flush(&mut self, flushed: FlushReport) {
        self.stats.batches_sent += flushed.batches;
        self.stats.nodes_sent += flushed.nodes;
        self.termination.on_batches_sent(flushed.batches);
    }

    /// Drain pending messages.
    ///
    /// Returns the sender of an ABORT if one arrived; nothing else is read
    /// in that case.
    ///
    /// # Errors
    ///
    /// Malformed NODE or INCUMBENT payloads, and transport failures.
    pub fn receive(&mut self) -> Result<Option<Rank>, SearchError> {
        if self.transport.probe(Source::Any, Tag::Abort).is_some() {
            let (by, _) = self.transport.recv(Source::Any, Tag::Abort)?;
            tracing::info!(rank = self.rank, by, "abort received");
            return Ok(Some(by));
        }

        while self.transport.probe(Source::Any, Tag::Node).is_some() {
            let (from, payload) = self.transport.recv(Source::Any, Tag::Node)?;
            let nodes = wire::decode_batch(&payload)
                .map_err(|cause| SearchError::MalformedBatch { from, cause })?;
            self.termination.on_batch_received();
            self.stats.batches_received += 1;
            self.stats.nodes_received += nodes.len() as u64;
            for node in nodes {
                self.push_local(node);
            }
        }

        while self.transport.probe(Source::Any, Tag::Incumbent).is_some() {
            let (from, payload) = self.transport.recv(Source::Any, Tag::Incumbent)?;
            let cost = incumbent::decode_cost(&payload).ok_or(SearchError::MalformedMessage {
                tag: Tag::Incumbent,
                from,
                len: payload.len(),
            })?;
            self.incumbent.adopt_remote(cost, from);
        }
        Ok(None)
    }

    fn stop(&mut self, kind: TerminationKind) -> Step {
        self.phase = Phase::Terminated;
        self.stopped = Some(kind);
        tracing::info!(
            rank = self.rank,
            ?kind,
            incumbent = self.incumbent.value(),
            expansions = self.stats.expansions,
            generations = self.stats.generations,
            "worker terminated"
        );
        Step::Terminated(kind)
    }

    /// Tell every peer to stop. Failures are logged, not returned.
    fn abort_peers(&mut self) {
        for dest in (0..self.transport.size()).filter(|&d| d != self.rank) {
            if let Err(err) = self.transport.send(dest, Tag::Abort, Vec::new()) {
                tracing::warn!(rank = self.rank, dest, %err, "abort not delivered");
            }
        }
    }

    /// Seed, loop until terminated, then shut down.
    ///
    /// On a fatal error the worker still asks its peers to stop and waits
    /// for them at the end-of-run barrier before returning the error.
    ///
    /// # Errors
    ///
    /// The first error from [`step`](Self::step) or from shutdown.
    pub fn run(mut self, root: &D::State) -> Result<WorkerReport, SearchError> {
        tracing::info!(
            rank = self.rank,
            workers = self.config.worker_count,
            outgo_threshold = self.config.outgo_threshold,
            "worker started"
        );
        self.seed(root);
        loop {
            match self.step() {
                Ok(Step::Terminated(_)) => return self.shutdown(),
                Ok(Step::Idle) => std::thread::yield_now(),
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(rank = self.rank, %err, "worker failed");
                    self.abort_peers();
                    if let Err(shutdown_err) = self.transport.barrier() {
                        tracing::warn!(rank = self.rank, %shutdown_err, "barrier after failure");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Wait for every worker, drain what is left in flight, and report.
    ///
    /// Residual incumbents are adopted so every worker reports the global
    /// best. Residual nodes are counted and dropped.
    ///
    /// # Errors
    ///
    /// Transport failures, or a malformed residual message.
    pub fn shutdown(mut self) -> Result<WorkerReport, SearchError> {
        self.transport.barrier()?;

        for tag in [Tag::FinalTerm, Tag::Abort, Tag::Term] {
            while self.transport.probe(Source::Any, tag).is_some() {
                self.transport.recv(Source::Any, tag)?;
            }
        }
        while self.transport.probe(Source::Any, Tag::Incumbent).is_some() {
            let (from, payload) = self.transport.recv(Source::Any, Tag::Incumbent)?;
            if let Some(cost) = incumbent::decode_cost(&payload) {
                self.incumbent.adopt_remote(cost, from);
            }
        }
        while self.transport.probe(Source::Any, Tag::Node).is_some() {
            let (from, payload) = self.transport.recv(Source::Any, Tag::Node)?;
            let nodes = wire::decode_batch(&payload)
                .map_err(|cause| SearchError::MalformedBatch { from, cause })?;
            self.stats.residual_nodes += nodes.len() as u64;
        }

        let report = self.report();
        tracing::info!(
            rank = self.rank,
            incumbent = report.incumbent,
            verified = report.is_verified(),
            residual_nodes = report.stats.residual_nodes,
            "worker shut down"
        );
        Ok(report)
    }

    /// Snapshot of the worker's results so far.
    #[must_use]
    pub fn report(&self) -> WorkerReport {
        let mut stats = self.stats;
        stats.frontier_high_water = self.frontier.high_water();
        stats.frontier_regrowths = self.frontier.regrowths();
        WorkerReport {
            rank: self.rank,
            stats,
            incumbent: self.incumbent.value(),
            solution: self.incumbent.solution().cloned(),
            incumbent_history: self.incumbent.history().to_vec(),
            termination: self.stopped,
            elapsed: self.started.elapsed(),
        }
    }
}
