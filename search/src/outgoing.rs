//! Per-destination outgoing node buffers.
//!
//! Successors owned by another worker are staged here and leave as one NODE
//! message per destination once that buffer grows past the flush threshold.
//! The staged node moves into the buffer and then into the encoded batch;
//! nothing keeps a copy.

use hdastar_kernel::transport::{Rank, Tag, Transport, TransportError};

use crate::node::SearchNode;
use crate::wire;

/// What a flush put on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub batches: u64,
    pub nodes: u64,
}

impl FlushReport {
    fn record(&mut self, nodes: usize) {
        self.batches += 1;
        self.nodes += nodes as u64;
    }
}

pub struct OutgoingBuffers {
    rank: Rank,
    buffers: Vec<Vec<SearchNode>>,
}

impl OutgoingBuffers {
    /// One (initially empty) buffer per worker; the slot for `rank` stays unused.
    #[must_use]
    pub fn new(rank: Rank, worker_count: usize) -> Self {
        let mut buffers = Vec::new();
        buffers.resize_with(worker_count, Vec::new);
        Self { rank, buffers }
    }

    /// Queue `node` for `dest`. `dest` must be another worker.
    pub fn stage(&mut self, dest: Rank, node: SearchNode) {
        debug_assert_ne!(dest, self.rank, "self-owned nodes go straight to the frontier");
        self.buffers[dest].push(node);
    }

    /// Nodes currently staged for `dest`.
    #[must_use]
    pub fn occupancy(&self, dest: Rank) -> usize {
        self.buffers.get(dest).map_or(0, Vec::len)
    }

    /// Nodes staged across every destination.
    #[must_use]
    pub fn total_staged(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    /// Send every buffer holding strictly more than `threshold` nodes.
    ///
    /// # Errors
    ///
    /// Propagates the first transport failure. Buffers flushed before the
    /// failure stay sent; the failing buffer's nodes are lost with the run.
    pub fn flush_over<T: Transport>(
        &mut self,
        threshold: usize,
        transport: &mut T,
    ) -> Result<FlushReport, TransportError> {
        let mut report = FlushReport::default();
        for dest in 0..self.buffers.len() {
            if dest == self.rank || self.buffers[dest].len() <= threshold {
                continue;
            }
            let batch = std::mem::take(&mut self.buffers[dest]);
            let payload = wire::encode_batch(&batch);
            tracing::debug!(
                rank = self.rank,
                dest,
                nodes = batch.len(),
                bytes = payload.len(),
                "flushing node batch"
            );
            transport.send(dest, Tag::Node, payload)?;
            report.record(batch.len());
        }
        Ok(report)
    }

    /// Send every non-empty buffer.
    ///
    /// # Errors
    ///
    /// As [`flush_over`](Self::flush_over).
    pub fn flush_all<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> Result<FlushReport, TransportError> {
        self.flush_over(0, transport)
    }
}
