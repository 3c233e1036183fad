//! Per-worker duplicate table (closed set).
//!
//! Bucketed by each node's precomputed `table_hash`; a bucket holds the
//! retired nodes whose hashes collide. The nominal capacity only sizes the
//! bucket array. Nothing is ever refused for lack of room.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::hash;

use crate::node::SearchNode;

/// Verdict of the pop-time duplicate policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No entry for this state: expand.
    Fresh,
    /// An entry exists with a strictly higher `f`: expand again.
    Reopen,
    /// An entry exists with `f <= node.f`: discard without expanding.
    Discard,
}

pub struct DuplicateTable {
    buckets: Vec<Vec<SearchNode>>,
    len: usize,
}

impl DuplicateTable {
    /// Create a table with one bucket per unit of nominal capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut buckets = Vec::new();
        buckets.resize_with(capacity.max(1), Vec::new);
        Self { buckets, len: 0 }
    }

    fn bucket_of(&self, table_hash: u32) -> usize {
        table_hash as usize % self.buckets.len()
    }

    /// The retired node for `packed`, if any.
    #[must_use]
    pub fn find(&self, packed: &PackedState) -> Option<&SearchNode> {
        self.find_hashed(hash::table_hash(packed), packed)
    }

    /// Like [`find`](Self::find), reusing a hash the caller already holds.
    #[must_use]
    pub fn find_hashed(&self, table_hash: u32, packed: &PackedState) -> Option<&SearchNode> {
        self.buckets[self.bucket_of(table_hash)]
            .iter()
            .find(|n| &n.packed == packed)
    }

    /// Install `node` as the entry for its state.
    ///
    /// Returns the entry it replaced, if any.
    pub fn add(&mut self, node: SearchNode) -> Option<SearchNode> {
        let bucket = self.bucket_of(node.table_hash);
        let slot = &mut self.buckets[bucket];
        if let Some(existing) = slot.iter_mut().find(|n| n.packed == node.packed) {
            return Some(std::mem::replace(existing, node));
        }
        slot.push(node);
        self.len += 1;
        None
    }

    /// Apply the duplicate policy to a node just popped from the frontier.
    ///
    /// Equal-`f` arrivals are discarded, so the first writer of a cost tier wins.
    #[must_use]
    pub fn admit(&self, node: &SearchNode) -> Admission {
        match self.find_hashed(node.table_hash, &node.packed) {
            None => Admission::Fresh,
            Some(entry) if entry.f <= node.f => Admission::Discard,
            Some(_) => Admission::Reopen,
        }
    }

    /// Number of distinct states recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
