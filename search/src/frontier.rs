//! Best-first frontier: an indexed binary min-heap with in-place decrease-key.
//!
//! The heap is a `Vec<SearchNode>` ordered by [`FrontierKey`]; a side index
//! maps each packed state to its heap position so a cheaper rediscovery of
//! a state already in the frontier repositions the existing entry instead
//! of inserting a second one. Every move inside the heap rewrites the
//! moved node's `open_index`, so `heap[i].open_index == i` always holds.
//!
//! # Capacity
//!
//! The heap is pre-sized to `capacity + overrun`. When an insert would pass
//! that bound the nominal capacity doubles and the new headroom is
//! reserved in one allocation. Nodes are never dropped for capacity.

use ahash::AHashMap;
use hdastar_kernel::carrier::packed::PackedState;

use crate::node::{Cost, FrontierKey, SearchNode, NOT_IN_FRONTIER};

/// What `push` did with the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// New state, inserted.
    Inserted,
    /// State was present with a higher `g`; the entry was replaced in place.
    Improved,
    /// State was present with `g` no higher; the pushed node was dropped.
    Dominated,
}

pub struct Frontier {
    heap: Vec<SearchNode>,
    index: AHashMap<PackedState, usize>,
    capacity: usize,
    overrun: usize,
    high_water: u64,
    regrowths: u64,
}

impl Frontier {
    /// Create an empty frontier sized for `capacity` nodes plus `overrun` headroom.
    #[must_use]
    pub fn new(capacity: usize, overrun: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            heap: Vec::with_capacity(capacity + overrun),
            index: AHashMap::with_capacity(capacity + overrun),
            capacity,
            overrun,
            high_water: 0,
            regrowths: 0,
        }
    }

    /// Insert a node, or improve the existing entry for its state.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push(&mut self, mut node: SearchNode) -> PushOutcome {
        if let Some(&pos) = self.index.get(&node.packed) {
            if node.g >= self.heap[pos].g {
                return PushOutcome::Dominated;
            }
            node.open_index = pos as u32;
            self.heap[pos] = node;
            self.sift_up(pos);
            return PushOutcome::Improved;
        }

        if self.heap.len() >= self.capacity + self.overrun {
            self.regrow();
        }

        let pos = self.heap.len();
        node.open_index = pos as u32;
        self.index.insert(node.packed.clone(), pos);
        self.heap.push(node);
        self.sift_up(pos);

        let size = self.heap.len() as u64;
        if size > self.high_water {
            self.high_water = size;
        }
        PushOutcome::Inserted
    }

    /// Remove and return the best node.
    pub fn pop(&mut self) -> Option<SearchNode> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let mut node = self.heap.pop()?;
        self.index.remove(&node.packed);
        node.open_index = NOT_IN_FRONTIER;
        if !self.heap.is_empty() {
            self.place(0);
            self.sift_down(0);
        }
        Some(node)
    }

    /// `f` of the best node.
    #[must_use]
    pub fn peek_f(&self) -> Option<Cost> {
        self.heap.first().map(|n| n.f)
    }

    /// True iff no node has `f < threshold`.
    #[must_use]
    pub fn is_empty_under(&self, threshold: Cost) -> bool {
        match self.heap.first() {
            Some(best) => best.f >= threshold,
            None => true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The frontier entry for a state, if present.
    #[must_use]
    pub fn get(&self, packed: &PackedState) -> Option<&SearchNode> {
        self.index.get(packed).map(|&pos| &self.heap[pos])
    }

    #[must_use]
    pub fn contains(&self, packed: &PackedState) -> bool {
        self.index.contains_key(packed)
    }

    /// High-water mark of frontier size.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    /// Number of times the nominal capacity was doubled.
    #[must_use]
    pub fn regrowths(&self) -> u64 {
        self.regrowths
    }

    /// Current nominal capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn regrow(&mut self) {
        self.capacity *= 2;
        self.regrowths += 1;
        let target = self.capacity + self.overrun;
        self.heap.reserve(target - self.heap.len());
        let index_len = self.index.len();
        self.index.reserve(target - index_len);
        tracing::debug!(
            capacity = self.capacity,
            overrun = self.overrun,
            len = self.heap.len(),
            "frontier regrown"
        );
    }

    fn less(&self, a: usize, b: usize) -> bool {
        FrontierKey::from(&self.heap[a]) < FrontierKey::from(&self.heap[b])
    }

    /// Record `pos` as the home of `heap[pos]` in both the node and the index.
    #[allow(clippy::cast_possible_truncation)]
    fn place(&mut self, pos: usize) {
        let node = &mut self.heap[pos];
        node.open_index = pos as u32;
        if let Some(slot) = self.index.get_mut(&node.packed) {
            *slot = pos;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.place(a);
        self.place(b);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left) {
                right
            } else {
                left
            };
            if !self.less(child, pos) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.heap.len(), self.index.len());
        for (i, n) in self.heap.iter().enumerate() {
            assert_eq!(n.open_index as usize, i, "open_index out of sync");
            assert_eq!(self.index[&n.packed], i, "index out of sync");
            if i > 0 {
                assert!(!self.less(i, (i - 1) / 2), "heap order violated at {i}");
            }
        }
    }
}
