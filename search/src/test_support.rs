//! Tiny explicit graph domain for unit tests.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::hash;

use crate::contract::{Edge, SearchDomain};
use crate::node::{Cost, Operator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestState {
    pub at: u8,
    trail: Vec<u8>,
}

/// Directed graph over `u8` vertices. Operator `i` follows the `i`-th edge.
#[derive(Debug, Clone)]
pub struct TestGraph {
    edges: Vec<Vec<(u8, Cost)>>,
    h: Vec<Cost>,
    goals: Vec<bool>,
    keys: Vec<Option<u32>>,
}

impl TestGraph {
    pub fn new(vertices: usize) -> Self {
        Self {
            edges: vec![Vec::new(); vertices],
            h: vec![0; vertices],
            goals: vec![false; vertices],
            keys: vec![None; vertices],
        }
    }

    pub fn edge(mut self, from: u8, to: u8, cost: Cost) -> Self {
        self.edges[usize::from(from)].push((to, cost));
        self
    }

    pub fn heuristic_of(mut self, v: u8, h: Cost) -> Self {
        self.h[usize::from(v)] = h;
        self
    }

    pub fn goal(mut self, v: u8) -> Self {
        self.goals[usize::from(v)] = true;
        self
    }

    /// Pin `v`'s distribution key, which pins its owner to `key % workers`.
    pub fn key(mut self, v: u8, key: u32) -> Self {
        self.keys[usize::from(v)] = Some(key);
        self
    }

    pub fn state(v: u8) -> TestState {
        TestState {
            at: v,
            trail: Vec::new(),
        }
    }

    pub fn packed(v: u8) -> PackedState {
        PackedState::new(vec![v])
    }
}

impl SearchDomain for TestGraph {
    type State = TestState;

    fn heuristic(&self, state: &TestState) -> Cost {
        self.h[usize::from(state.at)]
    }

    fn pack(&self, state: &TestState) -> PackedState {
        Self::packed(state.at)
    }

    fn unpack(&self, packed: &PackedState) -> TestState {
        Self::state(packed.as_bytes()[0])
    }

    #[allow(clippy::cast_possible_truncation)]
    fn operators(&self, state: &TestState, out: &mut Vec<Operator>) {
        out.extend((0..self.edges[usize::from(state.at)].len()).map(|i| i as Operator));
    }

    #[allow(clippy::cast_possible_truncation)]
    fn apply(&self, state: &mut TestState, op: Operator) -> Edge {
        let from = state.at;
        let (to, cost) = self.edges[usize::from(from)][usize::from(op)];
        state.trail.push(from);
        state.at = to;
        let inverse = self.edges[usize::from(to)]
            .iter()
            .position(|&(back, _)| back == from)
            .map(|i| i as Operator);
        Edge { op, cost, inverse }
    }

    fn undo(&self, state: &mut TestState, _edge: &Edge) {
        if let Some(prev) = state.trail.pop() {
            state.at = prev;
        }
    }

    fn is_goal(&self, state: &TestState) -> bool {
        self.goals[usize::from(state.at)]
    }

    fn distribution_hash(&self, state: &TestState, packed: &PackedState) -> u32 {
        self.keys[usize::from(state.at)].unwrap_or_else(|| hash::distribution_key(packed))
    }
}
