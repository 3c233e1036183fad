//! Explicit graph with per-edge costs.
//!
//! Handy for pinning exact topologies in tests: per-vertex heuristic values,
//! goal flags, and optional distribution keys that force a vertex onto a
//! chosen worker (`key % workers`). Operator `i` follows the `i`-th edge
//! out of the current vertex. Vertices pack as `u32` big-endian.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::hash;
use hdastar_search::contract::{Edge, SearchDomain};
use hdastar_search::node::{Cost, Operator};

use super::WorldError;

/// Current vertex plus the vertices it was reached through, for `undo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub vertex: u32,
    trail: Vec<u32>,
}

impl Visit {
    #[must_use]
    pub fn at(vertex: u32) -> Self {
        Self {
            vertex,
            trail: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExplicitGraph {
    edges: Vec<Vec<(u32, Cost)>>,
    heuristic: Vec<Cost>,
    goals: Vec<bool>,
    keys: Vec<Option<u32>>,
}

impl ExplicitGraph {
    #[must_use]
    pub fn new(vertices: usize) -> Self {
        Self {
            edges: vec![Vec::new(); vertices],
            heuristic: vec![0; vertices],
            goals: vec![false; vertices],
            keys: vec![None; vertices],
        }
    }

    #[must_use]
    pub fn vertices(&self) -> usize {
        self.edges.len()
    }

    fn check(&self, v: u32) -> Result<usize, WorldError> {
        let i = v as usize;
        if i < self.edges.len() {
            Ok(i)
        } else {
            Err(WorldError::UnknownVertex { vertex: v })
        }
    }

    /// Add a directed edge.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownVertex`] for an out-of-range endpoint, or
    /// [`WorldError::InvalidDimensions`] past 255 edges out of one vertex.
    pub fn add_edge(&mut self, from: u32, to: u32, cost: Cost) -> Result<(), WorldError> {
        let i = self.check(from)?;
        self.check(to)?;
        if self.edges[i].len() >= usize::from(hdastar_search::node::NO_OPERATOR) {
            return Err(WorldError::InvalidDimensions {
                detail: format!("vertex {from} has too many out-edges"),
            });
        }
        self.edges[i].push((to, cost));
        Ok(())
    }

    /// Add edges both ways with the same cost.
    ///
    /// # Errors
    ///
    /// As [`add_edge`](Self::add_edge).
    pub fn add_undirected(&mut self, a: u32, b: u32, cost: Cost) -> Result<(), WorldError> {
        self.add_edge(a, b, cost)?;
        self.add_edge(b, a, cost)
    }

    /// # Errors
    ///
    /// [`WorldError::UnknownVertex`] for an out-of-range vertex.
    pub fn set_heuristic(&mut self, v: u32, h: Cost) -> Result<(), WorldError> {
        let i = self.check(v)?;
        self.heuristic[i] = h;
        Ok(())
    }

    /// # Errors
    ///
    /// [`WorldError::UnknownVertex`] for an out-of-range vertex.
    pub fn set_goal(&mut self, v: u32) -> Result<(), WorldError> {
        let i = self.check(v)?;
        self.goals[i] = true;
        Ok(())
    }

    /// Pin `v`'s distribution key.
    ///
    /// # Errors
    ///
    /// [`WorldError::UnknownVertex`] for an out-of-range vertex.
    pub fn set_key(&mut self, v: u32, key: u32) -> Result<(), WorldError> {
        let i = self.check(v)?;
        self.keys[i] = Some(key);
        Ok(())
    }

    #[must_use]
    pub fn packed(v: u32) -> PackedState {
        PackedState::new(v.to_be_bytes().to_vec())
    }
}

impl SearchDomain for ExplicitGraph {
    type State = Visit;

    fn heuristic(&self, state: &Visit) -> Cost {
        self.heuristic[state.vertex as usize]
    }

    fn pack(&self, state: &Visit) -> PackedState {
        Self::packed(state.vertex)
    }

    fn unpack(&self, packed: &PackedState) -> Visit {
        let vertex = match packed.as_bytes() {
            &[a, b, c, d] => u32::from_be_bytes([a, b, c, d]),
            _ => 0,
        };
        Visit::at(vertex)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn operators(&self, state: &Visit, out: &mut Vec<Operator>) {
        out.extend((0..self.edges[state.vertex as usize].len()).map(|i| i as Operator));
    }

    #[allow(clippy::cast_possible_truncation)]
    fn apply(&self, state: &mut Visit, op: Operator) -> Edge {
        let from = state.vertex;
        let (to, cost) = self.edges[from as usize][usize::from(op)];
        state.trail.push(from);
        state.vertex = to;
        let inverse = self.edges[to as usize]
            .iter()
            .position(|&(back, _)| back == from)
            .map(|i| i as Operator);
        Edge { op, cost, inverse }
    }

    fn undo(&self, state: &mut Visit, _edge: &Edge) {
        if let Some(prev) = state.trail.pop() {
            state.vertex = prev;
        }
    }

    fn is_goal(&self, state: &Visit) -> bool {
        self.goals[state.vertex as usize]
    }

    fn distribution_hash(&self, state: &Visit, packed: &PackedState) -> u32 {
        self.keys[state.vertex as usize].unwrap_or_else(|| hash::distribution_key(packed))
    }
}
