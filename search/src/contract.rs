//! Search domain contract.
//!
//! The engine treats states as opaque. Everything it needs from a problem
//! goes through [`SearchDomain`].

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::hash;

use crate::node::{Cost, Operator};

/// The effect of applying one operator, kept so the move can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub op: Operator,
    pub cost: Cost,
    /// Operator that reverses `op` from the resulting state, if one exists.
    pub inverse: Option<Operator>,
}

/// A problem the engine can search.
///
/// # Contract
///
/// - `pack` is a bijection onto the wire payload: `unpack(pack(s)) == s`
///   and equal states pack to equal bytes.
/// - `heuristic` is admissible. Optimality is only claimed under that
///   assumption; consistency additionally avoids reopenings.
/// - Operators are less than `0xFF`, which is reserved on the wire.
/// - `apply` followed by `undo` with the returned edge restores the state.
/// - All workers of a run use the same domain, so `distribution_hash`
///   agrees everywhere.
pub trait SearchDomain {
    type State: Clone;

    fn heuristic(&self, state: &Self::State) -> Cost;

    fn pack(&self, state: &Self::State) -> PackedState;

    fn unpack(&self, packed: &PackedState) -> Self::State;

    /// Append the operators applicable in `state` to `out`.
    fn operators(&self, state: &Self::State, out: &mut Vec<Operator>);

    /// Apply `op` in place.
    fn apply(&self, state: &mut Self::State, op: Operator) -> Edge;

    /// Reverse a prior [`apply`](Self::apply).
    fn undo(&self, state: &mut Self::State, edge: &Edge);

    fn is_goal(&self, state: &Self::State) -> bool;

    /// Routing hash of `state`. `packed` is `pack(state)`, already computed.
    fn distribution_hash(&self, state: &Self::State, packed: &PackedState) -> u32 {
        let _ = state;
        hash::distribution_key(packed)
    }
}
