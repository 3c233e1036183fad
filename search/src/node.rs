//! Core search node type and its frontier ordering.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::hash;

/// Path cost. Matches the 4-byte cost fields on the wire.
pub type Cost = u32;

/// Domain operator index. `NO_OPERATOR` is reserved.
pub type Operator = u8;

/// Wire value of `last_op` for a node with no predecessor.
pub const NO_OPERATOR: Operator = 0xFF;

/// `open_index` of a node that is not currently in a frontier.
pub const NOT_IN_FRONTIER: u32 = u32::MAX;

/// A generated state.
///
/// Ordering for frontier extraction uses `(f, Reverse(g))`: lower `f`
/// first, and on equal `f` the node that has made more concrete progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode {
    /// `g + h(state)`.
    pub f: Cost,
    /// Path cost from the root.
    pub g: Cost,
    /// Routing hash of the state; selects the owning worker.
    pub dist_key: u32,
    /// Position in the owning frontier, maintained by the frontier.
    pub open_index: u32,
    /// Duplicate-table bucket hash of `packed`.
    pub table_hash: u32,
    /// Inverse of the operator that produced this node (`None` for the root).
    pub last_op: Option<Operator>,
    pub packed: PackedState,
}

impl SearchNode {
    /// Build a node. `f` saturates so an oversized `h` cannot wrap below the incumbent.
    #[must_use]
    pub fn new(
        packed: PackedState,
        g: Cost,
        h: Cost,
        dist_key: u32,
        last_op: Option<Operator>,
    ) -> Self {
        let table_hash = hash::table_hash(&packed);
        Self {
            f: g.saturating_add(h),
            g,
            dist_key,
            open_index: NOT_IN_FRONTIER,
            table_hash,
            last_op,
            packed,
        }
    }

    /// The heuristic value this node was built with.
    #[must_use]
    pub fn h(&self) -> Cost {
        self.f - self.g
    }

    /// Whether `self` should leave the frontier before `other`.
    #[must_use]
    pub fn precedes(&self, other: &Self) -> bool {
        FrontierKey::from(self) < FrontierKey::from(other)
    }
}

/// The frontier ordering key: lower `f` first, then higher `g`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierKey {
    pub f: Cost,
    pub g: Cost,
}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.f.cmp(&other.f).then(other.g.cmp(&self.g))
    }
}

impl From<&SearchNode> for FrontierKey {
    fn from(node: &SearchNode) -> Self {
        Self {
            f: node.f,
            g: node.g,
        }
    }
}
