//! hdastar search: hash-distributed optimal best-first search.
//!
//! Every worker owns the states whose distribution key maps to its rank,
//! runs a local A* loop over them, ships successors it does not own to
//! their owners in batches, broadcasts better incumbents, and stops only
//! when the ring termination protocol certifies global quiescence.
//!
//! # Crate dependency graph
//!
//! ```text
//! hdastar_kernel  ←  hdastar_search  ←  hdastar_harness
//! (carrier, hash,     (engine)           (worlds, cluster, config)
//!  transport)
//! ```
//!
//! # Key types
//!
//! - [`SearchNode`](node::SearchNode) -- a generated state with `f`, `g` and routing fields
//! - [`Frontier`](frontier::Frontier) -- indexed min-heap with in-place decrease-key
//! - [`DuplicateTable`](closed::DuplicateTable) -- per-worker closed set
//! - [`Worker`](search::Worker) -- the per-worker search loop
//! - [`SearchDomain`](contract::SearchDomain) -- trait the problem domain implements

#![forbid(unsafe_code)]

pub mod closed;
pub mod contract;
pub mod error;
pub mod frontier;
pub mod incumbent;
pub mod node;
pub mod outgoing;
pub mod partition;
pub mod policy;
pub mod search;
pub mod sequential;
pub mod termination;
pub mod wire;

#[cfg(test)]
mod test_support;
