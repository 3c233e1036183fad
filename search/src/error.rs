//! Typed search errors.
//!
//! A `SearchError` ends the worker's run. Early exits that are not
//! failures (wall-clock budget, a peer's abort) are reported through
//! [`crate::search::TerminationKind`] instead.

use hdastar_kernel::transport::{Rank, Tag, TransportError};
use thiserror::Error;

use crate::wire::WireError;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Rejected before the worker starts.
    #[error("invalid engine configuration: {detail}")]
    InvalidConfig { detail: String },
    /// Fatal transport failure, including an exhausted outgoing pool.
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed NODE batch from rank {from}")]
    MalformedBatch {
        from: Rank,
        #[source]
        cause: WireError,
    },
    #[error("malformed {tag} message from rank {from}: {len} bytes")]
    MalformedMessage { tag: Tag, from: Rank, len: usize },
    /// Only checked when `verify_node_costs` is set.
    #[error("node cost invariant violated: f={f} but g={g} + h={h}")]
    CostInvariantViolated { f: u32, g: u32, h: u32 },
}
