//! Transport contract: the messaging primitives the search engine needs.
//!
//! The engine assumes exactly these semantics:
//!
//! - `send` is buffered: it copies the payload into the sender's outgoing
//!   pool and returns without waiting for the receiver. A pool that cannot
//!   hold the message is a fatal [`TransportError::BufferExhausted`].
//! - `probe` never blocks and reports the oldest matching message.
//! - `recv` blocks until a matching message is available. The engine only
//!   calls it after a positive probe, except during shutdown.
//! - Messages between one ordered pair of ranks arrive in send order. No
//!   other ordering is promised.
//! - `barrier` returns once every rank has entered it.

pub mod local;

use thiserror::Error;

/// Worker identifier, `0..size`.
pub type Rank = usize;

/// Message tag. Probing and receiving always select on one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Batch of encoded search nodes.
    Node,
    /// A better incumbent cost, 4 bytes big-endian.
    Incumbent,
    /// Termination-detection token.
    Term,
    /// Final termination broadcast (empty payload).
    FinalTerm,
    /// Best-effort early exit broadcast (empty payload).
    Abort,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Node => "NODE",
            Self::Incumbent => "INCUMBENT",
            Self::Term => "TERM",
            Self::FinalTerm => "FTERM",
            Self::Abort => "ABORT",
        };
        f.write_str(name)
    }
}

/// Source selector for `probe` and `recv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Any,
    Rank(Rank),
}

impl Source {
    #[must_use]
    pub fn matches(self, rank: Rank) -> bool {
        match self {
            Self::Any => true,
            Self::Rank(r) => r == rank,
        }
    }
}

/// Result of a positive probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub source: Rank,
    /// Payload length in bytes.
    pub len: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("outgoing buffer exhausted: need {requested} bytes, {in_flight} of {capacity} in flight")]
    BufferExhausted {
        requested: usize,
        in_flight: usize,
        capacity: usize,
    },
    #[error("rank {rank} out of range for {size} workers")]
    InvalidRank { rank: Rank, size: usize },
    #[error("peer {peer} disconnected")]
    Disconnected { peer: Rank },
    #[error("inbox closed")]
    Closed,
    #[error("barrier left incomplete")]
    Barrier,
}

/// Point-to-point messaging endpoint owned by one worker.
pub trait Transport {
    /// This endpoint's rank.
    fn rank(&self) -> Rank;

    /// Number of ranks in the run.
    fn size(&self) -> usize;

    /// Buffered, non-blocking send.
    ///
    /// # Errors
    ///
    /// [`TransportError::BufferExhausted`] if the outgoing pool cannot hold
    /// the payload, [`TransportError::InvalidRank`] for an unknown `dest`.
    fn send(&mut self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Non-blocking check for a message matching `(source, tag)`.
    fn probe(&mut self, source: Source, tag: Tag) -> Option<Probe>;

    /// Blocking receive of the oldest message matching `(source, tag)`.
    ///
    /// Returns the actual source rank with the payload.
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] if no matching message can ever arrive.
    fn recv(&mut self, source: Source, tag: Tag) -> Result<(Rank, Vec<u8>), TransportError>;

    /// Block until every rank has entered the barrier.
    ///
    /// # Errors
    ///
    /// [`TransportError::Barrier`] if the barrier cannot complete.
    fn barrier(&mut self) -> Result<(), TransportError>;

    /// Successor on the logical ring.
    fn ring_next(&self) -> Rank {
        (self.rank() + 1) % self.size()
    }

    /// Predecessor on the logical ring.
    fn ring_prev(&self) -> Rank {
        (self.rank() + self.size() - 1) % self.size()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn rank(&self) -> Rank {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn send(&mut self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), TransportError> {
        (**self).send(dest, tag, payload)
    }

    fn probe(&mut self, source: Source, tag: Tag) -> Option<Probe> {
        (**self).probe(source, tag)
    }

    fn recv(&mut self, source: Source, tag: Tag) -> Result<(Rank, Vec<u8>), TransportError> {
        (**self).recv(source, tag)
    }

    fn barrier(&mut self) -> Result<(), TransportError> {
        (**self).barrier()
    }
}
