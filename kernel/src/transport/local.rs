//! In-process transport: one [`LocalEndpoint`] per worker thread.
//!
//! Each endpoint owns an unbounded `crossbeam_channel` inbox and a sender to
//! every other inbox (its own included, so a one-worker ring can pass the
//! token to itself). Messages drained from the inbox but not yet selected by
//! a `(source, tag)` query wait in a local queue in arrival order, which
//! keeps per-pair FIFO delivery.
//!
//! The outgoing pool models a buffered-send attachment: every NODE and TERM
//! message charges `payload.len() + ENVELOPE_OVERHEAD` bytes against its
//! sender's pool until the receiver takes it out with `recv`. INCUMBENT,
//! FTERM and ABORT are fire-and-forget and bypass the pool, so an exhausted
//! worker can still tell its peers to stop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{Probe, Rank, Source, Tag, Transport, TransportError};

/// Bytes charged per message on top of its payload.
pub const ENVELOPE_OVERHEAD: usize = 16;

/// Network-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of endpoints.
    pub size: usize,
    /// Outgoing pool capacity per endpoint, in bytes.
    pub buffer_bytes: usize,
}

/// Whether messages with `tag` draw on the sender's pool.
#[must_use]
pub fn is_pooled(tag: Tag) -> bool {
    matches!(tag, Tag::Node | Tag::Term)
}

struct Envelope {
    source: Rank,
    tag: Tag,
    payload: Vec<u8>,
    /// Bytes held in the sender's pool; zero for unpooled tags.
    charge: usize,
    /// Sender's pool, credited back when the message is received.
    pool: Arc<AtomicUsize>,
}

/// A worker's view of the in-process network.
pub struct LocalEndpoint {
    rank: Rank,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    pending: VecDeque<Envelope>,
    pool: Arc<AtomicUsize>,
    capacity: usize,
    barrier: Arc<Barrier>,
}

/// Build a fully connected network of `config.size` endpoints.
///
/// Endpoint `i` has rank `i`. Move each endpoint into its own thread.
#[must_use]
pub fn local_network(config: Config) -> Vec<LocalEndpoint> {
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..config.size).map(|_| unbounded()).unzip();
    let barrier = Arc::new(Barrier::new(config.size.max(1)));
    receivers
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| LocalEndpoint {
            rank,
            peers: senders.clone(),
            inbox,
            pending: VecDeque::new(),
            pool: Arc::new(AtomicUsize::new(0)),
            capacity: config.buffer_bytes,
            barrier: Arc::clone(&barrier),
        })
        .collect()
}

impl LocalEndpoint {
    /// Bytes of this endpoint's pool held by messages not yet received.
    #[must_use]
    pub fn in_flight_bytes(&self) -> usize {
        self.pool.load(Ordering::Acquire)
    }

    /// Pool capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn pump(&mut self) {
        while let Ok(env) = self.inbox.try_recv() {
            self.pending.push_back(env);
        }
    }

    fn position(&self, source: Source, tag: Tag) -> Option<usize> {
        self.pending
            .iter()
            .position(|e| e.tag == tag && source.matches(e.source))
    }

    fn take(&mut self, pos: usize) -> Option<(Rank, Vec<u8>)> {
        let env = self.pending.remove(pos)?;
        env.pool.fetch_sub(env.charge, Ordering::AcqRel);
        Some((env.source, env.payload))
    }
}

impl Transport for LocalEndpoint {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&mut self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), TransportError> {
        let size = self.peers.len();
        let Some(peer) = self.peers.get(dest) else {
            return Err(TransportError::InvalidRank { rank: dest, size });
        };

        let charge = if is_pooled(tag) {
            payload.len() + ENVELOPE_OVERHEAD
        } else {
            0
        };
        // Only this endpoint adds to its pool; receivers only subtract.
        let in_flight = self.pool.load(Ordering::Acquire);
        if charge > 0 && in_flight + charge > self.capacity {
            tracing::warn!(
                rank = self.rank,
                dest,
                %tag,
                requested = charge,
                in_flight,
                capacity = self.capacity,
                "outgoing buffer exhausted"
            );
            return Err(TransportError::BufferExhausted {
                requested: charge,
                in_flight,
                capacity: self.capacity,
            });
        }
        self.pool.fetch_add(charge, Ordering::AcqRel);

        let env = Envelope {
            source: self.rank,
            tag,
            payload,
            charge,
            pool: Arc::clone(&self.pool),
        };
        peer.send(env).map_err(|err| {
            err.into_inner().pool.fetch_sub(charge, Ordering::AcqRel);
            TransportError::Disconnected { peer: dest }
        })
    }

    fn probe(&mut self, source: Source, tag: Tag) -> Option<Probe> {
        self.pump();
        let pos = self.position(source, tag)?;
        let env = &self.pending[pos];
        Some(Probe {
            source: env.source,
            len: env.payload.len(),
        })
    }

    fn recv(&mut self, source: Source, tag: Tag) -> Result<(Rank, Vec<u8>), TransportError> {
        self.pump();
        loop {
            if let Some(pos) = self.position(source, tag) {
                return self.take(pos).ok_or(TransportError::Closed);
            }
            let env = self.inbox.recv().map_err(|_| TransportError::Closed)?;
            self.pending.push_back(env);
        }
    }

    fn barrier(&mut self) -> Result<(), TransportError> {
        self.barrier.wait();
        Ok(())
    }
}
