//! Ring termination detection.
//!
//! Worker 0 circulates a token along `0 → 1 → … → n-1 → 0`. Each worker
//! keeps a signed `balance` (NODE batches sent minus NODE batches received)
//! and a `tainted` flag raised whenever it receives a batch. Idle workers
//! fold their balance and taint into the passing token and clear the taint.
//!
//! When the token returns, worker 0 calls the circuit clean iff neither the
//! token nor worker 0 is tainted and the folded balance (plus worker 0's
//! own) is zero. A dirty circuit resets the clean count. After two
//! consecutive clean circuits worker 0 broadcasts FTERM.
//!
//! The balance makes the verdict sound with batches still in flight: a
//! batch sent but not yet received leaves the sum positive. Busy workers
//! leave the token queued until they go idle.
//!
//! # Token format
//!
//! ```text
//! [circuits:u32be][balance:i64be][tainted:u8]
//! ```

use hdastar_kernel::transport::{Rank, Source, Tag, Transport};

use crate::error::SearchError;

/// Encoded token size in bytes.
pub const TOKEN_SIZE: usize = 4 + 8 + 1;

/// The TERM payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Token {
    /// Sequence number of the circuit this token belongs to.
    pub circuits: u32,
    pub balance: i64,
    pub tainted: bool,
}

impl Token {
    #[must_use]
    pub fn encode(&self) -> [u8; TOKEN_SIZE] {
        let mut out = [0u8; TOKEN_SIZE];
        out[0..4].copy_from_slice(&self.circuits.to_be_bytes());
        out[4..12].copy_from_slice(&self.balance.to_be_bytes());
        out[12] = u8::from(self.tainted);
        out
    }

    /// `None` unless `bytes` is exactly [`TOKEN_SIZE`] long.
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; TOKEN_SIZE] = bytes.try_into().ok()?;
        let mut circuits = [0u8; 4];
        circuits.copy_from_slice(&bytes[0..4]);
        let mut balance = [0u8; 8];
        balance.copy_from_slice(&bytes[4..12]);
        Some(Self {
            circuits: u32::from_be_bytes(circuits),
            balance: i64::from_be_bytes(balance),
            tainted: bytes[12] != 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Terminated,
}

#[derive(Debug)]
pub struct TerminationDetector {
    rank: Rank,
    size: usize,
    balance: i64,
    tainted: bool,
    token_outstanding: bool,
    launched: u32,
    clean_circuits: u32,
}

impl TerminationDetector {
    #[must_use]
    pub fn new(rank: Rank, size: usize) -> Self {
        Self {
            rank,
            size: size.max(1),
            balance: 0,
            tainted: false,
            token_outstanding: false,
            launched: 0,
            clean_circuits: 0,
        }
    }

    /// Account for NODE batches this worker put on the wire.
    #[allow(clippy::cast_possible_wrap)]
    pub fn on_batches_sent(&mut self, batches: u64) {
        self.balance += batches as i64;
    }

    /// Account for one NODE batch taken off the wire.
    pub fn on_batch_received(&mut self) {
        self.balance -= 1;
        self.tainted = true;
    }

    #[must_use]
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Consecutive clean circuits observed by worker 0 so far.
    #[must_use]
    pub fn clean_circuits(&self) -> u32 {
        self.clean_circuits
    }

    /// One idle-time protocol step. Never blocks.
    ///
    /// # Errors
    ///
    /// [`SearchError::Transport`] on send/receive failure,
    /// [`SearchError::MalformedMessage`] for an undecodable token.
    pub fn step<T: Transport>(&mut self, transport: &mut T) -> Result<Verdict, SearchError> {
        if transport.probe(Source::Any, Tag::FinalTerm).is_some() {
            transport.recv(Source::Any, Tag::FinalTerm)?;
            tracing::debug!(rank = self.rank, "final termination received");
            return Ok(Verdict::Terminated);
        }
        if self.rank == 0 {
            self.step_initiator(transport)
        } else {
            self.step_relay(transport)?;
            Ok(Verdict::Continue)
        }
    }

    fn step_initiator<T: Transport>(&mut self, transport: &mut T) -> Result<Verdict, SearchError> {
        if !self.token_outstanding {
            self.launch(transport)?;
            return Ok(Verdict::Continue);
        }
        let Some(token) = Self::take_token(transport)? else {
            return Ok(Verdict::Continue);
        };
        self.token_outstanding = false;

        let clean = !token.tainted && !self.tainted && token.balance + self.balance == 0;
        if clean {
            self.clean_circuits += 1;
        } else {
            self.clean_circuits = 0;
        }
        tracing::debug!(
            rank = self.rank,
            circuits = token.circuits,
            balance = token.balance + self.balance,
            tainted = token.tainted || self.tainted,
            clean,
            clean_circuits = self.clean_circuits,
            "termination token returned"
        );

        if self.clean_circuits > 1 {
            for dest in 1..self.size {
                transport.send(dest, Tag::FinalTerm, Vec::new())?;
            }
            tracing::debug!(rank = self.rank, circuits = token.circuits, "termination certified");
            return Ok(Verdict::Terminated);
        }
        self.launch(transport)?;
        Ok(Verdict::Continue)
    }

    fn launch<T: Transport>(&mut self, transport: &mut T) -> Result<(), SearchError> {
        self.launched += 1;
        self.tainted = false;
        let token = Token {
            circuits: self.launched,
            balance: 0,
            tainted: false,
        };
        transport.send(transport.ring_next(), Tag::Term, token.encode().to_vec())?;
        self.token_outstanding = true;
        tracing::debug!(rank = self.rank, circuits = self.launched, "termination token launched");
        Ok(())
    }

    fn step_relay<T: Transport>(&mut self, transport: &mut T) -> Result<(), SearchError> {
        let Some(mut token) = Self::take_token(transport)? else {
            return Ok(());
        };
        token.balance += self.balance;
        token.tainted |= self.tainted;
        self.tainted = false;
        transport.send(transport.ring_next(), Tag::Term, token.encode().to_vec())?;
        tracing::debug!(
            rank = self.rank,
            circuits = token.circuits,
            balance = token.balance,
            tainted = token.tainted,
            "termination token forwarded"
        );
        Ok(())
    }

    fn take_token<T: Transport>(transport: &mut T) -> Result<Option<Token>, SearchError> {
        let prev = transport.ring_prev();
        if transport.probe(Source::Rank(prev), Tag::Term).is_none() {
            return Ok(None);
        }
        let (from, payload) = transport.recv(Source::Rank(prev), Tag::Term)?;
        Token::decode(&payload)
            .map(Some)
            .ok_or(SearchError::MalformedMessage {
                tag: Tag::Term,
                from,
                len: payload.len(),
            })
    }
}
