//! Incumbent tracking and broadcast.
//!
//! The incumbent is the best solution cost this worker knows of. It only
//! ever goes down. A local goal with a strictly lower cost replaces it and
//! is broadcast; a remote INCUMBENT message replaces it when lower.

use hdastar_kernel::carrier::packed::PackedState;
use hdastar_kernel::transport::{Rank, Tag, Transport, TransportError};

use crate::node::Cost;

/// A goal this worker discovered itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub cost: Cost,
    pub state: PackedState,
    pub found_by: Rank,
}

/// Where an incumbent value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncumbentSource {
    /// The configured upper bound.
    Initial,
    Local,
    Remote(Rank),
}

/// One accepted incumbent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncumbentUpdate {
    pub cost: Cost,
    pub source: IncumbentSource,
}

#[derive(Debug, Clone)]
pub struct Incumbent {
    rank: Rank,
    value: Cost,
    solution: Option<Solution>,
    history: Vec<IncumbentUpdate>,
}

impl Incumbent {
    #[must_use]
    pub fn new(rank: Rank, initial: Cost) -> Self {
        Self {
            rank,
            value: initial,
            solution: None,
            history: vec![IncumbentUpdate {
                cost: initial,
                source: IncumbentSource::Initial,
            }],
        }
    }

    /// Current bound. Nodes with `f >= value()` are prunable.
    #[must_use]
    pub fn value(&self) -> Cost {
        self.value
    }

    /// The best goal found by this worker, if it found one.
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Every accepted value in acceptance order, starting with the initial bound.
    #[must_use]
    pub fn history(&self) -> &[IncumbentUpdate] {
        &self.history
    }

    /// Offer a goal reached locally at `cost`.
    ///
    /// Returns `true` if it was strictly better and was adopted; the caller
    /// then broadcasts.
    pub fn offer_local(&mut self, cost: Cost, goal: &PackedState) -> bool {
        if cost >= self.value {
            return false;
        }
        self.accept(cost, IncumbentSource::Local);
        self.solution = Some(Solution {
            cost,
            state: goal.clone(),
            found_by: self.rank,
        });
        true
    }

    /// Adopt a value announced by `from` if it is lower.
    pub fn adopt_remote(&mut self, cost: Cost, from: Rank) -> bool {
        if cost >= self.value {
            return false;
        }
        self.accept(cost, IncumbentSource::Remote(from));
        true
    }

    fn accept(&mut self, cost: Cost, source: IncumbentSource) {
        tracing::debug!(rank = self.rank, cost, previous = self.value, ?source, "incumbent lowered");
        self.value = cost;
        self.history.push(IncumbentUpdate { cost, source });
    }

    /// Announce the current value to every other worker.
    ///
    /// Returns the number of messages sent.
    ///
    /// # Errors
    ///
    /// Propagates the first transport failure.
    pub fn broadcast<T: Transport>(&self, transport: &mut T) -> Result<usize, TransportError> {
        let mut sent = 0;
        for dest in (0..transport.size()).filter(|&d| d != self.rank) {
            transport.send(dest, Tag::Incumbent, encode_cost(self.value).to_vec())?;
            sent += 1;
        }
        Ok(sent)
    }
}

/// INCUMBENT payload: the cost as 4 bytes big-endian.
#[must_use]
pub fn encode_cost(cost: Cost) -> [u8; 4] {
    cost.to_be_bytes()
}

/// Inverse of [`encode_cost`]; `None` unless the payload is exactly 4 bytes.
#[must_use]
pub fn decode_cost(payload: &[u8]) -> Option<Cost> {
    let bytes: [u8; 4] = payload.try_into().ok()?;
    Some(Cost::from_be_bytes(bytes))
}
