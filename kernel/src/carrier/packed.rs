//! `PackedState`: the wire-encodable form of a domain state.
//!
//! The kernel never interprets these bytes. A domain's `pack` must be a
//! bijection onto this encoding so that byte equality is state equality;
//! the duplicate table and the frontier index rely on it.

use std::fmt;

/// Opaque packed state bytes.
///
/// Equality, ordering and hashing are plain byte comparisons.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackedState(Vec<u8>);

impl PackedState {
    /// Wrap already-packed bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Copy packed bytes out of a wire buffer.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload length in bytes (the declared size on the wire).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for PackedState {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for PackedState {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PackedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for PackedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedState({})", hex::encode(&self.0))
    }
}
