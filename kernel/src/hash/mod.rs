//! Domain-separated state hashing.
//!
//! The distribution key is SHA-256 over `domain_prefix || data`, read as the
//! first four digest bytes big-endian, so routing is stable across builds
//! and platforms. The duplicate-table bucket hash is computed for every
//! generated node, so it uses xxh3 over the same `domain_prefix || data`
//! input instead.

mod hash_domain;

pub use hash_domain::HashDomain;

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::Xxh3;

use crate::carrier::packed::PackedState;

/// SHA-256 of `domain || data`.
#[must_use]
pub fn raw_hash(domain: HashDomain, data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    hasher.finalize().into()
}

/// First four digest bytes of [`raw_hash`], big-endian.
#[must_use]
pub fn hash_u32(domain: HashDomain, data: &[u8]) -> u32 {
    let h = raw_hash(domain, data);
    u32::from_be_bytes([h[0], h[1], h[2], h[3]])
}

/// Default distribution key of a packed state.
///
/// Domains with a cheaper incremental hash (Zobrist, for instance) supply
/// their own; this one only needs the packed bytes.
#[must_use]
pub fn distribution_key(packed: &PackedState) -> u32 {
    hash_u32(HashDomain::DistributionKey, packed.as_bytes())
}

/// xxh3 of `domain || data`, truncated to the low 32 bits.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn fast_hash_u32(domain: HashDomain, data: &[u8]) -> u32 {
    let mut hasher = Xxh3::new();
    hasher.update(domain.as_bytes());
    hasher.update(data);
    hasher.digest() as u32
}

/// Duplicate-table bucket hash of a packed state.
#[must_use]
pub fn table_hash(packed: &PackedState) -> u32 {
    fast_hash_u32(HashDomain::TableBucket, packed.as_bytes())
}
