//! hdastar kernel: the leaf layer shared by the search engine and the harness.
//!
//! # API Surface
//!
//! - [`carrier::packed::PackedState`] -- opaque, domain-encoded state bytes
//! - [`hash::distribution_key`] / [`hash::table_hash`] -- domain-separated state hashing
//! - [`transport::Transport`] -- the point-to-point messaging contract the engine runs on
//! - [`transport::local::local_network`] -- in-process implementation, one endpoint per worker
//!
//! # Module Dependency Direction
//!
//! `carrier` ← `hash`, `transport` stands alone.
//!
//! One-way only. No cycles. Nothing here knows about search nodes.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod hash;
pub mod transport;
