//! hdastar harness: everything around the engine needed to run it.
//!
//! - [`worlds`] -- concrete search domains (sliding tiles, weighted grid, explicit graph)
//! - [`cluster`] -- one worker thread per rank over the in-process network
//! - [`config`] -- JSON run descriptions
//! - [`report`] -- cross-worker aggregation and rendering
//! - [`telemetry`] -- `tracing` subscriber setup for binaries
//!
//! The harness does not implement search logic; it only wires domains,
//! transports and workers together.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cluster;
pub mod config;
pub mod report;
pub mod telemetry;
pub mod worlds;
