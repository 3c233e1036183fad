//! Run configuration files.
//!
//! A run is described by one JSON document:
//!
//! ```json
//! {
//!   "world": { "kind": "sliding_tile", "width": 3, "height": 3,
//!              "tiles": [1, 2, 5, 3, 0, 4, 6, 7, 8] },
//!   "workers": 4,
//!   "engine": { "outgo_threshold": 8 },
//!   "time_budget_ms": 60000
//! }
//! ```
//!
//! Every engine knob is optional and falls back to
//! [`EngineConfig::default`]. `buffer_bytes` falls back to
//! [`recommended_buffer_bytes`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use hdastar_kernel::transport::local::ENVELOPE_OVERHEAD;
use hdastar_search::error::SearchError;
use hdastar_search::node::Cost;
use hdastar_search::policy::EngineConfig;
use hdastar_search::wire::HEADER_SIZE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::worlds::WorldError;

/// Upper bound of [`recommended_buffer_bytes`].
pub const MAX_BUFFER_BYTES: usize = 400_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed run config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] SearchError),
    #[error(transparent)]
    World(#[from] WorldError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorldConfig {
    SlidingTile {
        width: usize,
        height: usize,
        /// Row-major, 0 for the blank.
        tiles: Vec<u8>,
    },
    Grid {
        /// Row-major entry costs, 0 for walls.
        costs: Vec<Vec<Cost>>,
        start: [u16; 2],
        goal: [u16; 2],
    },
}

/// Per-knob overrides of [`EngineConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOverrides {
    pub outgo_threshold: Option<usize>,
    pub frontier_overrun: Option<usize>,
    pub closed_capacity: Option<usize>,
    pub frontier_capacity: Option<usize>,
    pub initial_incumbent: Option<Cost>,
    pub skip_inverse_operator: Option<bool>,
    pub verify_node_costs: Option<bool>,
    pub trace_expansions: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub world: WorldConfig,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub engine: EngineOverrides,
    #[serde(default)]
    pub buffer_bytes: Option<usize>,
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
}

fn default_workers() -> usize {
    1
}

impl RunConfig {
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Json`] if it does not parse.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// # Errors
    ///
    /// [`ConfigError::Json`] if `text` does not parse.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolve and validate the engine knobs.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if the resolved config fails validation.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let defaults = EngineConfig::for_workers(self.workers);
        let o = &self.engine;
        let config = EngineConfig {
            worker_count: self.workers,
            outgo_threshold: o.outgo_threshold.unwrap_or(defaults.outgo_threshold),
            frontier_overrun: o.frontier_overrun.unwrap_or(defaults.frontier_overrun),
            closed_capacity: o.closed_capacity.unwrap_or(defaults.closed_capacity),
            frontier_capacity: o.frontier_capacity.unwrap_or(defaults.frontier_capacity),
            initial_incumbent: o.initial_incumbent.unwrap_or(defaults.initial_incumbent),
            time_budget: self.time_budget_ms.map(Duration::from_millis),
            skip_inverse_operator: o
                .skip_inverse_operator
                .unwrap_or(defaults.skip_inverse_operator),
            verify_node_costs: o.verify_node_costs.unwrap_or(defaults.verify_node_costs),
            trace_expansions: o.trace_expansions.unwrap_or(defaults.trace_expansions),
        };
        config.validate()?;
        Ok(config)
    }

    /// Bytes of packed state per node for this world.
    #[must_use]
    pub fn packed_state_len(&self) -> usize {
        match &self.world {
            WorldConfig::SlidingTile { width, height, .. } => width * height,
            WorldConfig::Grid { .. } => 4,
        }
    }

    /// `buffer_bytes` if set, otherwise the recommendation for this world.
    #[must_use]
    pub fn resolved_buffer_bytes(&self) -> usize {
        self.buffer_bytes.unwrap_or_else(|| {
            recommended_buffer_bytes(
                HEADER_SIZE + self.packed_state_len(),
                self.workers,
                self.engine.outgo_threshold.unwrap_or(0) + 1,
            )
        })
    }
}

/// Outgoing pool size for `workers` peers exchanging nodes of `node_size`
/// encoded bytes in batches of about `batch_nodes`.
///
/// Room for 100 single-node messages and 10 000 full batches per peer,
/// capped at [`MAX_BUFFER_BYTES`].
#[must_use]
pub fn recommended_buffer_bytes(node_size: usize, workers: usize, batch_nodes: usize) -> usize {
    let singles = (node_size + ENVELOPE_OVERHEAD) * workers * 100;
    let batches = (node_size * batch_nodes + ENVELOPE_OVERHEAD) * workers * 10_000;
    singles.saturating_add(batches).min(MAX_BUFFER_BYTES)
}
