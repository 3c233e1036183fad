//! Log subscriber setup for binaries and tests.
//!
//! The library crates only emit `tracing` events. Whoever owns `main`
//! decides where they go; this installs the default: human-readable lines
//! on stderr, filtered by `HDASTAR_LOG` (an `EnvFilter` directive string,
//! default `info`).

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "HDASTAR_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Install the global subscriber. A second call is a no-op.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    // Fails only when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
