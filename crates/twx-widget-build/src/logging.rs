//! Tracing subscriber setup for build hosts and tests

use tracing_subscriber::EnvFilter;

/// Install a global subscriber honoring `RUST_LOG`, defaulting to `info`.
/// Later calls are no-ops, so hosts and tests may both call this.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
