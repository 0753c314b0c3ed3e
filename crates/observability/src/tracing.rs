//! Tracing/logging initialization.
//!
//! Workflow operations emit structured events keyed by request/return ids;
//! this wires them to JSON output with `RUST_LOG`-style filtering.

use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset: workflow diagnostics on,
/// everything else at info.
const DEFAULT_DIRECTIVES: &str = "info,chantier=debug";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with(DEFAULT_DIRECTIVES);
}

/// Initialize with explicit fallback directives, still honoring `RUST_LOG`.
pub fn init_with(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
