//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize with the filter taken from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    init_with_filter(filter);
}

/// Initialize with an explicit filter directive (tests, embedded use).
pub fn init_with_filter(filter: EnvFilter) {
    // JSON logs + timestamps; the target is dropped in favor of fields.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
