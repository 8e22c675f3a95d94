//! Logging bootstrap.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Does nothing if a global subscriber is already set.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

/// Like [`init`] with a different fallback filter, e.g. `"lupine_core=debug"`.
pub fn init_with(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
