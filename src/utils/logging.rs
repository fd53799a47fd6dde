//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Installs a formatted tracing subscriber honoring `RUST_LOG`. Leaves any
/// subscriber an embedding application already installed in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
