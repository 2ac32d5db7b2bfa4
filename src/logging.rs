//! Diagnostic logging
//!
//! Events go to standard error through `tracing-subscriber`.
//! The filter is taken from `RUST_LOG` and is `off` when the variable is unset,
//! so a default session writes nothing beyond its own diagnostics.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "off";

/// Installs the global subscriber. Call once, before anything logs.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}
