//! Logging setup for hosts embedding the matcher.
//!
//! The engine only emits `tracing` events; installing a subscriber is left to
//! the host binary. Tests and embedders that must not touch global state can
//! scope one with [`tracing::subscriber::with_default`] and [`subscriber`].

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Initialize tracing with Sheetmatch defaults.
///
/// Sets up tracing-subscriber with:
/// - Environment filter (RUST_LOG)
/// - Compact format suitable for terminal output
pub fn init() {
    init_with_filter("info");
}

/// Initialize tracing with a custom default filter.
///
/// Does nothing if a global subscriber is already set.
pub fn init_with_filter(default_filter: &str) {
    let _ = subscriber(default_filter).try_init();
}

/// Registry with an env filter and compact fmt layer, not installed
pub fn subscriber(default_filter: &str) -> impl tracing::Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    Registry::default()
        .with(filter)
        .with(fmt::layer().compact())
}
