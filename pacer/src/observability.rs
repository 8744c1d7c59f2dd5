//! Log subscriber setup for binaries and tests that use pacer.
//!
//! Pacer itself only emits `tracing` events; installing a subscriber is
//! left to the application. These helpers cover the common setups.

use tracing_subscriber::EnvFilter;

fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Installs a human-readable subscriber.
///
/// `RUST_LOG` overrides `default_directives` when set. Returns `false` if a
/// global subscriber was already installed.
pub fn init_tracing(default_directives: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directives))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Installs a JSON subscriber, one event per line.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_json_tracing(default_directives: &str) -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(default_directives))
        .with_current_span(false)
        .try_init()
        .is_ok()
}
