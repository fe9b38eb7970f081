//! Subscriber setup for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to `main`. `RUST_LOG` takes precedence over the level passed in.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a stderr `fmt` subscriber. Calling this twice is harmless.
pub fn init_logging(log_level: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(build_filter(log_level))
        .with(fmt_layer)
        .try_init();
}
