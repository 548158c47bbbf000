//! Log output for the `perudo-bot` binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Frame-level traffic is logged at `debug`, so `RUST_LOG=perudo_bot=debug`
/// shows every line sent and received.
///
/// Panics if a global subscriber is already set; call it once, from `main`.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
