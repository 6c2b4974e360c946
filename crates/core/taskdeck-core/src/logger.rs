//! Logging utilities

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global logging system
///
/// Level defaults come from `TASKDECK_LOG_LEVEL`, overridden by `RUST_LOG`
/// when set. Call once from the binary before any other setup.
pub fn init_logging() {
    let level = std::env::var("TASKDECK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
