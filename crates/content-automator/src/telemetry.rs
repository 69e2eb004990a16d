//! Process-wide logging setup.
//!
//! `tracing` events go through a `tracing-subscriber` fmt layer; records from
//! the `log` facade (used by the database layer) are bridged with
//! `tracing-log`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LogConfig;

/// `RUST_LOG` takes precedence over the configured level.
fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init(config: &LogConfig) {
    let registry = Registry::default().with(env_filter(config));
    let installed = if config.json {
        tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_target(true)),
        )
    } else {
        tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
    };

    if installed.is_err() {
        return;
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::warn!("log records will not be captured: {}", e);
    }

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
}
