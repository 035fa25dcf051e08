//! Tracing subscriber setup for binaries embedding the engine

use greenpoints_core::{Error, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "greenpoints_engine=debug,greenpoints_persistence=debug";

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer())
        .try_init()
        .map_err(|e| Error::ConfigError(format!("logging already initialized: {}", e)))
}
