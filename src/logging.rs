//! Logging setup
//!
//! `RUST_LOG` takes precedence over the configured level.

use crate::error::{CatalogError, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber; later calls in the same process are no-ops
pub fn setup_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| CatalogError::Config(format!("invalid log level '{level}': {e}")))?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .with(filter)
        .try_init()
        .ok();

    Ok(())
}
