//! Logging setup for the driver.

use anyhow::Context;
use tracing::subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `default_level`. Records from the `log` facade are forwarded.
pub fn init(default_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("invalid log filter {default_level:?}"))?,
    };

    LogTracer::init().context("installing the log bridge")?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false));
    subscriber::set_global_default(registry)
        .context("installing the tracing subscriber")?;
    Ok(())
}
