//! Log setup.
//!
//! The subscriber is installed before the configuration is read, so config
//! loading can log too. Once the configured level is known the filter is
//! swapped in place, unless `RUST_LOG` was set.

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Filter used until the configuration has been read.
const BOOTSTRAP_LEVEL: &str = "warn";

/// Handle for replacing the bootstrap filter.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

/// Install the global subscriber, writing to stderr.
///
/// # Errors
/// Returns error if `RUST_LOG` is set but unparsable.
pub fn init() -> Result<LogHandle> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, from_env) = initial_filter(rust_log.as_deref())?;
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    Ok(LogHandle {
        filter: handle,
        from_env,
    })
}

impl LogHandle {
    /// Switch to the configured level. `RUST_LOG` still wins.
    ///
    /// # Errors
    /// Returns error if `level` is not a valid filter.
    pub fn apply_level(&self, level: &str) -> Result<()> {
        if self.from_env {
            return Ok(());
        }
        let filter = EnvFilter::try_new(level).with_context(|| format!("Invalid log level: {level}"))?;
        self.filter
            .reload(filter)
            .context("Failed to update log filter")
    }
}

fn initial_filter(rust_log: Option<&str>) -> Result<(EnvFilter, bool)> {
    match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map(|f| (f, true))
            .with_context(|| format!("Invalid {}: {directives}", EnvFilter::DEFAULT_ENV)),
        None => Ok((EnvFilter::new(BOOTSTRAP_LEVEL), false)),
    }
}
