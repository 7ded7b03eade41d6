//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LoggingSettings};
use crate::errors::{Error, Result};

/// Create a tracing span for one scenario.
///
/// ```rust,ignore
/// let span = scenario_span!("deny_is_unauthorized");
/// let span = scenario_span!("probe_path", path = "/outpost.goauthentik.io/start");
/// ```
#[macro_export]
macro_rules! scenario_span {
    ($name:expr) => {
        tracing::info_span!("scenario", name = %$name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!("scenario", name = %$name, $($field)*)
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this more than once is
/// harmless: later calls leave the first subscriber in place, which lets both
/// the CLI and every test call it.
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level).map_err(|e| {
            Error::config(format!("Invalid log level '{}': {}", settings.level, e))
        })?,
    };

    let installed = if settings.json {
        tracing_subscriber::fmt().with_env_filter(filter).json().with_target(true).try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init()
    };

    if installed.is_err() {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
    Ok(())
}

/// Log the effective configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        upstream = %config.sandbox.upstream_url,
        identity = %config.sandbox.identity_url,
        routing_address = %config.sandbox.routing_address,
        compose_dir = %config.sandbox.compose_dir.display(),
        probe = %config.bootstrap.probe,
        health_endpoints = config.bootstrap.health_endpoints.len(),
        login_timeout_s = config.timeouts.login_seconds,
        "Sandbox suite configuration"
    );
}
