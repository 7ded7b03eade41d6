//! # Configuration Management
//!
//! Layered configuration for the sandbox suite: built-in defaults, then an
//! optional `authentik-e2e.toml`, then `AUTHENTIK_E2E__*` environment
//! variables (double underscore separates sections, e.g.
//! `AUTHENTIK_E2E__SANDBOX__ROUTING_ADDRESS=127.0.0.1:8000`).

pub mod settings;

use std::path::Path;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{Error, Result};

pub use settings::{
    BootstrapSettings, BrowserSettings, Credentials, HealthEndpoint, LoggingSettings, ProbeKind,
    SandboxSettings, TimeoutSettings,
};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "authentik-e2e.toml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "AUTHENTIK_E2E";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub sandbox: SandboxSettings,

    #[validate(nested)]
    pub credentials: Credentials,

    #[validate(nested)]
    pub timeouts: TimeoutSettings,

    #[validate(nested)]
    pub bootstrap: BootstrapSettings,

    pub browser: BrowserSettings,

    #[validate(nested)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Load from the default file (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from a specific file (if present) and the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let layered = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = layered.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    /// Checks the validator derive cannot express
    fn validate_custom(&self) -> Result<()> {
        for (field, url) in
            [("sandbox.upstream_url", &self.sandbox.upstream_url), ("sandbox.identity_url", &self.sandbox.identity_url)]
        {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::config(format!("{field} must be an http(s) URL, got '{url}'")));
            }
            if url.host_str().is_none() {
                return Err(Error::config(format!("{field} must carry a hostname, got '{url}'")));
            }
        }

        if self.timeouts.poll_interval() >= self.timeouts.readiness() {
            return Err(Error::config(
                "timeouts.poll_interval_ms must be shorter than timeouts.readiness_seconds",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.credentials.username, "akadmin");
        assert_eq!(config.bootstrap.probe, ProbeKind::Browser);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[sandbox]
routing_address = "127.0.0.1:8000"

[timeouts]
login_seconds = 45
poll_interval_ms = 250

[bootstrap]
probe = "http"
compose = false
"#
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.sandbox.routing_address, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.timeouts.login_seconds, 45);
        assert_eq!(config.timeouts.poll_interval_ms, 250);
        assert_eq!(config.bootstrap.probe, ProbeKind::Http);
        assert!(!config.bootstrap.compose);
        // untouched sections keep their defaults
        assert_eq!(config.bootstrap.health_endpoints.len(), 3);
        assert_eq!(config.sandbox.virtual_host(), "whoami.localhost");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.timeouts.readiness_seconds, 300);
    }

    #[test]
    fn environment_overrides_file() {
        std::env::set_var("AUTHENTIK_E2E__BROWSER__WINDOW_WIDTH", "1920");
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml"));
        std::env::remove_var("AUTHENTIK_E2E__BROWSER__WINDOW_WIDTH");

        assert_eq!(config.unwrap().browser.window_width, 1920);
    }

    #[test]
    fn non_http_upstream_is_rejected() {
        let mut config = AppConfig::default();
        config.sandbox.upstream_url = url::Url::parse("ftp://whoami.localhost/").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sandbox.upstream_url"));
    }

    #[test]
    fn poll_interval_must_fit_in_readiness_budget() {
        let mut config = AppConfig::default();
        config.timeouts.readiness_seconds = 1;
        config.timeouts.poll_interval_ms = 5000;
        assert!(config.validate().is_err());
    }
}
