//! # Configuration Settings
//!
//! Defines the configuration sections for the sandbox suite.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::errors::{Error, Result};

/// Sandbox topology: where the virtual hosts live and how to reach them
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SandboxSettings {
    /// Upstream protected by the outpost, addressed by its virtual hostname
    pub upstream_url: Url,

    /// Identity provider base URL (where sign-out lands)
    pub identity_url: Url,

    /// Local routing endpoint every fixture request is sent to
    pub routing_address: SocketAddr,

    /// Directory holding the compose deployment descriptor
    pub compose_dir: PathBuf,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            upstream_url: Url::parse("http://whoami.localhost/").expect("static upstream url"),
            identity_url: Url::parse("http://authentik.localhost:9000/")
                .expect("static identity url"),
            routing_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 80)),
            compose_dir: PathBuf::from("../sandbox"),
        }
    }
}

impl SandboxSettings {
    /// Virtual hostname of the upstream (`whoami.localhost`)
    pub fn virtual_host(&self) -> &str {
        self.upstream_url.host_str().unwrap_or_default()
    }

    /// Absolute upstream URL for a path such as `/login`
    pub fn upstream(&self, path: &str) -> Result<Url> {
        self.upstream_url.join(path).map_err(|e| Error::url(path, e))
    }

    /// Identity provider origin used as a URL prefix (no trailing slash)
    pub fn identity_origin(&self) -> String {
        self.identity_url.origin().ascii_serialization()
    }
}

/// Credentials submitted to the identity provider's login flow
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self { username: "akadmin".to_string(), password: "authentik".to_string() }
    }
}

/// Time budgets for every bounded wait in the suite
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Per-request timeout of the HTTP request fixture
    #[validate(range(min = 1, max = 300, message = "Request timeout must be between 1 and 300 seconds"))]
    pub request_seconds: u64,

    /// Browser navigation and selector waits
    #[validate(range(min = 1, max = 300, message = "Navigation timeout must be between 1 and 300 seconds"))]
    pub navigation_seconds: u64,

    /// Wait for the post-login redirect back to the upstream
    #[validate(range(min = 1, max = 600, message = "Login timeout must be between 1 and 600 seconds"))]
    pub login_seconds: u64,

    /// Budget for each health endpoint during bootstrap
    #[validate(range(min = 1, max = 3600, message = "Readiness timeout must be between 1 and 3600 seconds"))]
    pub readiness_seconds: u64,

    /// Interval between readiness polls
    #[validate(range(min = 10, max = 60000, message = "Poll interval must be between 10ms and 60s"))]
    pub poll_interval_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            request_seconds: 30,
            navigation_seconds: 30,
            login_seconds: 30,
            readiness_seconds: 300,
            poll_interval_ms: 1000,
        }
    }
}

impl TimeoutSettings {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_seconds)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_seconds)
    }

    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_seconds)
    }

    pub fn readiness(&self) -> Duration {
        Duration::from_secs(self.readiness_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// How bootstrap checks health endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// Headless browser navigation (resolves `*.localhost` like Chrome does)
    Browser,
    /// HTTP request fixture with host rewriting
    Http,
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeKind::Browser => write!(f, "browser"),
            ProbeKind::Http => write!(f, "http"),
        }
    }
}

/// A named readiness URL polled during bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthEndpoint {
    pub name: String,
    pub url: Url,
}

impl HealthEndpoint {
    pub fn new(name: impl Into<String>, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::url(url, e))?;
        Ok(Self { name: name.into(), url })
    }
}

/// Environment bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BootstrapSettings {
    /// Start the compose deployment before polling
    pub compose: bool,

    /// Prober used for health endpoints
    pub probe: ProbeKind,

    /// Endpoints polled in order; each must answer 200 before the next is tried
    #[validate(length(min = 1, message = "At least one health endpoint is required"))]
    pub health_endpoints: Vec<HealthEndpoint>,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        let endpoint = |name: &str, url: &str| HealthEndpoint {
            name: name.to_string(),
            url: Url::parse(url).expect("static health endpoint"),
        };
        Self {
            compose: true,
            probe: ProbeKind::Browser,
            health_endpoints: vec![
                endpoint("Traefik", "http://traefik.localhost:8080/ping/"),
                endpoint("Authentik", "http://authentik.localhost:9000/-/health/ready/"),
                endpoint(
                    "Authentik blueprints",
                    "http://whoami.localhost/outpost.goauthentik.io/start",
                ),
            ],
        }
    }
}

/// Headless browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,

    /// Chrome sandboxing; usually disabled inside containers
    pub sandbox: bool,

    /// Explicit Chrome/Chromium binary, otherwise auto-detected
    pub chrome_path: Option<PathBuf>,

    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_path: None,
            window_width: 1280,
            window_height: 800,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Enable JSON structured logging
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_defaults_match_the_compose_deployment() {
        let sandbox = SandboxSettings::default();
        assert_eq!(sandbox.virtual_host(), "whoami.localhost");
        assert_eq!(sandbox.routing_address, "127.0.0.1:80".parse().unwrap());
        assert_eq!(sandbox.identity_origin(), "http://authentik.localhost:9000");
        assert_eq!(
            sandbox.upstream("/outpost.goauthentik.io/sign_out").unwrap().as_str(),
            "http://whoami.localhost/outpost.goauthentik.io/sign_out"
        );
    }

    #[test]
    fn timeouts_convert_to_durations() {
        let timeouts = TimeoutSettings::default();
        assert_eq!(timeouts.login(), Duration::from_secs(30));
        assert_eq!(timeouts.poll_interval(), Duration::from_secs(1));
        assert_eq!(timeouts.readiness(), Duration::from_secs(300));
    }

    #[test]
    fn bootstrap_polls_three_endpoints_in_order() {
        let names: Vec<_> = BootstrapSettings::default()
            .health_endpoints
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["Traefik", "Authentik", "Authentik blueprints"]);
    }

    #[test]
    fn out_of_range_timeout_fails_validation() {
        let timeouts = TimeoutSettings { login_seconds: 0, ..Default::default() };
        assert!(timeouts.validate().is_err());
    }

    #[test]
    fn health_endpoint_rejects_garbage_url() {
        assert!(HealthEndpoint::new("broken", "not a url").is_err());
    }
}
