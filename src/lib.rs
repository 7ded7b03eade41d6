//! # authentik-forward-e2e
//!
//! End-to-end suite for a forward-auth sandbox: Traefik with the Authentik
//! forward plugin in front of a `whoami` upstream, with Authentik as the
//! identity provider. Everything under test is a black box reached over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! bootstrap ──► compose up --wait ──► health endpoints (probe until 200)
//!
//! scenarios::status / paths ──► SandboxClient ──► routing address (Host: whoami.localhost)
//! scenarios::flow           ──► SharedSession ──► Chrome ──► *.localhost
//! ```
//!
//! ## Components
//!
//! - **Bootstrap**: starts the compose deployment and waits for readiness
//! - **HTTP request fixture**: host-rewriting client that never follows redirects
//! - **Shared browser fixture**: one browser context reused by an ordered flow
//! - **Scenarios**: assertion scripts returning [`Result<()>`](Result)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use authentik_forward_e2e::{client::SandboxClient, scenarios::status, AppConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load()?;
//!     let client = SandboxClient::from_config(&config)?;
//!     status::deny_is_unauthorized(&client, &config.sandbox).await
//! }
//! ```

pub mod bootstrap;
pub mod browser;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod outpost;
pub mod retry;
pub mod scenarios;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
