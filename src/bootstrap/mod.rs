//! # Environment Bootstrap
//!
//! Brings the sandbox up once before any scenario runs: start the compose
//! deployment (unless disabled), then poll every health endpoint in order
//! until it answers 200.

pub mod compose;
pub mod health;

use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::errors::Result;

pub use compose::ComposeStack;
pub use health::{
    create_probe, wait_for_endpoints, wait_until_healthy, BrowserProbe, HealthProbe, HttpProbe,
};

/// Start the sandbox and block until it is ready
#[instrument(skip_all, fields(compose = config.bootstrap.compose, probe = %config.bootstrap.probe))]
pub async fn bootstrap(config: &AppConfig) -> Result<()> {
    if config.bootstrap.compose {
        let stack = ComposeStack::new(&config.sandbox.compose_dir)?;
        info!("Starting docker compose sandbox services...");
        stack.up().await?;
        info!("Started docker compose sandbox services");
    } else {
        info!("Compose start skipped, expecting a running sandbox");
    }

    info!("Waiting for docker compose sandbox services to be ready...");
    let probe = create_probe(config).await?;
    wait_for_endpoints(probe.as_ref(), &config.bootstrap.health_endpoints, &config.timeouts)
        .await?;
    info!("Docker compose sandbox services are ready");

    Ok(())
}

/// Stop the compose deployment
#[instrument(skip_all)]
pub async fn teardown(config: &AppConfig) -> Result<()> {
    let stack = ComposeStack::new(&config.sandbox.compose_dir)?;
    info!(dir = %stack.dir().display(), "Stopping docker compose sandbox services...");
    stack.down().await?;
    info!("Docker compose sandbox services stopped");
    Ok(())
}
