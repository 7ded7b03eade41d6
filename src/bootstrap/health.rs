//! Health endpoint probing
//!
//! A [`HealthProbe`] reports the status code a URL currently answers with.
//! Bootstrap polls each configured endpoint through one probe until it sees
//! a 200. Probe failures (connection refused, driver errors) count as "not
//! ready" rather than aborting the wait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::browser::{BrowserFixture, Page};
use crate::client::SandboxClient;
use crate::config::{AppConfig, HealthEndpoint, ProbeKind, TimeoutSettings};
use crate::errors::{Error, Result};
use crate::retry::{retry_until, with_timeout, RetryPolicy};

/// Redirect hops the HTTP probe follows before giving up
pub const MAX_REDIRECTS: usize = 10;

#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn kind(&self) -> ProbeKind;

    /// Status of the final response for `url` (0 when nothing answered)
    async fn status(&self, url: &Url) -> Result<u16>;
}

/// Probe through the HTTP request fixture.
///
/// The fixture never follows redirects, so the probe walks `Location`
/// headers itself, each hop rewritten to the routing address like the first.
pub struct HttpProbe {
    client: SandboxClient,
}

impl HttpProbe {
    pub fn new(client: SandboxClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Http
    }

    async fn status(&self, url: &Url) -> Result<u16> {
        let mut current = url.clone();
        let mut status = 0;

        for _ in 0..=MAX_REDIRECTS {
            let response = self.client.get(current.as_str()).await?;
            status = response.status.as_u16();
            if !response.status.is_redirection() {
                return Ok(status);
            }
            let Some(location) = response.location() else {
                return Ok(status);
            };
            current = current.join(location).map_err(|e| Error::url(location, e))?;
            debug!(from = %url, to = %current, "Following redirect");
        }

        Ok(status)
    }
}

struct BrowserProbeState {
    page: Page,
    timeouts: TimeoutSettings,
    _browser: BrowserFixture,
}

/// Probe by navigating a headless browser page, following redirects the way
/// a user would.
pub struct BrowserProbe {
    state: Arc<BrowserProbeState>,
}

impl BrowserProbe {
    /// Launch Chrome and open the probing page (blocking)
    pub fn launch(config: &AppConfig) -> Result<Self> {
        let browser = BrowserFixture::launch(&config.browser, &config.timeouts)?;
        let page = browser.new_page()?;
        let state = BrowserProbeState { page, timeouts: config.timeouts.clone(), _browser: browser };
        Ok(Self { state: Arc::new(state) })
    }
}

#[async_trait]
impl HealthProbe for BrowserProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Browser
    }

    async fn status(&self, url: &Url) -> Result<u16> {
        let state = Arc::clone(&self.state);
        let budget = state.timeouts.navigation();
        let target = url.to_string();
        let task = async move {
            tokio::task::spawn_blocking(move || state.page.status_of(&target))
                .await
                .map_err(|e| Error::browser(format!("browser probe task failed: {e}")))?
        };
        with_timeout(&format!("browser probe of {url}"), budget, task).await
    }
}

/// Build the configured probe. Launching Chrome is blocking work.
pub async fn create_probe(config: &AppConfig) -> Result<Box<dyn HealthProbe>> {
    match config.bootstrap.probe {
        ProbeKind::Http => Ok(Box::new(HttpProbe::new(SandboxClient::from_config(config)?))),
        ProbeKind::Browser => {
            let config = config.clone();
            let probe = tokio::task::spawn_blocking(move || BrowserProbe::launch(&config))
                .await
                .map_err(|e| Error::browser(format!("browser launch task failed: {e}")))??;
            Ok(Box::new(probe))
        }
    }
}

/// Poll `endpoint` until it answers 200 or the readiness budget runs out
pub async fn wait_until_healthy(
    probe: &dyn HealthProbe,
    endpoint: &HealthEndpoint,
    timeouts: &TimeoutSettings,
) -> Result<()> {
    let policy = RetryPolicy::readiness(timeouts, format!("{} at {}", endpoint.name, endpoint.url));

    retry_until(
        &policy,
        move || async move {
            let status = match probe.status(&endpoint.url).await {
                Ok(status) => status,
                Err(e) => {
                    debug!(endpoint = %endpoint.name, error = %e, "Health probe failed");
                    0
                }
            };
            if status != 200 {
                info!("{} not ready yet...", endpoint.name);
            }
            Ok(status)
        },
        |status| *status == 200,
    )
    .await?;

    info!(endpoint = %endpoint.name, url = %endpoint.url, probe = %probe.kind(), "Endpoint healthy");
    Ok(())
}

/// Wait for every endpoint in order
pub async fn wait_for_endpoints(
    probe: &dyn HealthProbe,
    endpoints: &[HealthEndpoint],
    timeouts: &TimeoutSettings,
) -> Result<()> {
    for endpoint in endpoints {
        wait_until_healthy(probe, endpoint, timeouts).await?;
    }
    Ok(())
}
