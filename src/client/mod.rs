//! HTTP request fixture
//!
//! [`SandboxClient`] sends every request to the local routing endpoint while
//! keeping the virtual hostname in the `Host` header, so the routing layer
//! dispatches by name exactly as it would for a browser. Redirects are never
//! followed: a 3xx comes back as-is with its `Location`.

pub mod redirect;

use std::net::SocketAddr;

use reqwest::header::{HeaderMap, HeaderValue, HOST, LOCATION};
use reqwest::{Client, Method, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::{AppConfig, SandboxSettings, TimeoutSettings};
use crate::errors::{Error, Result};

pub use redirect::StartRedirect;

/// Physical target of a request plus the `Host` header that names the virtual host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenTarget {
    pub url: Url,
    pub host: String,
}

/// Point `original` at `routing`, keeping path and query.
///
/// An explicit port on the original URL wins over the routing port so that
/// `http://traefik.localhost:8080/ping/` lands on `<routing ip>:8080`.
pub fn rewrite_target(original: &Url, routing: SocketAddr) -> Result<RewrittenTarget> {
    let hostname = original
        .host_str()
        .ok_or_else(|| Error::url(original.as_str(), "URL has no hostname"))?;
    let host = match original.port() {
        Some(port) => format!("{hostname}:{port}"),
        None => hostname.to_string(),
    };

    let mut url = original.clone();
    url.set_ip_host(routing.ip())
        .map_err(|_| Error::url(original.as_str(), "cannot rewrite host"))?;

    // the url crate drops a port equal to the scheme default
    let port = original.port().unwrap_or(routing.port());
    url.set_port(Some(port)).map_err(|_| Error::url(original.as_str(), "cannot rewrite port"))?;

    Ok(RewrittenTarget { url, host })
}

/// A fully buffered response that was not followed
#[derive(Debug, Clone)]
pub struct SandboxResponse {
    /// Original (virtual) URL of the request
    pub requested: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl SandboxResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Parse the `Location` header as a redirect to the outpost start endpoint
    pub fn start_redirect(&self) -> Result<StartRedirect> {
        let location = self.location().ok_or_else(|| {
            Error::assertion(
                format!("Location header of {}", self.requested),
                "a redirect target",
                "no Location header",
            )
        })?;
        StartRedirect::parse(location, &self.requested)
    }
}

/// Preconfigured HTTP client for the sandbox
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    routing: SocketAddr,
}

impl SandboxClient {
    pub fn new(sandbox: &SandboxSettings, timeouts: &TimeoutSettings) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeouts.request())
            .build()
            .map_err(|e| Error::http("Failed to build HTTP client", e))?;

        Ok(Self { client, routing: sandbox.routing_address })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.sandbox, &config.timeouts)
    }

    /// Local routing endpoint requests are sent to
    pub fn routing_address(&self) -> SocketAddr {
        self.routing
    }

    /// GET a virtual URL such as `http://whoami.localhost/login`
    pub async fn get(&self, url: &str) -> Result<SandboxResponse> {
        self.fetch(Method::GET, url, HeaderMap::new()).await
    }

    /// Send a request with extra headers; a caller-supplied `Host` is replaced
    pub async fn fetch(&self, method: Method, url: &str, mut headers: HeaderMap) -> Result<SandboxResponse> {
        let requested = Url::parse(url).map_err(|e| Error::url(url, e))?;
        let target = rewrite_target(&requested, self.routing)?;

        let host = HeaderValue::from_str(&target.host)
            .map_err(|e| Error::url(url, format!("invalid Host header: {e}")))?;
        headers.insert(HOST, host);

        debug!(
            method = %method,
            original = %requested,
            target = %target.url,
            host = %target.host,
            "Sending sandbox request"
        );

        let response = self
            .client
            .request(method.clone(), target.url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::http(format!("{method} {requested}"), e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("reading body of {requested}"), e))?;

        debug!(original = %requested, status = status.as_u16(), "Sandbox response");

        Ok(SandboxResponse { requested, status, headers, body })
    }
}
