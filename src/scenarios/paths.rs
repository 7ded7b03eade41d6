//! Outpost path probes.
//!
//! Restricted endpoints are answered by the outpost itself; every other path
//! below the outpost prefix (including the auth endpoints meant for other
//! proxies) must fall through to 404.

use reqwest::StatusCode;

use crate::client::SandboxClient;
use crate::config::SandboxSettings;
use crate::errors::Result;
use crate::outpost::{auth_path, Endpoint, AUTH_PROXIES, BASE_PATH};

use super::expect_status;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpectation {
    pub path: String,
    pub status: StatusCode,
}

impl PathExpectation {
    pub fn new(path: impl Into<String>, status: StatusCode) -> Self {
        Self { path: path.into(), status }
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.status.as_u16(), self.path)
    }
}

pub fn restricted_paths() -> Vec<PathExpectation> {
    vec![
        PathExpectation::new(Endpoint::Start.path(), StatusCode::FOUND),
        PathExpectation::new(Endpoint::SignOut.path(), StatusCode::FOUND),
        PathExpectation::new(Endpoint::Callback.path(), StatusCode::BAD_REQUEST),
    ]
}

pub fn allowed_paths() -> Vec<PathExpectation> {
    std::iter::once(BASE_PATH.to_string())
        .chain(AUTH_PROXIES.iter().map(|proxy| auth_path(proxy)))
        .map(|path| PathExpectation::new(path, StatusCode::NOT_FOUND))
        .collect()
}

pub fn all_paths() -> Vec<PathExpectation> {
    let mut paths = restricted_paths();
    paths.extend(allowed_paths());
    paths
}

/// Request the path without following redirects and check its status
pub async fn probe_path(
    client: &SandboxClient,
    sandbox: &SandboxSettings,
    expectation: &PathExpectation,
) -> Result<()> {
    let url = sandbox.upstream(&expectation.path)?;
    let response = client.get(url.as_str()).await?;
    expect_status(&format!("GET {}", expectation.path), expectation.status, response.status)
}
