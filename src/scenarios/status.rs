//! Stateless status scenarios on fixed upstream paths.

use reqwest::StatusCode;
use tracing::debug;

use crate::client::SandboxClient;
use crate::config::SandboxSettings;
use crate::errors::Result;
use crate::outpost::{
    echo_line, Endpoint, FORWARDED_HOST_HEADER, IDENTITY_USER_HEADER_PREFIX,
};

use super::{expect_contains, expect_eq, expect_not_contains, expect_status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScenario {
    AllowIsPublic,
    DenyIsUnauthorized,
    LoginRedirectsToStart,
    SignOutRedirectsToStart,
    InvalidCallbackIsBadRequest,
}

impl StatusScenario {
    pub const ALL: [StatusScenario; 5] = [
        StatusScenario::AllowIsPublic,
        StatusScenario::DenyIsUnauthorized,
        StatusScenario::LoginRedirectsToStart,
        StatusScenario::SignOutRedirectsToStart,
        StatusScenario::InvalidCallbackIsBadRequest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatusScenario::AllowIsPublic => "allow_is_public",
            StatusScenario::DenyIsUnauthorized => "deny_is_unauthorized",
            StatusScenario::LoginRedirectsToStart => "login_redirects_to_start",
            StatusScenario::SignOutRedirectsToStart => "sign_out_redirects_to_start",
            StatusScenario::InvalidCallbackIsBadRequest => "invalid_callback_is_bad_request",
        }
    }

    pub async fn run(self, client: &SandboxClient, sandbox: &SandboxSettings) -> Result<()> {
        match self {
            StatusScenario::AllowIsPublic => allow_is_public(client, sandbox).await,
            StatusScenario::DenyIsUnauthorized => deny_is_unauthorized(client, sandbox).await,
            StatusScenario::LoginRedirectsToStart => login_redirects_to_start(client, sandbox).await,
            StatusScenario::SignOutRedirectsToStart => {
                sign_out_redirects_to_start(client, sandbox).await
            }
            StatusScenario::InvalidCallbackIsBadRequest => {
                invalid_callback_is_bad_request(client, sandbox).await
            }
        }
    }
}

/// `/allow` reaches the upstream with forwarding headers and no identity
pub async fn allow_is_public(client: &SandboxClient, sandbox: &SandboxSettings) -> Result<()> {
    let url = sandbox.upstream("/allow")?;
    let response = client.get(url.as_str()).await?;

    expect_status("GET /allow", StatusCode::OK, response.status)?;
    expect_contains(
        "upstream echo of /allow",
        &response.body,
        &echo_line(FORWARDED_HOST_HEADER, sandbox.virtual_host()),
    )?;
    expect_not_contains("upstream echo of /allow", &response.body, IDENTITY_USER_HEADER_PREFIX)
}

pub async fn deny_is_unauthorized(client: &SandboxClient, sandbox: &SandboxSettings) -> Result<()> {
    let url = sandbox.upstream("/deny")?;
    let response = client.get(url.as_str()).await?;
    expect_status("GET /deny", StatusCode::UNAUTHORIZED, response.status)
}

pub async fn login_redirects_to_start(client: &SandboxClient, sandbox: &SandboxSettings) -> Result<()> {
    expect_start_redirect(client, sandbox, "/login").await
}

pub async fn sign_out_redirects_to_start(
    client: &SandboxClient,
    sandbox: &SandboxSettings,
) -> Result<()> {
    expect_start_redirect(client, sandbox, &Endpoint::SignOut.path()).await
}

/// A callback without flow state is rejected
pub async fn invalid_callback_is_bad_request(
    client: &SandboxClient,
    sandbox: &SandboxSettings,
) -> Result<()> {
    let url = sandbox.upstream(&Endpoint::Callback.path())?;
    let response = client.get(url.as_str()).await?;
    expect_status("GET callback without flow state", StatusCode::BAD_REQUEST, response.status)
}

/// `path` answers 302 to the outpost start endpoint on the same virtual host,
/// with `rd` equal to the exact original URL.
pub async fn expect_start_redirect(
    client: &SandboxClient,
    sandbox: &SandboxSettings,
    path: &str,
) -> Result<()> {
    let url = sandbox.upstream(path)?;
    let response = client.get(url.as_str()).await?;
    let what = format!("GET {path}");

    expect_status(&what, StatusCode::FOUND, response.status)?;

    let redirect = response.start_redirect()?;
    debug!(path, location = ?response.location(), "Start redirect");

    expect_eq("redirect scheme", url.scheme(), redirect.scheme.as_str())?;
    expect_eq("redirect host", sandbox.virtual_host(), redirect.host.as_str())?;
    expect_eq("redirect path", Endpoint::Start.path().as_str(), redirect.path.as_str())?;
    expect_eq(
        "redirect rd parameter",
        url.as_str(),
        redirect.return_destination.as_deref().unwrap_or("<missing>"),
    )
}
