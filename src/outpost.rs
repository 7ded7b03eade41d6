//! Outpost paths and identity headers exposed by the forward-auth plugin.

/// Base path of every outpost endpoint
pub const BASE_PATH: &str = "/outpost.goauthentik.io";

/// Query parameter carrying the return destination of a login flow
pub const RETURN_DESTINATION_PARAM: &str = "rd";

/// Prefix of every identity header the outpost injects
pub const IDENTITY_HEADER_PREFIX: &str = "X-Authentik-";

/// Prefix of the user identity headers (`X-Authentik-Username`, ...)
pub const IDENTITY_USER_HEADER_PREFIX: &str = "X-Authentik-User";

/// Header echoed by the upstream once a session is propagated
pub const USERNAME_HEADER: &str = "X-Authentik-Username";

/// Forwarding header set by the routing layer
pub const FORWARDED_HOST_HEADER: &str = "X-Forwarded-Host";

/// Auth endpoints the outpost serves for other proxies
pub const AUTH_PROXIES: [&str; 4] = ["nginx", "traefik", "caddy", "envoy"];

/// Outpost endpoint below [`BASE_PATH`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    SignOut,
    Callback,
}

impl Endpoint {
    pub fn path(self) -> String {
        let name = match self {
            Endpoint::Start => "start",
            Endpoint::SignOut => "sign_out",
            Endpoint::Callback => "callback",
        };
        format!("{BASE_PATH}/{name}")
    }
}

/// `/outpost.goauthentik.io/auth/<proxy>`
pub fn auth_path(proxy: &str) -> String {
    format!("{BASE_PATH}/auth/{proxy}")
}

/// Echo line the upstream prints for a header, as in `X-Forwarded-Host: whoami.localhost`
pub fn echo_line(header: &str, value: &str) -> String {
    format!("{header}: {value}")
}
