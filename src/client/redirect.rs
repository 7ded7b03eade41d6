//! Redirect targets returned by the outpost.

use url::Url;

use crate::errors::{Error, Result};
use crate::outpost::RETURN_DESTINATION_PARAM;

/// A parsed `Location` pointing at the outpost start endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRedirect {
    pub scheme: String,
    pub host: String,
    pub path: String,
    /// Decoded `rd` query parameter, when present
    pub return_destination: Option<String>,
}

impl StartRedirect {
    /// Parse `location`, resolving relative values against the request URL
    pub fn parse(location: &str, requested: &Url) -> Result<Self> {
        let target = requested.join(location).map_err(|e| Error::url(location, e))?;

        let return_destination = target
            .query_pairs()
            .find(|(key, _)| key == RETURN_DESTINATION_PARAM)
            .map(|(_, value)| value.into_owned());

        Ok(Self {
            scheme: target.scheme().to_string(),
            host: target.host_str().unwrap_or_default().to_string(),
            path: target.path().to_string(),
            return_destination,
        })
    }

    /// True when the return destination reconstructs `original` exactly
    pub fn returns_to(&self, original: &str) -> bool {
        self.return_destination.as_deref() == Some(original)
    }
}
