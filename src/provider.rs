//! Provider endpoint configuration
//!
//! Bundles the authorization endpoint, token endpoint, and redirect target
//! for one identity provider. The redirect defaults to the out-of-band
//! sentinel since this crate only drives the copy-paste flow.

use serde::{Deserialize, Serialize};

use crate::constants::{OOB_REDIRECT_URI, YAHOO_AUTHORIZE_ENDPOINT, YAHOO_TOKEN_ENDPOINT};

/// Endpoint metadata for one OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Authorization endpoint the user's browser is sent to
    pub auth_url: String,
    /// Token endpoint for code exchange and refresh
    pub token_url: String,
    /// Redirect target embedded in both requests
    #[serde(default = "default_redirect")]
    pub redirect_url: String,
}

fn default_redirect() -> String {
    OOB_REDIRECT_URI.to_string()
}

impl ProviderConfig {
    /// Config for an arbitrary provider, with the oob redirect.
    pub fn new(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
            redirect_url: default_redirect(),
        }
    }

    /// Yahoo's static endpoints.
    pub fn yahoo() -> Self {
        Self::new(YAHOO_AUTHORIZE_ENDPOINT, YAHOO_TOKEN_ENDPOINT)
    }

    /// Build the full authorization URL for the given client.
    ///
    /// The `state` parameter is embedded empty: it exists for CSRF protection
    /// on redirect-capable clients, and the oob flow has no callback to
    /// protect. No network call, no side effects.
    pub fn authorization_url(&self, client_id: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&state=",
            self.auth_url,
            urlencoded(client_id),
            urlencoded(&self.redirect_url),
        )
    }
}

/// Minimal URL encoding for parameter values.
/// Only encodes characters that would break URL parameter parsing.
fn urlencoded(s: &str) -> String {
    s.replace(' ', "%20")
        .replace(':', "%3A")
        .replace('/', "%2F")
        .replace('&', "%26")
}
