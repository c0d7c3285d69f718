//! Token endpoint interactions
//!
//! Handles the two token endpoint round-trips:
//! 1. Authorization code exchange (completing the oob flow)
//! 2. Token refresh (request-time, when the access token has expired)
//!
//! Both POST a form to the provider's token endpoint with different grant
//! types. Provider rejections and malformed responses surface as
//! `Error::Exchange`; transport failures as `Error::Http`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::provider::ProviderConfig;

/// Refresh this long before the recorded expiry, to absorb clock skew and
/// request latency.
const EXPIRY_MARGIN_MILLIS: u64 = 60_000;

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time; it is converted
/// to an absolute unix-millisecond timestamp when stored as a [`Token`].
/// Yahoo omits `token_type` on some responses, so it defaults to `Bearer`.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// A stored token: what the credential bundle persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    /// Expiration as unix timestamp in milliseconds
    pub expires_at: u64,
}

impl Token {
    /// Convert a token endpoint response into the stored form, anchoring the
    /// relative `expires_in` to the current wall clock.
    pub fn from_response(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            expires_at: now_millis() + response.expires_in * 1000,
        }
    }

    /// Whether the access token is expired or inside the refresh margin.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= now_millis() + EXPIRY_MARGIN_MILLIS
    }
}

/// Current unix time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Exchange an authorization code for a token (completing the oob flow).
///
/// The code is whatever the user pasted back from the provider's
/// acknowledgement page. Invalid, expired, or already-consumed codes come
/// back as a non-success status and surface as `Error::Exchange`.
pub async fn exchange_code(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    client_id: &str,
    client_secret: &str,
    code: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&provider.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", &provider.redirect_url),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Exchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::Exchange(format!("invalid token response: {e}")))
}

/// Refresh an access token using a refresh token.
///
/// Called by [`AuthenticatedClient`](crate::AuthenticatedClient) when the
/// access token has expired and a refresh token is on hand.
pub async fn refresh_token(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    client_id: &str,
    client_secret: &str,
    refresh: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(&provider.token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", &provider.redirect_url),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Exchange(format!(
            "token refresh returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::Exchange(format!("invalid refresh response: {e}")))
}
