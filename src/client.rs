//! Authenticated HTTP client
//!
//! Wraps a reqwest client with the bundle's credentials and current token.
//! Every request goes out with `Authorization: Bearer <access token>`; when
//! the access token has expired and a refresh token is on hand, the token is
//! refreshed at the provider first. The token sits behind a tokio mutex so a
//! caller sharing the client across tasks gets exactly one refresh.

use reqwest::Method;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::provider::ProviderConfig;
use crate::token::{self, Token};

/// HTTP client pre-wired with a bearer token and transparent refresh.
///
/// Built by [`crate::CredentialManager::authenticated_client`]; reusable for
/// any number of subsequent requests.
#[derive(Debug)]
pub struct AuthenticatedClient {
    http: reqwest::Client,
    provider: ProviderConfig,
    client_id: String,
    client_secret: String,
    token: Mutex<Token>,
}

impl AuthenticatedClient {
    pub(crate) fn new(
        provider: ProviderConfig,
        client_id: String,
        client_secret: String,
        token: Token,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider,
            client_id,
            client_secret,
            token: Mutex::new(token),
        }
    }

    /// A valid bearer token, refreshing first if the current one is expired.
    ///
    /// An expired token with no refresh token fails with [`Error::Exchange`]
    /// without touching the network; the caller has to re-run the
    /// authorization flow.
    pub async fn bearer_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if token.is_expired() {
            let refresh = token.refresh_token.clone().ok_or_else(|| {
                Error::Exchange("access token expired and no refresh token available".into())
            })?;

            debug!(client_id = %self.client_id, "access token expired, refreshing");
            let response = token::refresh_token(
                &self.http,
                &self.provider,
                &self.client_id,
                &self.client_secret,
                &refresh,
            )
            .await?;

            let mut refreshed = Token::from_response(response);
            // Providers may omit the refresh token on refresh; keep the old one.
            if refreshed.refresh_token.is_none() {
                refreshed.refresh_token = Some(refresh);
            }
            *token = refreshed;
        }

        Ok(token.access_token.clone())
    }

    /// A request builder with the bearer token already attached.
    pub async fn request(&self, method: Method, url: &str) -> Result<reqwest::RequestBuilder> {
        let bearer = self.bearer_token().await?;
        Ok(self.http.request(method, url).bearer_auth(bearer))
    }

    /// Send an authenticated GET.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.request(Method::GET, url)
            .await?
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {url} failed: {e}")))
    }

    /// Snapshot of the current token, including any refresh that has
    /// happened since construction. Callers that want the refreshed token
    /// back on disk write it into their bundle and save.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(token: Token) -> AuthenticatedClient {
        AuthenticatedClient::new(
            ProviderConfig::yahoo(),
            "id123".into(),
            "secretXYZ".into(),
            token,
        )
    }

    fn valid_token() -> Token {
        Token {
            access_token: "tok_abc".into(),
            refresh_token: Some("rt_abc".into()),
            token_type: "Bearer".into(),
            expires_at: 4_102_444_800_000,
        }
    }

    #[tokio::test]
    async fn bearer_token_returns_unexpired_token_without_network() {
        let client = client_with(valid_token());
        assert_eq!(client.bearer_token().await.unwrap(), "tok_abc");
    }

    #[tokio::test]
    async fn request_attaches_authorization_header() {
        let client = client_with(valid_token());
        let request = client
            .request(Method::GET, "https://example.test/resource")
            .await
            .unwrap()
            .build()
            .unwrap();

        let header = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .expect("Authorization header must be set");
        assert_eq!(header.to_str().unwrap(), "Bearer tok_abc");
    }

    #[tokio::test]
    async fn expired_token_without_refresh_fails_offline() {
        let client = client_with(Token {
            access_token: "tok_old".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_at: 1_000,
        });

        let err = client.bearer_token().await.unwrap_err();
        assert!(matches!(err, Error::Exchange(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn token_snapshot_matches_construction() {
        let client = client_with(valid_token());
        assert_eq!(client.token().await, valid_token());
    }
}
