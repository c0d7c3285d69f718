//! Authorization flow orchestration
//!
//! `CredentialManager` composes the provider endpoints, the user interaction,
//! and the code exchanger, and drives the flow end to end:
//!
//! 1. Build the authorization URL and open it in the user's browser
//! 2. Block on stdin for the code the provider displayed
//! 3. Exchange the code for a token at the token endpoint
//! 4. Persist the bundle when it came from a file
//!
//! The flow is strictly sequential and runs once per process invocation.
//! Every collaborator error surfaces unchanged to the caller; nothing is
//! retried. The one exception is the post-acquisition rewrite in
//! [`CredentialManager::from_file`], which is logged and not propagated —
//! the freshly acquired token is still usable for this run.

use std::path::Path;

use tracing::{info, warn};

use crate::bundle::CredentialBundle;
use crate::client::AuthenticatedClient;
use crate::error::{Error, Result};
use crate::interaction::{ConsoleInteraction, Interaction};
use crate::provider::ProviderConfig;
use crate::token::{self, Token};

/// Turns an authorization code into a token.
///
/// Seam over the token endpoint round-trip so the flow driver can be tested
/// without network access.
pub trait Exchanger {
    fn exchange(
        &self,
        provider: &ProviderConfig,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> impl Future<Output = Result<Token>> + Send;
}

/// Production exchanger: POSTs to the provider's token endpoint.
#[derive(Debug, Clone, Default)]
pub struct HttpExchanger {
    http: reqwest::Client,
}

impl HttpExchanger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Exchanger for HttpExchanger {
    async fn exchange(
        &self,
        provider: &ProviderConfig,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<Token> {
        let response =
            token::exchange_code(&self.http, provider, client_id, client_secret, code).await?;
        Ok(Token::from_response(response))
    }
}

/// Orchestrates token acquisition and credential persistence.
pub struct CredentialManager<I = ConsoleInteraction, X = HttpExchanger> {
    provider: ProviderConfig,
    interaction: I,
    exchanger: X,
}

impl CredentialManager {
    /// Manager with the production browser/console interaction and HTTP
    /// exchanger.
    pub fn new(provider: ProviderConfig) -> Self {
        Self::with_collaborators(provider, ConsoleInteraction, HttpExchanger::new())
    }

    /// Manager wired to Yahoo's static endpoints.
    pub fn yahoo() -> Self {
        Self::new(ProviderConfig::yahoo())
    }
}

impl<I: Interaction, X: Exchanger> CredentialManager<I, X> {
    /// Manager with explicit collaborators. Production code wants
    /// [`CredentialManager::new`]; this is the injection point for stubs.
    pub fn with_collaborators(provider: ProviderConfig, interaction: I, exchanger: X) -> Self {
        Self {
            provider,
            interaction,
            exchanger,
        }
    }

    /// The provider endpoints this manager was built with.
    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Build a bundle from raw client credentials.
    ///
    /// Always runs a fresh acquisition (browser, prompt, exchange), even if
    /// the caller might already know a token. The returned bundle carries a
    /// populated token. Nothing is persisted; that is the caller's call.
    pub async fn from_credentials(
        &self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<CredentialBundle> {
        let mut bundle = CredentialBundle::new(client_id, client_secret);
        bundle.token = Some(
            self.acquire_token(&bundle.client_id, &bundle.client_secret)
                .await?,
        );
        Ok(bundle)
    }

    /// Build a bundle from the JSON file at `path`.
    ///
    /// A decode failure aborts before any acquisition. If the file already
    /// carries a token it is returned as-is, with no browser launch and no
    /// network activity — the fast path for repeated CLI invocations (expiry
    /// is left to the authenticated client's refresh). If the token is
    /// absent, an acquisition runs with the file's credentials and the whole
    /// bundle is rewritten to the same path before returning. A rewrite
    /// failure is logged at warn and not propagated: the acquired token is
    /// still valid for this run, and the next invocation re-acquires.
    pub async fn from_file(&self, path: impl AsRef<Path>) -> Result<CredentialBundle> {
        let path = path.as_ref();
        let mut bundle = CredentialBundle::load(path).await?;

        if bundle.token.is_some() {
            return Ok(bundle);
        }

        bundle.token = Some(
            self.acquire_token(&bundle.client_id, &bundle.client_secret)
                .await?,
        );

        if let Err(e) = bundle.save(path).await {
            warn!(path = %path.display(), error = %e, "failed to persist acquired token");
        }

        Ok(bundle)
    }

    /// Compose an HTTP client that attaches the bundle's bearer token and
    /// refreshes it transparently when expired.
    ///
    /// Fails only when the bundle has no token.
    pub fn authenticated_client(&self, bundle: &CredentialBundle) -> Result<AuthenticatedClient> {
        let token = bundle.token.clone().ok_or(Error::MissingToken)?;
        Ok(AuthenticatedClient::new(
            self.provider.clone(),
            bundle.client_id.clone(),
            bundle.client_secret.clone(),
            token,
        ))
    }

    /// Run one acquisition: browser, prompt, exchange.
    ///
    /// The pasted code is trimmed of surrounding whitespace before the
    /// exchange; providers do not reliably tolerate a trailing newline in
    /// the code parameter.
    async fn acquire_token(&self, client_id: &str, client_secret: &str) -> Result<Token> {
        let url = self.provider.authorization_url(client_id);
        self.interaction.present_authorization(&url)?;

        let raw = self.interaction.prompt_for_code()?;
        let code = raw.trim();

        let token = self
            .exchanger
            .exchange(&self.provider, client_id, client_secret, code)
            .await?;
        info!(client_id, "acquired token");
        Ok(token)
    }
}
