//! OAuth2 authorization helper for Yahoo, built for CLIs.
//!
//! Drives the out-of-band authorization-code grant for a single user and
//! persists the resulting credentials as a JSON file, so the interactive
//! flow runs once instead of on every invocation.
//!
//! Credential flow:
//! 1. `CredentialManager::from_credentials()` (first run) or
//!    `CredentialManager::from_file()` (every run after)
//! 2. The user authorizes in their browser and pastes the displayed code
//!    back into the terminal
//! 3. The code is exchanged at the token endpoint for an access/refresh pair
//! 4. The bundle (client credentials + token) lands in the JSON file
//! 5. `CredentialManager::authenticated_client()` yields a client that
//!    attaches the bearer token and refreshes it transparently
//!
//! ```no_run
//! use yahoo_auth::CredentialManager;
//!
//! # async fn run() -> yahoo_auth::Result<()> {
//! let manager = CredentialManager::yahoo();
//! let bundle = manager.from_file("credentials.json").await?;
//! let client = manager.authenticated_client(&bundle)?;
//! let response = client.get("https://fantasysports.yahooapis.com/fantasy/v2/game/nfl").await?;
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod client;
pub mod constants;
pub mod error;
pub mod interaction;
pub mod manager;
pub mod provider;
pub mod token;

pub use bundle::CredentialBundle;
pub use client::AuthenticatedClient;
pub use constants::*;
pub use error::{Error, Result};
pub use interaction::{ConsoleInteraction, Interaction};
pub use manager::{CredentialManager, Exchanger, HttpExchanger};
pub use provider::ProviderConfig;
pub use token::{Token, TokenResponse};
