//! Error types for the authorization flow and credential persistence

/// Errors from the authorization flow and credential persistence.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("browser launch failed: {0}")]
    Browser(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("credential decode error: {0}")]
    Decode(String),

    #[error("credential bundle has no token; run the authorization flow first")]
    MissingToken,
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
