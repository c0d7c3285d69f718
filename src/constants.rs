//! Yahoo OAuth constants
//!
//! Static endpoint metadata for Yahoo's identity provider. These values are
//! not secrets — the actual secrets (client secret, access/refresh tokens)
//! live in the credential bundle.

/// Authorization endpoint the user's browser is sent to
pub const YAHOO_AUTHORIZE_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/request_auth";

/// Token endpoint for code exchange and token refresh
pub const YAHOO_TOKEN_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/get_token";

/// Out-of-band redirect sentinel. Yahoo displays the authorization code on a
/// page for manual copy-paste instead of redirecting, which is the only
/// workable shape for a CLI with no callback listener.
pub const OOB_REDIRECT_URI: &str = "oob";
