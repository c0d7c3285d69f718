//! Credential bundle and JSON persistence
//!
//! One bundle holds the client credentials and, once the flow has run, the
//! token. It persists as a pretty-printed JSON file so it can be inspected
//! and diffed by hand. Writes go through a temp file + rename so a crash
//! mid-write never destroys a previously valid file. No cross-process
//! locking: the file is assumed to belong to a single CLI invocation at a
//! time, last writer wins.
//!
//! The canonical on-disk shape is the flat object
//! `{client_id, client_secret, token}`. An older revision persisted the
//! whole provider config instead; that nested shape is still decoded and is
//! migrated to the canonical shape on the next save.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::token::Token;

/// Client credentials for one application, plus the token once acquired.
///
/// `client_id` and `client_secret` are immutable for the bundle's lifetime;
/// only `token` is replaced, and only by a fresh exchange.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialBundle {
    pub client_id: String,
    pub client_secret: String,
    pub token: Option<Token>,
}

// The client secret stays out of Debug output and logs.
impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token", &self.token)
            .finish()
    }
}

impl CredentialBundle {
    /// A fresh bundle with no token. Unusable for authenticated requests
    /// until an acquisition populates `token`.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: None,
        }
    }

    /// Load a bundle from the JSON file at `path`.
    ///
    /// An absent `token` field decodes to `None`, not an error. Malformed
    /// JSON or missing credentials fail with [`Error::Decode`] before any
    /// acquisition is attempted.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Io(format!("reading credential file {}: {e}", path.display())))?;

        let on_disk: BundleOnDisk = serde_json::from_str(&contents).map_err(|e| {
            Error::Decode(format!("parsing credential file {}: {e}", path.display()))
        })?;

        let bundle = on_disk.into_bundle();
        debug!(
            path = %path.display(),
            has_token = bundle.token.is_some(),
            "loaded credential bundle"
        );
        Ok(bundle)
    }

    /// Persist the bundle to `path` as pretty-printed canonical JSON.
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// target, with 0600 permissions since the file holds secrets.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Decode(format!("serializing credential bundle: {e}")))?;

        let dir = path
            .parent()
            .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;
        let tmp_path = dir.join(format!(".credentials.tmp.{}", std::process::id()));

        tokio::fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp_path, perms)
                .await
                .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
        }

        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

        debug!(path = %path.display(), "persisted credential bundle");
        Ok(())
    }
}

/// The two historical on-disk shapes.
///
/// `Flat` is canonical. `Nested` is the revision that persisted the whole
/// provider config; its embedded endpoint URLs are dropped on load, since
/// endpoint metadata is process configuration rather than per-file state.
#[derive(Deserialize)]
#[serde(untagged)]
enum BundleOnDisk {
    Flat {
        client_id: String,
        client_secret: String,
        #[serde(default)]
        token: Option<Token>,
    },
    Nested {
        provider: StoredProvider,
        #[serde(default)]
        token: Option<Token>,
    },
}

/// Provider config as embedded in the legacy nested shape. The endpoint URL
/// keys the old revision wrote alongside these are ignored by the decoder.
#[derive(Deserialize)]
struct StoredProvider {
    client_id: String,
    client_secret: String,
}

impl BundleOnDisk {
    fn into_bundle(self) -> CredentialBundle {
        match self {
            BundleOnDisk::Flat {
                client_id,
                client_secret,
                token,
            } => CredentialBundle {
                client_id,
                client_secret,
                token,
            },
            BundleOnDisk::Nested { provider, token } => CredentialBundle {
                client_id: provider.client_id,
                client_secret: provider.client_secret,
                token,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_token() -> Token {
        Token {
            access_token: "at_test".into(),
            refresh_token: Some("rt_test".into()),
            token_type: "Bearer".into(),
            expires_at: 4_102_444_800_000,
        }
    }

    #[tokio::test]
    async fn roundtrip_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let bundle = CredentialBundle {
            client_id: "id123".into(),
            client_secret: "secretXYZ".into(),
            token: Some(test_token()),
        };
        bundle.save(&path).await.unwrap();

        let loaded = CredentialBundle::load(&path).await.unwrap();
        assert_eq!(loaded, bundle);
    }

    #[tokio::test]
    async fn absent_token_decodes_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        tokio::fs::write(&path, r#"{"client_id":"id","client_secret":"sec"}"#)
            .await
            .unwrap();

        let bundle = CredentialBundle::load(&path).await.unwrap();
        assert_eq!(bundle.client_id, "id");
        assert!(bundle.token.is_none());
    }

    #[tokio::test]
    async fn legacy_nested_shape_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let legacy = r#"{
            "provider": {
                "client_id": "legacy-id",
                "client_secret": "legacy-secret",
                "auth_url": "https://api.login.yahoo.com/oauth2/request_auth",
                "token_url": "https://api.login.yahoo.com/oauth2/get_token",
                "redirect_url": "oob"
            },
            "token": {
                "access_token": "at_legacy",
                "refresh_token": null,
                "token_type": "Bearer",
                "expires_at": 4102444800000
            }
        }"#;
        tokio::fs::write(&path, legacy).await.unwrap();

        let bundle = CredentialBundle::load(&path).await.unwrap();
        assert_eq!(bundle.client_id, "legacy-id");
        assert_eq!(bundle.client_secret, "legacy-secret");
        assert_eq!(bundle.token.unwrap().access_token, "at_legacy");
    }

    #[tokio::test]
    async fn legacy_shape_is_migrated_to_canonical_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let legacy =
            r#"{"provider":{"client_id":"id","client_secret":"sec"},"token":null}"#;
        tokio::fs::write(&path, legacy).await.unwrap();

        let bundle = CredentialBundle::load(&path).await.unwrap();
        bundle.save(&path).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(raw["client_id"], "id");
        assert!(raw.get("provider").is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        tokio::fs::write(&path, "not { json").await.unwrap();

        let err = CredentialBundle::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let err = CredentialBundle::load("/nonexistent/credentials.json")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn save_overwrites_prior_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        CredentialBundle::new("id", "sec").save(&path).await.unwrap();
        let mut updated = CredentialBundle::new("id", "sec");
        updated.token = Some(test_token());
        updated.save(&path).await.unwrap();

        let loaded = CredentialBundle::load(&path).await.unwrap();
        assert_eq!(loaded.token, Some(test_token()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        CredentialBundle::new("id", "sec").save(&path).await.unwrap();

        let metadata = tokio::fs::metadata(&path).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "credential file must be 0600, got {mode:o}");
    }

    #[test]
    fn debug_redacts_client_secret() {
        let bundle = CredentialBundle::new("id123", "very-secret");
        let debug = format!("{bundle:?}");
        assert!(!debug.contains("very-secret"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }
}
