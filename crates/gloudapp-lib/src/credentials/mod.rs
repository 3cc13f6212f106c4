//! Persisted username/password pair.
//!
//! The store is a single JSON object with `username` and `password` keys at a
//! fixed per-user path. A missing, partial or unreadable file simply means
//! "no credentials available"; only writes can fail.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{GloudError, Result};
use crate::fileops;

/// A CloudApp login. Both fields are guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Returns `None` unless both fields are non-empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Option<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &mask_secret(&self.password))
            .finish()
    }
}

/// Mask a secret for display: show last 2 chars, mask the rest with asterisks.
/// If the secret is shorter than 6 chars, fully mask.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len < 6 {
        "*".repeat(len)
    } else {
        let tail: String = secret.chars().skip(len - 2).collect();
        format!("{}{}", "*".repeat(len - 2), tail)
    }
}

/// On-disk shape. Both keys are optional so partial files still parse.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

/// Reads and writes the persisted credential file.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored pair, or `None` when absent, partial or unreadable.
    pub fn load(&self) -> Option<Credentials> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No credential store");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to read credential store: {}", e);
                return None;
            }
        };

        let stored: StoredCredentials = match serde_json::from_str(&data) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring malformed credential store: {}", e);
                return None;
            }
        };

        let creds = Credentials::new(
            stored.username.unwrap_or_default(),
            stored.password.unwrap_or_default(),
        );
        if creds.is_none() {
            tracing::debug!(path = %self.path.display(), "Credential store is incomplete");
        }
        creds
    }

    /// Persist `creds`, replacing any previous pair. The file is owner-only.
    pub fn save(&self, creds: &Credentials) -> Result<()> {
        let stored = StoredCredentials {
            username: Some(creds.username.clone()),
            password: Some(creds.password.clone()),
        };
        let data = serde_json::to_string_pretty(&stored)?;
        fileops::write_private(&self.path, data.as_bytes()).map_err(|e| {
            GloudError::Config(format!(
                "Failed to write credentials to {}: {}",
                self.path.display(),
                e
            ))
        })?;
        tracing::info!(path = %self.path.display(), username = %creds.username, "Saved credentials");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> CredentialStore {
        CredentialStore::new(tmp.path().join("gloudapp/credentials.json"))
    }

    #[test]
    fn test_credentials_require_both_fields() {
        assert!(Credentials::new("alice", "secret").is_some());
        assert!(Credentials::new("", "secret").is_none());
        assert!(Credentials::new("alice", "").is_none());
    }

    #[test]
    fn test_debug_masks_password() {
        let creds = Credentials::new("alice", "hunter22").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("******22"));
    }

    #[test]
    fn test_mask_secret_short_is_fully_masked() {
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(store_in(&tmp).load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let creds = Credentials::new("alice", "secret").unwrap();
        store.save(&creds).unwrap();
        assert_eq!(store.load(), Some(creds));
    }

    #[test]
    fn test_partial_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"username": "alice"}"#).unwrap();
        assert!(store.load().is_none());

        std::fs::write(store.path(), r#"{"username": "alice", "password": ""}"#).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "username=alice").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{"username": "bob", "password": "pw123456", "domain": "x"}"#,
        )
        .unwrap();
        let creds = store.load().unwrap();
        assert_eq!(creds.username(), "bob");
        assert_eq!(creds.password(), "pw123456");
    }
}
