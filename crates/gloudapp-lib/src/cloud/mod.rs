pub mod cloudapp;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::errors::Result;

pub use cloudapp::CloudAppClient;

/// Account details returned by a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub email: Option<String>,
    /// Custom short-link domain; `None` means the service default.
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub subscribed: bool,
}

impl Account {
    /// The configured domain, ignoring blank values.
    pub fn domain_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.domain.as_deref().map(str::trim) {
            Some(domain) if !domain.is_empty() => domain,
            _ => fallback,
        }
    }
}

/// An uploaded item ("drop"), identified by its public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropItem {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

impl DropItem {
    /// Last path segment of the public URL.
    pub fn slug(&self) -> &str {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// The remote content host, as seen by the session and the upload pipeline.
///
/// Implementations keep the credentials handed to `authenticate` and use
/// them for every later call.
#[async_trait]
pub trait DropService: Send + Sync {
    /// Display name of the service (e.g. "CloudApp").
    fn name(&self) -> &str;

    /// Remember `credentials` for subsequent calls.
    async fn authenticate(&self, credentials: &Credentials) -> Result<()>;

    /// Confirm the account is reachable and usable with the current credentials.
    async fn validate(&self) -> Result<Account>;

    /// Upload the file at `path` and return the created drop.
    async fn upload(&self, path: &Path) -> Result<DropItem>;
}
