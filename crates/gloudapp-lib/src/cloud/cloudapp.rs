//! CloudApp REST binding.
//!
//! Validation reads `/account`; uploads ask `/items/new` for a signed upload
//! slot, post the file there as multipart form data, then follow the storage
//! service's redirect back to the API to fetch the created drop.
//!
//! The API authenticates with HTTP Digest: every API call is sent bare, and
//! a `401` carrying a Digest challenge is answered once with the stored
//! credentials.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use digest_auth::AuthContext;
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION, WWW_AUTHENTICATE};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Account, DropItem, DropService};
use crate::credentials::Credentials;
use crate::errors::{GloudError, Result};
use crate::http_client::HttpClient;

// ---------------------------------------------------------------------------
// Data models
// ---------------------------------------------------------------------------

/// Signed upload slot returned by `GET /items/new`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSlot {
    pub url: String,
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub max_upload_size: Option<u64>,
    #[serde(default)]
    pub uploads_remaining: Option<u64>,
}

impl UploadSlot {
    /// Form fields to send ahead of the file, stringified.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }

    /// Rejects uploads the service already told us it will refuse.
    pub fn check(&self, file_size: u64) -> Result<()> {
        if self.uploads_remaining == Some(0) {
            return Err(GloudError::UploadTransportFailure(
                "no uploads remaining on this CloudApp plan".into(),
            ));
        }
        if let Some(max) = self.max_upload_size {
            if file_size > max {
                return Err(GloudError::UploadTransportFailure(format!(
                    "file is {file_size} bytes, CloudApp accepts at most {max}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CloudAppClient
// ---------------------------------------------------------------------------

/// `DropService` backed by the CloudApp API using HTTP Digest auth.
pub struct CloudAppClient {
    http: HttpClient,
    api_base: String,
    credentials: tokio::sync::RwLock<Option<Credentials>>,
}

impl CloudAppClient {
    /// * `http` – shared HTTP client (must not follow redirects)
    /// * `api_base` – e.g. `https://my.cl.ly`
    pub fn new(http: HttpClient, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            credentials: tokio::sync::RwLock::new(None),
        }
    }

    /// Absolute URL of an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn current_credentials(&self) -> Result<Credentials> {
        self.credentials.read().await.clone().ok_or_else(|| {
            GloudError::Application("not logged in to CloudApp, call authenticate() first".into())
        })
    }

    /// Authenticated JSON GET.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let creds = self.current_credentials().await?;
        let client = self.http.client();

        let mut resp = client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(GloudError::Http)?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            let authorization = answer_challenge(&resp, &creds)?;
            tracing::debug!(url = %url, "Answering digest challenge");
            resp = client
                .get(url)
                .header(ACCEPT, "application/json")
                .header(AUTHORIZATION, authorization)
                .send()
                .await
                .map_err(GloudError::Http)?;
        }

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GloudError::Server {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }

        resp.json::<T>().await.map_err(GloudError::Http)
    }
}

/// `Authorization` value for the Digest challenge carried by `resp`.
///
/// A `401` without a usable challenge counts as rejected credentials.
fn answer_challenge(resp: &reqwest::Response, creds: &Credentials) -> Result<String> {
    let challenge = resp
        .headers()
        .get(WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| rejected("no authentication challenge"))?;
    digest_authorization(challenge, &request_uri(resp.url()), creds)
}

/// Digest response to `challenge` for a GET of `uri` (path and query).
fn digest_authorization(challenge: &str, uri: &str, creds: &Credentials) -> Result<String> {
    let mut prompt = digest_auth::parse(challenge)
        .map_err(|e| rejected(&format!("unsupported authentication challenge: {e}")))?;
    let context = AuthContext::new(creds.username(), creds.password(), uri);
    let answer = prompt
        .respond(&context)
        .map_err(|e| rejected(&format!("cannot answer authentication challenge: {e}")))?;
    Ok(answer.to_header_string())
}

fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn rejected(detail: &str) -> GloudError {
    tracing::debug!("Digest authentication not possible: {}", detail);
    GloudError::Server {
        status: StatusCode::UNAUTHORIZED.as_u16(),
        message: error_message(StatusCode::UNAUTHORIZED.as_u16(), detail),
    }
}

/// Human-readable message for a failed API response.
fn error_message(status: u16, body: &str) -> String {
    match status {
        401 => "invalid username or password".into(),
        _ if body.trim().is_empty() => format!("HTTP {status}"),
        _ => body.trim().chars().take(200).collect(),
    }
}

#[async_trait]
impl DropService for CloudAppClient {
    fn name(&self) -> &str {
        "CloudApp"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        *self.credentials.write().await = Some(credentials.clone());
        tracing::debug!(username = %credentials.username(), "Stored CloudApp credentials");
        Ok(())
    }

    async fn validate(&self) -> Result<Account> {
        let account: Account = self.get_json(&self.endpoint("account")).await?;
        tracing::debug!(email = ?account.email, domain = ?account.domain, "CloudApp account validated");
        Ok(account)
    }

    async fn upload(&self, path: &Path) -> Result<DropItem> {
        let slot: UploadSlot = self.get_json(&self.endpoint("items/new")).await?;

        let bytes = tokio::fs::read(path).await?;
        slot.check(bytes.len() as u64)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut form = Form::new();
        for (key, value) in slot.form_fields() {
            form = form.text(key, value);
        }
        form = form.part("file", Part::bytes(bytes).file_name(file_name.clone()));

        tracing::debug!(file = %file_name, target = %slot.url, "Posting file to upload slot");
        let resp = self
            .http
            .client()
            .post(&slot.url)
            .multipart(form)
            .send()
            .await
            .map_err(GloudError::Http)?;

        let status = resp.status();
        if status.is_redirection() {
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    GloudError::UploadTransportFailure("upload redirect without a location".into())
                })?;
            return self.get_json(&location).await;
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GloudError::Server {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }

        resp.json::<DropItem>().await.map_err(GloudError::Http)
    }
}
