//! The one `reqwest::Client` every CloudApp request goes through.
//!
//! Timeouts come from `AppConfig` as loaded at startup.

use std::time::Duration;

use crate::config::AppConfig;
use crate::errors::{GloudError, Result};

/// Sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("GloudApp/", env!("CARGO_PKG_VERSION"));

/// Cheap to clone; clones share the connection pool.
///
/// Redirects are never followed: an upload ends in a redirect from the
/// storage service that has to be re-issued with credentials attached.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(u64::from(config.timeout)))
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout)))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(GloudError::Http)?;
        tracing::debug!(
            timeout = config.timeout,
            connect_timeout = config.connect_timeout,
            "HTTP client ready"
        );
        Ok(Self { inner })
    }

    pub fn from_defaults() -> Result<Self> {
        Self::new(&AppConfig::default())
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeouts_still_build() {
        let config = AppConfig {
            timeout: 0,
            connect_timeout: 0,
            ..AppConfig::default()
        };
        assert!(HttpClient::new(&config).is_ok());
    }

    #[test]
    fn test_user_agent_names_the_app() {
        assert!(USER_AGENT.starts_with("GloudApp/"));
    }
}
