use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::platform::default_capture_command;

/// User-tunable settings persisted as `config.json`.
///
/// Missing keys fall back to their defaults so older files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[serde(rename = "apiBase")]
    pub api_base: String,
    /// Host used for drop URLs when the account has no custom domain.
    #[serde(rename = "defaultDomain")]
    pub default_domain: String,
    /// Request timeout in seconds.
    pub timeout: u32,
    #[serde(rename = "connectTimeout")]
    pub connect_timeout: u32,
    #[serde(rename = "screenshotDir")]
    pub screenshot_dir: PathBuf,
    #[serde(rename = "screenshotTimeFormat")]
    pub screenshot_time_format: String,
    /// Program and leading arguments; the target path is appended last.
    #[serde(rename = "captureCommand")]
    pub capture_command: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "https://my.cl.ly".into(),
            default_domain: "cl.ly".into(),
            timeout: 120,
            connect_timeout: 10,
            screenshot_dir: PathBuf::from("/tmp"),
            screenshot_time_format: "%d%m%y-%H%M%S".into(),
            capture_command: default_capture_command(),
        }
    }
}
