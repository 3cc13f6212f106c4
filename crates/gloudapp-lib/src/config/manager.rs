use std::path::{Path, PathBuf};

use super::dynamic::AppConfig;
use crate::errors::{GloudError, Result};

/// How the startup configuration was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from an existing `config.json`.
    File,
    /// No file existed; one was written with defaults.
    Created,
    /// The file could not be read or parsed and was left untouched.
    Defaults,
}

/// Owner of the persisted `AppConfig`.
///
/// Lives in `~/.gloudapp/config.json` unless `--config-dir` says otherwise.
/// The file is read once at startup; edits take effect on the next start.
pub struct ConfigManager {
    current: AppConfig,
    path: PathBuf,
    origin: ConfigOrigin,
}

impl ConfigManager {
    /// Load `config.json` from `config_dir`, creating it when missing.
    pub async fn initialize(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join("config.json");
        let (current, origin) = load(&path).await;
        tracing::debug!(path = %path.display(), origin = ?origin, "Configuration ready");

        Ok(Self {
            current,
            path,
            origin,
        })
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.path
    }

    pub fn origin(&self) -> ConfigOrigin {
        self.origin
    }

    pub fn get_config(&self) -> &AppConfig {
        &self.current
    }
}

async fn load(path: &Path) -> (AppConfig, ConfigOrigin) {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let defaults = AppConfig::default();
            if let Err(e) = persist(path, &defaults).await {
                tracing::warn!(path = %path.display(), "Could not create default config: {}", e);
            }
            return (defaults, ConfigOrigin::Created);
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "Could not read config, using defaults: {}", e);
            return (AppConfig::default(), ConfigOrigin::Defaults);
        }
    };

    match serde_json::from_str::<AppConfig>(&contents) {
        Ok(config) => (config, ConfigOrigin::File),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Invalid config, using defaults: {}", e);
            (AppConfig::default(), ConfigOrigin::Defaults)
        }
    }
}

async fn persist(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| GloudError::Config(format!("Failed to create {}: {e}", dir.display())))?;
    }
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| GloudError::Config(format!("Failed to serialize config: {e}")))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| GloudError::Config(format!("Failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_created_with_defaults() {
        let tmp = TempDir::new().unwrap();
        let mgr = ConfigManager::initialize(&tmp.path().join("nested")).await.unwrap();

        assert_eq!(mgr.origin(), ConfigOrigin::Created);
        let on_disk: AppConfig =
            serde_json::from_str(&std::fs::read_to_string(mgr.config_path()).unwrap()).unwrap();
        assert_eq!(on_disk, AppConfig::default());
    }

    #[tokio::test]
    async fn test_existing_file_is_loaded() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.json"),
            r#"{"defaultDomain": "share.example.org", "screenshotDir": "/var/tmp"}"#,
        )
        .unwrap();

        let mgr = ConfigManager::initialize(tmp.path()).await.unwrap();
        let config = mgr.get_config();
        assert_eq!(mgr.origin(), ConfigOrigin::File);
        assert_eq!(config.default_domain, "share.example.org");
        assert_eq!(config.screenshot_dir, PathBuf::from("/var/tmp"));
        assert_eq!(config.api_base, "https://my.cl.ly");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_left_alone() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ half a config").unwrap();

        let mgr = ConfigManager::initialize(tmp.path()).await.unwrap();
        assert_eq!(mgr.origin(), ConfigOrigin::Defaults);
        assert_eq!(*mgr.get_config(), AppConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ half a config");
    }
}
