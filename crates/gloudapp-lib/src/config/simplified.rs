use std::path::PathBuf;
use std::sync::OnceLock;

/// Immutable process configuration initialized once at startup from environment variables.
///
/// Access via `SimplifiedConfig::get()` which returns a `&'static SimplifiedConfig`.
/// The singleton is lazily initialized on first access using `OnceLock`.
pub struct SimplifiedConfig {
    /// Directory holding `config.json`, e.g. `~/.gloudapp`.
    pub config_dir: PathBuf,
    /// Persisted username/password pair, e.g. `~/.config/gloudapp/credentials.json`.
    pub credentials_file: PathBuf,
    /// `GLOUDAPP_API_BASE`, overriding the configured API endpoint when set.
    pub api_base_override: Option<String>,
}

static CONFIG: OnceLock<SimplifiedConfig> = OnceLock::new();

impl SimplifiedConfig {
    /// Returns a reference to the global `SimplifiedConfig` singleton.
    /// Initializes from environment variables on first call.
    pub fn get() -> &'static SimplifiedConfig {
        CONFIG.get_or_init(SimplifiedConfig::from_env)
    }

    fn from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        Self::for_home(
            PathBuf::from(home),
            std::env::var("GLOUDAPP_API_BASE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        )
    }

    /// Derives every per-user path from `home_dir`.
    pub fn for_home(home_dir: PathBuf, api_base_override: Option<String>) -> Self {
        Self {
            config_dir: home_dir.join(".gloudapp"),
            credentials_file: home_dir
                .join(".config")
                .join("gloudapp")
                .join("credentials.json"),
            api_base_override,
        }
    }
}
