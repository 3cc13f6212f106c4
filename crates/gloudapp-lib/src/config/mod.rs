pub mod dynamic;
pub mod manager;
pub mod simplified;

pub use dynamic::AppConfig;
pub use manager::ConfigManager;
pub use simplified::SimplifiedConfig;
