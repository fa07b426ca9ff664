//! Application configuration

use std::path::PathBuf;

use crate::client::ClientConfig;

const ENV_DATA_DIR: &str = "MOVIEVERSE_DATA_DIR";

/// Default directory for persisted records
const DEFAULT_DATA_DIR: &str = ".movieverse";

/// File inside the data directory holding every stored record
const STORAGE_FILE_NAME: &str = "storage.json";

/// Top-level configuration assembled once at start-up
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Metadata client settings
    pub client: ClientConfig,
    /// Directory holding the key-value store file
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl AppConfig {
    /// Read `MOVIEVERSE_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var(ENV_DATA_DIR)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            client: ClientConfig::from_env(),
            data_dir,
        }
    }

    /// Path of the JSON file backing the key-value store
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.data_dir, PathBuf::from(".movieverse"));
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_storage_path() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/movieverse"),
            ..AppConfig::default()
        };
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/movieverse/storage.json")
        );
    }
}
