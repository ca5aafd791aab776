//! CLI configuration management

use crate::CliError;
use bytevault_core::StoreConfig;
use bytevault_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Identity used for writes and purges
    #[serde(default)]
    pub writer: Option<Address>,
    /// Default log filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Storage settings
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            writer: None,
            log_level: default_log_level(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".bytevault"))
    }

    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from `path`, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))?;
        config.store.validate()?;
        Ok(config)
    }

    /// Save config to `path`
    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data directory, falling back to `~/.bytevault/data`
    pub fn data_dir(&self) -> Result<PathBuf, CliError> {
        self.data_dir
            .clone()
            .or_else(|| Self::config_dir().map(|d| d.join("data")))
            .ok_or_else(|| CliError::Config("cannot determine data directory".to_string()))
    }

    /// Writer identity; write and purge need one
    pub fn writer(&self) -> Result<Address, CliError> {
        self.writer.ok_or_else(|| {
            CliError::Config("no writer address, pass --writer or set `writer` in the config".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytevault_core::FormatVersion;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.log_level, "warn");
        assert!(config.writer.is_none());
        assert_eq!(config.store, StoreConfig::default());
        assert!(config.writer().is_err());
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            data_dir = "/var/lib/bytevault"
            writer = "0x4242424242424242424242424242424242424242"
            log_level = "debug"

            [store]
            format = "v1"
            purge_replaced = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/bytevault")));
        assert_eq!(config.writer().unwrap(), Address::from_bytes([0x42; 20]));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.store.format, FormatVersion::V1);
        assert!(!config.store.purge_replaced);
        assert_eq!(config.store.max_code_size, StoreConfig::default().max_code_size);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            writer: Some(Address::from_bytes([0x07; 20])),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.writer, config.writer);
        assert_eq!(loaded.store, config.store);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_store_section_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\ncompression_level = 12\n").unwrap();
        assert!(matches!(Config::load(&path), Err(CliError::Storage(_))));
    }
}
