//! Configuration management for the scope engine
//!
//! This module provides a centralized configuration system that loads
//! settings from:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct for the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Inventory source configuration
    pub inventory: InventoryConfig,
    /// Wizard policy configuration
    pub wizard: WizardPolicyConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Inventory source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Optional TOML fixture describing the inventory; the built-in demo
    /// dataset is used when unset
    pub fixture: Option<PathBuf>,
}

/// Wizard policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardPolicyConfig {
    /// Switch granularity back to full access when a cluster change leaves
    /// no common project (matches the console's historical behavior)
    pub auto_full_access_fallback: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inventory: InventoryConfig::default(),
            wizard: WizardPolicyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self { fixture: None }
    }
}

impl Default for WizardPolicyConfig {
    fn default() -> Self {
        Self {
            auto_full_access_fallback: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables and optional config file
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(config_path) = Self::find_config_file() {
            if let Ok(file_config) = Self::load_from_file(&config_path) {
                config = file_config;
            }
        }

        config.apply_env_overrides();
        config
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.clone(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            // Environment variable override
            std::env::var("ALOHOMORA_CONFIG").ok().map(PathBuf::from),
            // Standard locations
            Some(PathBuf::from("/etc/alohomora/config.toml")),
            Some(PathBuf::from("./alohomora.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("ALOHOMORA_INVENTORY_FIXTURE") {
            self.inventory.fixture = Some(PathBuf::from(path));
        }
        if let Ok(fallback) = std::env::var("ALOHOMORA_AUTO_FULL_ACCESS_FALLBACK") {
            self.wizard.auto_full_access_fallback = fallback.parse().unwrap_or(true);
        }
        if let Ok(level) = std::env::var("ALOHOMORA_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level: {}",
                self.logging.level
            )));
        }

        if let Some(fixture) = &self.inventory.fixture {
            if fixture.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "Inventory fixture path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Failed to read configuration file
    FileRead(PathBuf, String),
    /// Failed to parse configuration
    Parse(String),
    /// Configuration validation failed
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, err) => {
                write!(f, "Failed to read config file {:?}: {}", path, err)
            }
            ConfigError::Parse(err) => write!(f, "Failed to parse config: {}", err),
            ConfigError::Validation(err) => write!(f, "Config validation failed: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.inventory.fixture.is_none());
        assert!(config.wizard.auto_full_access_fallback);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_validation() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid = EngineConfig::default();
        invalid.logging.level = "loud".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = EngineConfig::default();
        invalid.inventory.fixture = Some(PathBuf::new());
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = EngineConfig::generate_sample();
        assert!(sample.contains("[inventory]"));
        assert!(sample.contains("[wizard]"));
        assert!(sample.contains("[logging]"));
        assert!(sample.contains("auto_full_access_fallback"));
    }

    #[test]
    fn test_parse_partial_file() {
        let config: EngineConfig = toml::from_str(
            r#"
            [inventory]

            [wizard]
            auto_full_access_fallback = false

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert!(!config.wizard.auto_full_access_fallback);
        assert_eq!(config.logging.level, "debug");
    }
}
