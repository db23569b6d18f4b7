//! CLI configuration management.
//!
//! Values come from environment variables (a `.env` file is honoured), then
//! the JSON config file, then built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interface the HTTP service binds to.
    pub host: String,

    /// Port the HTTP service listens on.
    pub port: u16,

    /// Default page size for paginated listings.
    pub page_size: usize,

    /// Neighbourhood depth used when sampling graphs and hypergraphs.
    pub sample_hops: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            page_size: 30,
            sample_hops: 2,
        }
    }
}

/// Keys accepted by `config get` / `config set`.
pub const KEYS: &[&str] = &["host", "port", "page-size", "sample-hops"];

impl Config {
    /// Load configuration from environment variables and config file.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = Self::from_file()?;

        // Environment takes precedence over the file
        if let Ok(host) = std::env::var("ONTOSIGHT_HOST") {
            config.host = host;
        }
        if let Some(port) = env_number("ONTOSIGHT_PORT") {
            config.port = port;
        }
        if let Some(page_size) = env_number("ONTOSIGHT_PAGE_SIZE") {
            config.page_size = page_size;
        }
        if let Some(hops) = env_number("ONTOSIGHT_SAMPLE_HOPS") {
            config.sample_hops = hops;
        }

        Ok(config)
    }

    /// Configuration stored in the config file only, or defaults.
    pub fn from_file() -> Result<Self> {
        let Some(config_path) = Self::config_file_path() else {
            return Ok(Self::default());
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
        serde_json::from_str(&contents).with_context(|| "Failed to parse config file")
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "ontosight", "ontosight")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Read a value by its CLI key.
    pub fn get(&self, key: &str) -> Result<String> {
        Ok(match key {
            "host" => self.host.clone(),
            "port" => self.port.to_string(),
            "page-size" | "page_size" => self.page_size.to_string(),
            "sample-hops" | "sample_hops" | "hops" => self.sample_hops.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                KEYS.join(", ")
            ),
        })
    }

    /// Update a value by its CLI key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || format!("Invalid value for {key}: {value}");
        match key {
            "host" => self.host = value.to_string(),
            "port" => self.port = value.parse().with_context(invalid)?,
            "page-size" | "page_size" => {
                let page_size: usize = value.parse().with_context(invalid)?;
                if page_size == 0 {
                    anyhow::bail!("page-size must be at least 1");
                }
                self.page_size = page_size;
            }
            "sample-hops" | "sample_hops" | "hops" => {
                self.sample_hops = value.parse().with_context(invalid)?
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring non-numeric environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.page_size, 30);
        assert_eq!(config.sample_hops, 2);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.page_size, 30);
    }

    #[test]
    fn test_get_and_set_by_key() {
        let mut config = Config::default();
        config.set("page-size", "12").unwrap();
        config.set("hops", "3").unwrap();
        assert_eq!(config.get("page_size").unwrap(), "12");
        assert_eq!(config.get("sample-hops").unwrap(), "3");
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("port", "eighty").is_err());
        assert!(config.set("page-size", "0").is_err());
        assert!(config.set("colour", "blue").is_err());
        assert_eq!(config, Config::default());
    }
}
