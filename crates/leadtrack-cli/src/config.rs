//! Configuration management for Leadtrack CLI
//!
//! Stores connection and reporting settings in ~/.config/leadtrack/config.toml.
//! `DATABASE_URL` and `LEADTRACK_LOG` from the environment (or `.env`) take
//! precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use leadtrack::InterestPolicy;

const CONFIG_DIR: &str = "leadtrack";
const CONFIG_FILE: &str = "config.toml";

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const LOG_ENV: &str = "LEADTRACK_LOG";

/// Tag that marks a call as showing interest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterestTag {
    pub name: String,
    pub values: Vec<String>,
}

impl Default for InterestTag {
    fn default() -> Self {
        let policy = InterestPolicy::default();
        Self {
            name: policy.tag_name,
            values: policy.values,
        }
    }
}

/// CLI Configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub log_level: String,
    pub max_connections: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub remaining_threshold: i64,
    pub recent_packages: usize,
    pub trend_days: u32,
    pub interest_tag: InterestTag,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            log_level: "info".to_string(),
            max_connections: 5,
            default_page_size: 20,
            max_page_size: 100,
            remaining_threshold: 1000,
            recent_packages: 10,
            trend_days: 7,
            interest_tag: InterestTag::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file (or defaults), then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };

        config.apply_overrides(
            std::env::var(DATABASE_URL_ENV).ok(),
            std::env::var(LOG_ENV).ok(),
        );

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    fn apply_overrides(&mut self, database_url: Option<String>, log_level: Option<String>) {
        if let Some(url) = database_url.filter(|u| !u.is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(level) = log_level.filter(|l| !l.is_empty()) {
            self.log_level = level;
        }
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url.as_deref().with_context(|| {
            format!(
                "No database configured. Set {} or database_url in {}",
                DATABASE_URL_ENV, CONFIG_FILE
            )
        })
    }

    pub fn interest_policy(&self) -> InterestPolicy {
        InterestPolicy::new(
            self.interest_tag.name.clone(),
            self.interest_tag.values.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            database_url = "postgres://localhost/leads"
            max_page_size = 50

            [interest_tag]
            name = "intent"
            values = ["high", "medium"]
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/leads"));
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.remaining_threshold, 1000);
        assert_eq!(config.interest_policy().tag_name, "intent");
        assert_eq!(config.interest_policy().values.len(), 2);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut config = Config::from_toml(r#"database_url = "postgres://file/db""#).unwrap();
        config.apply_overrides(Some("postgres://env/db".into()), Some("debug".into()));

        assert_eq!(config.database_url().unwrap(), "postgres://env/db");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(Some(String::new()), None);
        assert!(config.database_url().is_err());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
