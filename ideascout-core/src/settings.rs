use crate::error::{ConfigError, CoreResult};
use crate::types::{AppConfig, Platform};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

pub const DATABASE_URL_ENV: &str = "IDEASCOUT_DATABASE_URL";
pub const TWITTER_BEARER_TOKEN_ENV: &str = "IDEASCOUT_TWITTER_BEARER_TOKEN";

/// Process-level settings read from `ideascout.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub database_url: String,
    pub user_agent: String,
    pub request_timeout_seconds: u64,
    pub scrape_timeout_seconds: u64,
    pub log_filter: String,
    /// Platform credentials handed to the conversation driver. When absent the
    /// stored configuration is used.
    pub platforms: Option<AppConfig>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://ideascout.db".to_string(),
            user_agent: format!("ideascout/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_seconds: 30,
            scrape_timeout_seconds: 120,
            log_filter: "ideascout=info,ingestion=info,conversation=info,platform_clients=info"
                .to_string(),
            platforms: None,
        }
    }
}

impl RuntimeSettings {
    pub fn from_toml_str(raw: &str) -> CoreResult<Self> {
        let settings: RuntimeSettings = toml::from_str(raw).map_err(ConfigError::from)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Missing file yields defaults; a malformed file is an error.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            info!(
                "No settings file at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        debug!("Loaded settings from {}", path.display());
        Self::from_toml_str(&raw)
    }

    /// Applies `IDEASCOUT_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.database_url = url;
        }
        if let Some(token) = lookup(TWITTER_BEARER_TOKEN_ENV).filter(|v| !v.is_empty()) {
            let platforms = self.platforms.get_or_insert_with(AppConfig::default);
            platforms
                .platform_mut(Platform::Twitter)
                .settings
                .insert("bearer_token".to_string(), token);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database_url".to_string(),
            });
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_seconds".to_string(),
                value: "0".to_string(),
            });
        }
        if self.scrape_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scrape_timeout_seconds".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
