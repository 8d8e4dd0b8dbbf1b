use crate::types::Platform;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Operation timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Failure of a single platform's fetch. Isolated per platform by the orchestrator.
#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("{platform}: credentials rejected")]
    Unauthorized { platform: Platform },

    #[error("{platform}: rate limit exceeded, retry after {retry_after} seconds")]
    RateLimitExceeded { platform: Platform, retry_after: u64 },

    #[error("{platform}: access forbidden to {resource}")]
    Forbidden { platform: Platform, resource: String },

    #[error("{platform}: source not found: {source_name}")]
    SourceNotFound {
        platform: Platform,
        source_name: String,
    },

    #[error("{platform}: request timeout")]
    RequestTimeout { platform: Platform },

    #[error("{platform}: invalid API response: {details}")]
    InvalidResponse { platform: Platform, details: String },

    #[error("{platform}: server error {status_code}")]
    ServerError { platform: Platform, status_code: u16 },

    #[error("{platform}: every source failed ({failures} attempted)")]
    AllSourcesFailed { platform: Platform, failures: usize },

    #[error("{platform}: no fetcher registered")]
    NoFetcher { platform: Platform },

    #[error("{platform}: fetch task aborted: {reason}")]
    TaskAborted { platform: Platform, reason: String },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Migration failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("Corrupt payload under key {key}: {details}")]
    CorruptPayload { key: String, details: String },

    #[error("Database locked")]
    DatabaseLocked,

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No platform is enabled")]
    NoPlatformsEnabled,

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
