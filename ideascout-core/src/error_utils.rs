use crate::error::*;
use std::time::Duration;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Platform(e) => {
                error!("Platform error details: {:?}", e);
            }
            CoreError::Cache(e) => {
                error!("Cache error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Platform(e) => e.is_retryable(),
            CoreError::Cache(e) => e.is_retryable(),
            CoreError::Network(e) => e.is_timeout() || e.is_connect(),
            CoreError::Timeout { .. } => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::Platform(e) => e.retry_after(),
            CoreError::Timeout { seconds } => Some(Duration::from_secs(*seconds)),
            _ if self.is_retryable() => Some(Duration::from_secs(5)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Platform(e) => e.user_friendly_message(),
            CoreError::Cache(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { message } => message.clone(),
            CoreError::Timeout { seconds } => format!(
                "Fetching took longer than {} seconds. Please try again.",
                seconds
            ),
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Platform(_) => "PLATFORM".to_string(),
            CoreError::Cache(_) => "CACHE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Timeout { .. } => "TIMEOUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for PlatformError {
    fn log_error(&self) -> &Self {
        error!("PlatformError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("PlatformError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            PlatformError::RateLimitExceeded { .. } => true,
            PlatformError::RequestTimeout { .. } => true,
            PlatformError::ServerError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            PlatformError::RateLimitExceeded { retry_after, .. } => {
                Some(Duration::from_secs(*retry_after))
            }
            _ if self.is_retryable() => Some(Duration::from_secs(2)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            PlatformError::Unauthorized { platform } => format!(
                "{} rejected the configured credentials. Please check your settings.",
                platform.display_name()
            ),
            PlatformError::RateLimitExceeded {
                platform,
                retry_after,
            } => format!(
                "{} is rate limiting requests. Please wait {} seconds.",
                platform.display_name(),
                retry_after
            ),
            PlatformError::SourceNotFound {
                platform,
                source_name,
            } => format!(
                "{} source '{}' not found or is private.",
                platform.display_name(),
                source_name
            ),
            PlatformError::RequestTimeout { platform } => format!(
                "Request to {} timed out. Please try again.",
                platform.display_name()
            ),
            PlatformError::NoFetcher { platform } => format!(
                "{} is enabled but no fetcher is available for it.",
                platform.display_name()
            ),
            other => format!("{} error: {}", other.platform().display_name(), other),
        }
    }

    fn error_code(&self) -> String {
        match self {
            PlatformError::Unauthorized { .. } => "PLATFORM_UNAUTHORIZED".to_string(),
            PlatformError::RateLimitExceeded { .. } => "PLATFORM_RATE_LIMIT".to_string(),
            PlatformError::Forbidden { .. } => "PLATFORM_FORBIDDEN".to_string(),
            PlatformError::SourceNotFound { .. } => "PLATFORM_SOURCE_NOT_FOUND".to_string(),
            PlatformError::RequestTimeout { .. } => "PLATFORM_TIMEOUT".to_string(),
            PlatformError::InvalidResponse { .. } => "PLATFORM_INVALID_RESPONSE".to_string(),
            PlatformError::ServerError { .. } => "PLATFORM_SERVER_ERROR".to_string(),
            PlatformError::AllSourcesFailed { .. } => "PLATFORM_ALL_SOURCES_FAILED".to_string(),
            PlatformError::NoFetcher { .. } => "PLATFORM_NO_FETCHER".to_string(),
            PlatformError::TaskAborted { .. } => "PLATFORM_TASK_ABORTED".to_string(),
        }
    }
}

impl PlatformError {
    pub fn platform(&self) -> crate::types::Platform {
        match self {
            PlatformError::Unauthorized { platform }
            | PlatformError::RateLimitExceeded { platform, .. }
            | PlatformError::Forbidden { platform, .. }
            | PlatformError::SourceNotFound { platform, .. }
            | PlatformError::RequestTimeout { platform }
            | PlatformError::InvalidResponse { platform, .. }
            | PlatformError::ServerError { platform, .. }
            | PlatformError::AllSourcesFailed { platform, .. }
            | PlatformError::NoFetcher { platform }
            | PlatformError::TaskAborted { platform, .. } => *platform,
        }
    }
}

impl ErrorExt for CacheError {
    fn log_error(&self) -> &Self {
        error!("CacheError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CacheError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            CacheError::DatabaseLocked | CacheError::ConnectionFailed { .. }
        )
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CacheError::DatabaseLocked => Some(Duration::from_millis(100)),
            _ if self.is_retryable() => Some(Duration::from_secs(1)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CacheError::ConnectionFailed { .. } => {
                "Could not open the idea cache. Please try again.".to_string()
            }
            CacheError::DatabaseLocked => "The idea cache is temporarily busy.".to_string(),
            CacheError::CorruptPayload { .. } => {
                "Cached data was unreadable and has been ignored.".to_string()
            }
            _ => "Idea cache error occurred. Please try again.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CacheError::ConnectionFailed { .. } => "CACHE_CONNECTION_FAILED".to_string(),
            CacheError::MigrationFailed { .. } => "CACHE_MIGRATION_FAILED".to_string(),
            CacheError::CorruptPayload { .. } => "CACHE_CORRUPT".to_string(),
            CacheError::DatabaseLocked => "CACHE_LOCKED".to_string(),
            CacheError::Sql(_) => "CACHE_SQL_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false // needs user intervention
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::NoPlatformsEnabled => {
                "No platform is enabled. Enable Reddit or Twitter in settings first.".to_string()
            }
            ConfigError::MissingField { field } => {
                format!("Required configuration field '{}' is missing.", field)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::Parse(_) => {
                "Configuration file format is invalid. Please check the settings.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::NoPlatformsEnabled => "CONFIG_NO_PLATFORMS".to_string(),
            ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
            if let Some(retry_after) = error.retry_after() {
                info!("Error is retryable. Retry after: {:?}", retry_after);
            }
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
