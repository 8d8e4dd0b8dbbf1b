use ideascout_core::{
    CacheError, ConfigError, CoreError, ErrorExt, ErrorReporter, Platform, PlatformError,
};
use std::time::Duration;

#[test]
fn test_error_codes() {
    let platform_error = CoreError::Platform(PlatformError::Unauthorized {
        platform: Platform::Reddit,
    });
    assert_eq!(platform_error.error_code(), "PLATFORM");

    let cache_error = CoreError::Cache(CacheError::DatabaseLocked);
    assert_eq!(cache_error.error_code(), "CACHE");

    let config_error = CoreError::Config(ConfigError::NoPlatformsEnabled);
    assert_eq!(config_error.error_code(), "CONFIG");

    let timeout_error = CoreError::Timeout { seconds: 120 };
    assert_eq!(timeout_error.error_code(), "TIMEOUT");
}

#[test]
fn test_retryable_errors() {
    let rate_limited = CoreError::Platform(PlatformError::RateLimitExceeded {
        platform: Platform::Twitter,
        retry_after: 60,
    });
    assert!(rate_limited.is_retryable());

    let server_error = CoreError::Platform(PlatformError::ServerError {
        platform: Platform::Reddit,
        status_code: 503,
    });
    assert!(server_error.is_retryable());

    let unauthorized = CoreError::Platform(PlatformError::Unauthorized {
        platform: Platform::Twitter,
    });
    assert!(!unauthorized.is_retryable());

    let no_platforms = CoreError::Config(ConfigError::NoPlatformsEnabled);
    assert!(!no_platforms.is_retryable());
}

#[test]
fn test_retry_after() {
    let rate_limited = CoreError::Platform(PlatformError::RateLimitExceeded {
        platform: Platform::Reddit,
        retry_after: 60,
    });
    assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));

    let timeout_error = CoreError::Timeout { seconds: 30 };
    assert_eq!(timeout_error.retry_after(), Some(Duration::from_secs(30)));

    let config_error = CoreError::Config(ConfigError::NoPlatformsEnabled);
    assert_eq!(config_error.retry_after(), None);
}

#[test]
fn test_user_friendly_messages() {
    let unauthorized = CoreError::Platform(PlatformError::Unauthorized {
        platform: Platform::Twitter,
    });
    assert!(unauthorized
        .user_friendly_message()
        .contains("Twitter rejected the configured credentials"));

    let missing = CoreError::Config(ConfigError::MissingField {
        field: "bearer_token".to_string(),
    });
    assert!(missing.user_friendly_message().contains("bearer_token"));

    let invalid = CoreError::InvalidInput {
        message: "Please provide a search term.".to_string(),
    };
    assert_eq!(invalid.user_friendly_message(), "Please provide a search term.");
}

#[test]
fn test_platform_error_display_names_platform() {
    let error = PlatformError::SourceNotFound {
        platform: Platform::Reddit,
        source_name: "nope".to_string(),
    };
    assert_eq!(error.to_string(), "reddit: source not found: nope");
    assert_eq!(error.platform(), Platform::Reddit);
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new()
        .with_error_reporting(true)
        .with_warning_reporting(true);
    let error = CoreError::Cache(CacheError::CorruptPayload {
        key: "ideas".to_string(),
        details: "expected value".to_string(),
    });

    reporter.report_error(&error);
    reporter.report_warning(&error);
}
