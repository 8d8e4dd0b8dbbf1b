use ideascout_core::{CoreError, CoreResult, Platform, PlatformError};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, error, warn};

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

pub fn build_client(user_agent: &str, timeout: Duration) -> CoreResult<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Maps non-success statuses onto [`PlatformError`]s.
pub fn check_status(platform: Platform, resource: &str, response: Response) -> CoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        debug!("{} request for {} returned {}", platform, resource, status);
        return Ok(response);
    }

    error!(
        "{} request for {} failed with status {}",
        platform, resource, status
    );

    let err = match status {
        StatusCode::UNAUTHORIZED => PlatformError::Unauthorized { platform },
        StatusCode::FORBIDDEN => PlatformError::Forbidden {
            platform,
            resource: resource.to_string(),
        },
        StatusCode::NOT_FOUND => PlatformError::SourceNotFound {
            platform,
            source_name: resource.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!("{} rate limited, retry after {} seconds", platform, retry_after);
            PlatformError::RateLimitExceeded {
                platform,
                retry_after,
            }
        }
        s if s.is_server_error() => PlatformError::ServerError {
            platform,
            status_code: s.as_u16(),
        },
        s => PlatformError::InvalidResponse {
            platform,
            details: format!("unexpected status {} for {}", s, resource),
        },
    };
    Err(err.into())
}

pub fn map_transport_error(platform: Platform, err: reqwest::Error) -> CoreError {
    if err.is_timeout() {
        CoreError::Platform(PlatformError::RequestTimeout { platform })
    } else {
        CoreError::Network(err)
    }
}

pub fn invalid_response(platform: Platform, details: impl Into<String>) -> CoreError {
    CoreError::Platform(PlatformError::InvalidResponse {
        platform,
        details: details.into(),
    })
}
