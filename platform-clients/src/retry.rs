use ideascout_core::{CoreError, ErrorExt, PlatformError};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 15000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff
    Retry,
    /// Retry after the delay the server asked for
    RetryWithDelay(Duration),
    /// Permanent failure
    NoRetry,
}

pub fn get_retry_strategy(error: &CoreError) -> RetryStrategy {
    match error {
        CoreError::Platform(PlatformError::RateLimitExceeded { retry_after, .. }) => {
            RetryStrategy::RetryWithDelay(Duration::from_secs(*retry_after))
        }
        _ if error.is_retryable() => RetryStrategy::Retry,
        _ => RetryStrategy::NoRetry,
    }
}

/// Exponential backoff with jitter, capped at `max_delay_ms`.
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let max_delay = Duration::from_millis(config.max_delay_ms);
    let multiplier = config.backoff_multiplier.powi(attempt as i32);
    let delay_ms = ((config.base_delay_ms as f64 * multiplier) as u64).min(config.max_delay_ms);
    let exponential_delay = Duration::from_millis(delay_ms);

    let jitter_range = (delay_ms as f64 * config.jitter_factor) as u64;
    let jitter = fastrand::u64(0..=jitter_range);

    (exponential_delay + Duration::from_millis(jitter)).min(max_delay)
}

/// Runs `operation` until it succeeds, fails permanently, or attempts run out.
/// The last error is returned unchanged.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T, CoreError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(error) => {
                attempt += 1;
                if attempt >= config.max_attempts {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name, attempt, error
                    );
                    return Err(error);
                }

                let delay = match get_retry_strategy(&error) {
                    RetryStrategy::NoRetry => {
                        debug!("Not retrying {}: {}", operation_name, error);
                        return Err(error);
                    }
                    RetryStrategy::RetryWithDelay(delay) => {
                        delay.min(Duration::from_millis(config.max_delay_ms))
                    }
                    RetryStrategy::Retry => calculate_delay(attempt - 1, config),
                };

                info!(
                    "Retrying {} in {:?} (attempt {}/{}) due to: {}",
                    operation_name,
                    delay,
                    attempt + 1,
                    config.max_attempts,
                    error
                );
                sleep(delay).await;
            }
        }
    }
}
