pub mod http;
pub mod reddit;
pub mod retry;
pub mod twitter;


use ideascout_core::{CoreResult, PlatformFetcher, RuntimeSettings};
use std::sync::Arc;
use std::time::Duration;

pub use reddit::RedditFetcher;
pub use retry::RetryConfig;
pub use twitter::TwitterFetcher;

/// One HTTP-backed fetcher per supported platform.
pub fn default_fetchers(settings: &RuntimeSettings) -> CoreResult<Vec<Arc<dyn PlatformFetcher>>> {
    let timeout = Duration::from_secs(settings.request_timeout_seconds);
    let reddit = RedditFetcher::new(&settings.user_agent, timeout)?;
    let twitter = TwitterFetcher::new(&settings.user_agent, timeout)?;
    Ok(vec![Arc::new(reddit), Arc::new(twitter)])
}
