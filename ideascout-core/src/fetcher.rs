use crate::error::CoreResult;
use crate::types::{Platform, PlatformConfig, RawPost};
use async_trait::async_trait;

/// Pulls raw posts from one platform.
///
/// Implementations may perform several sequential requests (one per
/// subreddit, one per page) and must be safe to run concurrently with other
/// platforms' fetchers. A failure is reported as a single error for the
/// whole platform.
#[async_trait]
pub trait PlatformFetcher: Send + Sync {
    fn platform(&self) -> Platform;

    async fn fetch(&self, config: &PlatformConfig) -> CoreResult<Vec<RawPost>>;
}
