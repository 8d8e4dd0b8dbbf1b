use crate::http::{build_client, check_status, invalid_response, map_transport_error};
use crate::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ideascout_core::{
    CoreError, CoreResult, Platform, PlatformConfig, PlatformError, PlatformFetcher,
    PlatformMetrics, RawPost,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const REDDIT_BASE: &str = "https://www.reddit.com";
const DEFAULT_SORT: &str = "hot";
const DEFAULT_LIMIT: u32 = 25;
const MAX_LIMIT: u32 = 100;

pub const DEFAULT_SUBREDDITS: &[&str] = &[
    "SomebodyMakeThis",
    "AppIdeas",
    "SaaS",
    "Entrepreneur",
    "startups",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub permalink: String,
    pub created_utc: f64,
    #[serde(default)]
    pub ups: Option<i64>,
    #[serde(default)]
    pub num_comments: Option<u64>,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub link_flair_text: Option<String>,
}

impl RedditPostData {
    pub fn into_raw_post(self) -> RawPost {
        let created_at = DateTime::<Utc>::from_timestamp(self.created_utc as i64, 0)
            .unwrap_or_else(Utc::now);
        let labels = self
            .link_flair_text
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .into_iter()
            .collect();

        RawPost {
            id: self.id,
            source: format!("r/{}", self.subreddit),
            url: format!("{}{}", REDDIT_BASE, self.permalink),
            title: self.title,
            body: self.selftext,
            author: self.author,
            created_at,
            labels,
            metrics: PlatformMetrics::Reddit {
                upvotes: self.ups.map(|u| u.max(0) as u64),
                comments: self.num_comments,
            },
        }
    }
}

/// Reads public subreddit listings, one subreddit after another.
///
/// Settings: `subreddits` (comma separated), `sort` (hot/new/top/rising), `limit`.
#[derive(Debug, Clone)]
pub struct RedditFetcher {
    http: Client,
    base_url: Url,
    retry: RetryConfig,
}

impl RedditFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> CoreResult<Self> {
        let base_url = Url::parse(REDDIT_BASE).map_err(|e| CoreError::Internal {
            message: format!("invalid reddit base url: {e}"),
        })?;
        Ok(Self {
            http: build_client(user_agent, timeout)?,
            base_url,
            retry: RetryConfig::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn subreddits(config: &PlatformConfig) -> Vec<String> {
        let configured = config.list_setting("subreddits");
        if configured.is_empty() {
            DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect()
        } else {
            configured
                .into_iter()
                .map(|s| s.trim_start_matches("r/").to_string())
                .collect()
        }
    }

    pub fn listing_url(&self, subreddit: &str, sort: &str, limit: u32) -> CoreResult<Url> {
        let mut url = self
            .base_url
            .join(&format!("r/{}/{}.json", subreddit, sort))
            .map_err(|e| invalid_response(Platform::Reddit, e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("raw_json", "1");
        Ok(url)
    }

    async fn request_listing(
        &self,
        url: &Url,
        resource: &str,
    ) -> CoreResult<RedditListing<RedditPostData>> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Reddit, e))?;
        let response = check_status(Platform::Reddit, resource, response)?;
        response.json().await.map_err(|e| {
            invalid_response(
                Platform::Reddit,
                format!("failed to parse posts for {}: {}", resource, e),
            )
        })
    }

    async fn fetch_subreddit(
        &self,
        subreddit: &str,
        sort: &str,
        limit: u32,
    ) -> CoreResult<Vec<RawPost>> {
        let url = self.listing_url(subreddit, sort, limit)?;
        let resource = format!("r/{}", subreddit);
        let operation = format!("reddit {}", resource);

        let listing = with_retry(&self.retry, &operation, || {
            self.request_listing(&url, &resource)
        })
        .await?;

        Ok(listing_to_posts(listing))
    }
}

/// Drops stickied posts (rules, megathreads).
pub fn listing_to_posts(listing: RedditListing<RedditPostData>) -> Vec<RawPost> {
    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| !post.stickied)
        .map(RedditPostData::into_raw_post)
        .collect()
}

#[async_trait]
impl PlatformFetcher for RedditFetcher {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, config: &PlatformConfig) -> CoreResult<Vec<RawPost>> {
        let subreddits = Self::subreddits(config);
        let sort = config.setting("sort").unwrap_or(DEFAULT_SORT);
        let limit = match config.setting("limit") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ideascout_core::ConfigError::InvalidValue {
                    field: "reddit.limit".to_string(),
                    value: raw.to_string(),
                })?
                .clamp(1, MAX_LIMIT),
            None => DEFAULT_LIMIT,
        };

        let mut posts = Vec::new();
        let mut failures = 0;
        for subreddit in &subreddits {
            match self.fetch_subreddit(subreddit, sort, limit).await {
                Ok(mut batch) => {
                    debug!("Fetched {} posts from r/{}", batch.len(), subreddit);
                    posts.append(&mut batch);
                }
                Err(e) => {
                    warn!("Skipping r/{}: {}", subreddit, e);
                    failures += 1;
                }
            }
        }

        if failures > 0 && failures == subreddits.len() {
            return Err(PlatformError::AllSourcesFailed {
                platform: Platform::Reddit,
                failures,
            }
            .into());
        }

        info!(
            "Fetched {} reddit posts from {} subreddits",
            posts.len(),
            subreddits.len() - failures
        );
        Ok(posts)
    }
}
