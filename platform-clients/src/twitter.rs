use crate::http::{build_client, check_status, invalid_response, map_transport_error};
use crate::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ideascout_core::{
    ConfigError, CoreError, CoreResult, Platform, PlatformConfig, PlatformFetcher,
    PlatformMetrics, RawPost,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const TWITTER_API_BASE: &str = "https://api.twitter.com";
const SEARCH_PATH: &str = "2/tweets/search/recent";
const TITLE_MAX_CHARS: usize = 100;
const DEFAULT_MAX_RESULTS: u32 = 50;
const DEFAULT_PAGES: u32 = 1;
const MAX_PAGES: u32 = 5;

pub const DEFAULT_QUERY: &str = "(\"app idea\" OR \"startup idea\" OR \"saas idea\" OR \"someone should build\") -is:retweet lang:en";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<TweetData>,
    #[serde(default)]
    pub includes: Option<Includes>,
    #[serde(default)]
    pub meta: Option<SearchMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetData {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
    #[serde(default)]
    pub entities: Option<Entities>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub retweet_count: Option<u64>,
    #[serde(default)]
    pub reply_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub hashtags: Vec<Hashtag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashtag {
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<TwitterUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub result_count: Option<u32>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// First line of the tweet, cut at a word boundary when too long.
pub fn tweet_title(text: &str) -> String {
    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if first_line.chars().count() <= TITLE_MAX_CHARS {
        return first_line.to_string();
    }

    let cut: String = first_line.chars().take(TITLE_MAX_CHARS).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > TITLE_MAX_CHARS / 2 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}

impl SearchResponse {
    pub fn into_raw_posts(self) -> Vec<RawPost> {
        let users: HashMap<String, TwitterUser> = self
            .includes
            .map(|i| i.users)
            .unwrap_or_default()
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        self.data
            .into_iter()
            .map(|tweet| {
                let user = tweet.author_id.as_ref().and_then(|id| users.get(id));
                let handle = user.map(|u| u.username.clone());
                let author = user
                    .map(|u| u.name.clone())
                    .or_else(|| handle.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                let url = match &handle {
                    Some(h) => format!("https://twitter.com/{}/status/{}", h, tweet.id),
                    None => format!("https://twitter.com/i/web/status/{}", tweet.id),
                };
                let labels = tweet
                    .entities
                    .map(|e| e.hashtags.into_iter().map(|h| h.tag).collect())
                    .unwrap_or_default();
                let metrics = match tweet.public_metrics {
                    Some(m) => PlatformMetrics::Twitter {
                        likes: m.like_count,
                        retweets: m.retweet_count,
                    },
                    None => PlatformMetrics::Twitter {
                        likes: None,
                        retweets: None,
                    },
                };

                RawPost {
                    title: tweet_title(&tweet.text),
                    source: handle
                        .map(|h| format!("@{}", h))
                        .unwrap_or_else(|| "twitter".to_string()),
                    id: tweet.id,
                    body: tweet.text,
                    author,
                    url,
                    created_at: tweet.created_at.unwrap_or_else(Utc::now),
                    labels,
                    metrics,
                }
            })
            .collect()
    }
}

/// Recent-search client. Settings: `bearer_token` (required), `query`,
/// `max_results` (10..=100), `pages`.
#[derive(Debug, Clone)]
pub struct TwitterFetcher {
    http: Client,
    base_url: Url,
    retry: RetryConfig,
}

impl TwitterFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> CoreResult<Self> {
        let base_url = Url::parse(TWITTER_API_BASE).map_err(|e| CoreError::Internal {
            message: format!("invalid twitter base url: {e}"),
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

    pub fn search_url(
        &self,
        query: &str,
        max_results: u32,
        next_token: Option<&str>,
    ) -> CoreResult<Url> {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .map_err(|e| invalid_response(Platform::Twitter, e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("query", query)
                .append_pair("max_results", &max_results.to_string())
                .append_pair("tweet.fields", "created_at,public_metrics,entities,author_id")
                .append_pair("expansions", "author_id")
                .append_pair("user.fields", "username,name");
            if let Some(token) = next_token {
                pairs.append_pair("next_token", token);
            }
        }
        Ok(url)
    }

    async fn request_page(&self, url: &Url, bearer_token: &str) -> CoreResult<SearchResponse> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| map_transport_error(Platform::Twitter, e))?;
        let response = check_status(Platform::Twitter, "recent search", response)?;
        response.json().await.map_err(|e| {
            invalid_response(
                Platform::Twitter,
                format!("failed to parse search results: {}", e),
            )
        })
    }
}

fn numeric_setting(
    config: &PlatformConfig,
    key: &str,
    default: u32,
    range: std::ops::RangeInclusive<u32>,
) -> CoreResult<u32> {
    match config.setting(key) {
        Some(raw) => {
            let value = raw.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                field: format!("twitter.{}", key),
                value: raw.to_string(),
            })?;
            Ok(value.clamp(*range.start(), *range.end()))
        }
        None => Ok(default),
    }
}

#[async_trait]
impl PlatformFetcher for TwitterFetcher {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn fetch(&self, config: &PlatformConfig) -> CoreResult<Vec<RawPost>> {
        let bearer_token = config
            .setting("bearer_token")
            .ok_or_else(|| ConfigError::MissingField {
                field: "twitter.bearer_token".to_string(),
            })?;
        let query = config.setting("query").unwrap_or(DEFAULT_QUERY);
        let max_results = numeric_setting(config, "max_results", DEFAULT_MAX_RESULTS, 10..=100)?;
        let pages = numeric_setting(config, "pages", DEFAULT_PAGES, 1..=MAX_PAGES)?;

        let mut posts = Vec::new();
        let mut next_token: Option<String> = None;
        for page in 0..pages {
            let url = self.search_url(query, max_results, next_token.as_deref())?;
            let operation = format!("twitter search page {}", page + 1);
            let response =
                with_retry(&self.retry, &operation, || self.request_page(&url, bearer_token))
                    .await?;

            next_token = response.meta.as_ref().and_then(|m| m.next_token.clone());
            let mut batch = response.into_raw_posts();
            debug!("Twitter page {} returned {} tweets", page + 1, batch.len());
            posts.append(&mut batch);

            if next_token.is_none() {
                break;
            }
        }

        info!("Fetched {} tweets", posts.len());
        Ok(posts)
    }
}
