use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Twitter,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Reddit, Platform::Twitter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Twitter => "twitter",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Reddit => "Reddit",
            Platform::Twitter => "Twitter",
        }
    }

    /// Category assigned when no keyword set matches.
    pub fn default_category(&self) -> Category {
        match self {
            Platform::Reddit | Platform::Twitter => Category::AppIdeas,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reddit" => Ok(Platform::Reddit),
            "twitter" | "x" => Ok(Platform::Twitter),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// The fixed idea taxonomy. "all" is a filter selector, never a record value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    AppIdeas,
    SaasIdeas,
    DeveloperTools,
    Productivity,
    NoCode,
    MobileApps,
    Accessibility,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::AppIdeas,
        Category::SaasIdeas,
        Category::DeveloperTools,
        Category::Productivity,
        Category::NoCode,
        Category::MobileApps,
        Category::Accessibility,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::AppIdeas => "app-ideas",
            Category::SaasIdeas => "saas-ideas",
            Category::DeveloperTools => "developer-tools",
            Category::Productivity => "productivity",
            Category::NoCode => "no-code",
            Category::MobileApps => "mobile-apps",
            Category::Accessibility => "accessibility",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::AppIdeas => "App Ideas",
            Category::SaasIdeas => "SaaS Ideas",
            Category::DeveloperTools => "Developer Tools",
            Category::Productivity => "Productivity",
            Category::NoCode => "No-Code",
            Category::MobileApps => "Mobile Apps",
            Category::Accessibility => "Accessibility",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == needle || c.label().to_lowercase() == needle)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        };
        f.write_str(s)
    }
}

/// Engagement counters. The platform decides which pair exists, so the
/// variant doubles as the record's platform tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PlatformMetrics {
    Reddit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upvotes: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comments: Option<u64>,
    },
    Twitter {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        likes: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retweets: Option<u64>,
    },
}

impl PlatformMetrics {
    pub fn platform(&self) -> Platform {
        match self {
            PlatformMetrics::Reddit { .. } => Platform::Reddit,
            PlatformMetrics::Twitter { .. } => Platform::Twitter,
        }
    }

    /// upvotes or likes; absent counts as zero.
    pub fn primary_signal(&self) -> u64 {
        match self {
            PlatformMetrics::Reddit { upvotes, .. } => upvotes.unwrap_or(0),
            PlatformMetrics::Twitter { likes, .. } => likes.unwrap_or(0),
        }
    }

    /// comments or retweets; absent counts as zero.
    pub fn secondary_signal(&self) -> u64 {
        match self {
            PlatformMetrics::Reddit { comments, .. } => comments.unwrap_or(0),
            PlatformMetrics::Twitter { retweets, .. } => retweets.unwrap_or(0),
        }
    }

    pub fn has_any_counter(&self) -> bool {
        match self {
            PlatformMetrics::Reddit { upvotes, comments } => upvotes.is_some() || comments.is_some(),
            PlatformMetrics::Twitter { likes, retweets } => likes.is_some() || retweets.is_some(),
        }
    }
}

/// One discovered idea, normalized across platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRecord {
    pub id: String,
    pub source: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub url: String,
    pub engagement: f64,
    #[serde(flatten)]
    pub metrics: PlatformMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_potential: Option<Level>,
}

impl IdeaRecord {
    pub fn platform(&self) -> Platform {
        self.metrics.platform()
    }

    /// Unweighted primary + secondary counters, the key of the `popular` sort.
    pub fn popularity(&self) -> u64 {
        self.metrics
            .primary_signal()
            .saturating_add(self.metrics.secondary_signal())
    }
}

/// A post as returned by a platform fetcher, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost {
    pub id: String,
    pub source: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    /// Flair, hashtags or any other platform labels.
    pub labels: Vec<String>,
    pub metrics: PlatformMetrics,
}

/// Per-platform enablement. `settings` is opaque to the core and read only by fetchers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl PlatformConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            settings: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Comma separated setting split into trimmed, non-empty items.
    pub fn list_setting(&self, key: &str) -> Vec<String> {
        self.setting(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Default value has every platform disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub reddit: PlatformConfig,
    #[serde(default)]
    pub twitter: PlatformConfig,
}

impl AppConfig {
    pub fn platform(&self, platform: Platform) -> &PlatformConfig {
        match platform {
            Platform::Reddit => &self.reddit,
            Platform::Twitter => &self.twitter,
        }
    }

    pub fn platform_mut(&mut self, platform: Platform) -> &mut PlatformConfig {
        match platform {
            Platform::Reddit => &mut self.reddit,
            Platform::Twitter => &mut self.twitter,
        }
    }

    pub fn enabled_platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.platform(*p).enabled)
            .collect()
    }

    pub fn has_enabled_platform(&self) -> bool {
        !self.enabled_platforms().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStatus {
    Idle,
    Scraping,
    Success,
    Error,
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScrapeStatus::Idle => "idle",
            ScrapeStatus::Scraping => "scraping",
            ScrapeStatus::Success => "success",
            ScrapeStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Result of one orchestration. Both fields may be non-empty (partial success).
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub ideas: Vec<IdeaRecord>,
    pub errors: Vec<String>,
}

impl ScrapeOutcome {
    pub fn is_partial(&self) -> bool {
        !self.ideas.is_empty() && !self.errors.is_empty()
    }
}
