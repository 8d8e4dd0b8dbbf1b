//! Rule-based normalization of raw platform posts into [`IdeaRecord`]s.
//!
//! Categories come from an ordered keyword table: the first category whose
//! keyword set matches the post wins. Engagement is
//! `primary + secondary * SECONDARY_SIGNAL_WEIGHT` for every platform so
//! cross-platform ranking stays comparable.

use crate::types::{Category, IdeaRecord, Level, RawPost};
use std::collections::HashSet;
use tracing::debug;

/// Weight applied to comments (reddit) or retweets (twitter).
pub const SECONDARY_SIGNAL_WEIGHT: f64 = 1.0;

/// Engagement score at or above which market potential is High.
pub const HIGH_MARKET_POTENTIAL: f64 = 500.0;
/// Engagement score at or above which market potential is Medium.
pub const MEDIUM_MARKET_POTENTIAL: f64 = 50.0;

/// Evaluated top to bottom; first match wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Accessibility,
        &[
            "accessibility",
            "accessible",
            "a11y",
            "screen reader",
            "disability",
            "disabled",
            "blind",
            "deaf",
            "wcag",
        ],
    ),
    (
        Category::NoCode,
        &[
            "no-code",
            "nocode",
            "no code",
            "low-code",
            "lowcode",
            "zapier",
            "bubble",
            "airtable",
            "webflow",
        ],
    ),
    (
        Category::DeveloperTools,
        &[
            "developer",
            "developers",
            "devtool",
            "devtools",
            "sdk",
            "cli",
            "ide",
            "github",
            "debugging",
            "debugger",
            "compiler",
            "open source",
        ],
    ),
    (
        Category::MobileApps,
        &[
            "ios",
            "android",
            "mobile",
            "iphone",
            "ipad",
            "app store",
            "play store",
            "flutter",
            "react native",
        ],
    ),
    (
        Category::SaasIdeas,
        &[
            "saas",
            "subscription",
            "b2b",
            "mrr",
            "arr",
            "recurring revenue",
            "dashboard",
            "crm",
            "invoicing",
        ],
    ),
    (
        Category::Productivity,
        &[
            "productivity",
            "productive",
            "todo",
            "to-do",
            "habit",
            "habits",
            "focus",
            "calendar",
            "workflow",
            "notes",
            "time tracking",
            "pomodoro",
        ],
    ),
    (
        Category::AppIdeas,
        &["app", "idea", "ideas", "somebody make this", "build this"],
    ),
];

const HIGH_COMPLEXITY_HINTS: &[&str] = &[
    "ai",
    "machine learning",
    "ml",
    "blockchain",
    "marketplace",
    "platform",
    "real-time",
    "realtime",
];

const LOW_COMPLEXITY_HINTS: &[&str] = &[
    "extension",
    "bot",
    "script",
    "template",
    "simple",
    "widget",
    "plugin",
];

/// Lower-cased post text split into tokens, plus the joined text for phrase matching.
struct PostText {
    joined: String,
    tokens: HashSet<String>,
}

impl PostText {
    fn new(raw: &RawPost) -> Self {
        let mut joined = String::with_capacity(raw.title.len() + raw.body.len() + 32);
        joined.push_str(&raw.title);
        joined.push(' ');
        joined.push_str(&raw.body);
        for label in &raw.labels {
            joined.push(' ');
            joined.push_str(label);
        }
        joined.push(' ');
        joined.push_str(&raw.source);
        let joined = joined.to_lowercase();

        let tokens = joined
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .filter(|t| !t.is_empty())
            .flat_map(|t| {
                // "no-code" should match both as one token and as its parts
                let mut parts = vec![t.to_string()];
                if t.contains('-') {
                    parts.extend(t.split('-').filter(|p| !p.is_empty()).map(str::to_string));
                }
                parts
            })
            .collect();

        Self { joined, tokens }
    }

    fn matches(&self, keyword: &str) -> bool {
        if keyword.contains(' ') {
            self.joined.contains(keyword)
        } else {
            self.tokens.contains(keyword)
        }
    }

    fn matches_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.matches(k))
    }
}

pub fn categorize(raw: &RawPost) -> Category {
    let text = PostText::new(raw);
    categorize_text(&text).unwrap_or_else(|| raw.metrics.platform().default_category())
}

fn categorize_text(text: &PostText) -> Option<Category> {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| text.matches_any(keywords))
        .map(|(category, _)| *category)
}

pub fn engagement_score(raw: &RawPost) -> f64 {
    raw.metrics.primary_signal() as f64
        + raw.metrics.secondary_signal() as f64 * SECONDARY_SIGNAL_WEIGHT
}

fn complexity(text: &PostText) -> Option<Level> {
    if text.matches_any(HIGH_COMPLEXITY_HINTS) {
        Some(Level::High)
    } else if text.matches_any(LOW_COMPLEXITY_HINTS) {
        Some(Level::Low)
    } else {
        None
    }
}

fn market_potential(raw: &RawPost, engagement: f64) -> Option<Level> {
    if !raw.metrics.has_any_counter() {
        return None;
    }
    Some(if engagement >= HIGH_MARKET_POTENTIAL {
        Level::High
    } else if engagement >= MEDIUM_MARKET_POTENTIAL {
        Level::Medium
    } else {
        Level::Low
    })
}

/// The post's own labels, `#` stripped, without case-insensitive duplicates.
fn build_tags(raw: &RawPost) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.labels.len());
    for label in raw
        .labels
        .iter()
        .map(|l| l.trim().trim_start_matches('#'))
        .filter(|l| !l.is_empty())
    {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(label)) {
            tags.push(label.to_string());
        }
    }
    tags
}

pub fn classify(raw: RawPost) -> IdeaRecord {
    let text = PostText::new(&raw);
    let category =
        categorize_text(&text).unwrap_or_else(|| raw.metrics.platform().default_category());
    let engagement = engagement_score(&raw);
    let complexity = complexity(&text);
    let market_potential = market_potential(&raw, engagement);
    let tags = build_tags(&raw);

    debug!(
        "Classified {} post {} as {} (engagement {})",
        raw.metrics.platform(),
        raw.id,
        category,
        engagement
    );

    IdeaRecord {
        id: format!("{}_{}", raw.metrics.platform(), raw.id),
        source: raw.source,
        title: raw.title,
        description: raw.body,
        tags,
        category,
        timestamp: raw.created_at,
        author: raw.author,
        url: raw.url,
        engagement,
        metrics: raw.metrics,
        complexity,
        market_potential,
    }
}
