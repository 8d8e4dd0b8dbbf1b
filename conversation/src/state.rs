use chrono::{DateTime, Utc};
use ideascout_core::{CategoryFilter, IdeaQuery, IdeaRecord, PlatformFilter, SortOrder};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Initial,
    Configured,
    /// Only ever observed inside a single scrape command.
    Scraping,
    Browsing,
    Settings,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Initial => "initial",
            Step::Configured => "configured",
            Step::Scraping => "scraping",
            Step::Browsing => "browsing",
            Step::Settings => "settings",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationData {
    pub ideas: Vec<IdeaRecord>,
    pub filtered_category: CategoryFilter,
    pub filter_platform: PlatformFilter,
    pub sort_by: SortOrder,
    pub search_term: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl ConversationData {
    pub fn query(&self) -> IdeaQuery {
        IdeaQuery {
            category: self.filtered_category,
            platform: self.filter_platform,
            search: self.search_term.clone(),
            sort: self.sort_by,
        }
    }

    pub fn clear_filters(&mut self) {
        self.filtered_category = CategoryFilter::All;
        self.filter_platform = PlatformFilter::All;
        self.search_term = None;
    }
}

/// Held by the caller between commands; the driver only ever returns new values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub step: Step,
    #[serde(default)]
    pub data: ConversationData,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.step = step;
        self
    }

    /// A state persisted mid-scrape is treated as configured.
    pub fn at_rest(mut self) -> Self {
        if self.step == Step::Scraping {
            self.step = Step::Configured;
        }
        self
    }
}
