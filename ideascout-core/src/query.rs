//! Pure filter, search and sort operations over idea lists.

use crate::error::{CoreError, CoreResult};
use crate::types::{Category, IdeaRecord, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ALL_SELECTOR: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_SELECTOR),
            CategoryFilter::Only(category) => f.write_str(category.key()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_SELECTOR) {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformFilter::All => f.write_str(ALL_SELECTOR),
            PlatformFilter::Only(platform) => f.write_str(platform.as_str()),
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(ALL_SELECTOR) {
            Ok(PlatformFilter::All)
        } else {
            s.parse().map(PlatformFilter::Only)
        }
    }
}

impl TryFrom<String> for PlatformFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlatformFilter> for String {
    fn from(value: PlatformFilter) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Newest,
    Popular,
    #[default]
    Trending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortOrder::Newest => "newest",
            SortOrder::Popular => "popular",
            SortOrder::Trending => "trending",
        };
        f.write_str(s)
    }
}

pub fn filter_by_category(ideas: &[IdeaRecord], filter: CategoryFilter) -> Vec<IdeaRecord> {
    match filter {
        CategoryFilter::All => ideas.to_vec(),
        CategoryFilter::Only(category) => ideas
            .iter()
            .filter(|idea| idea.category == category)
            .cloned()
            .collect(),
    }
}

pub fn filter_by_platform(ideas: &[IdeaRecord], filter: PlatformFilter) -> Vec<IdeaRecord> {
    match filter {
        PlatformFilter::All => ideas.to_vec(),
        PlatformFilter::Only(platform) => ideas
            .iter()
            .filter(|idea| idea.platform() == platform)
            .cloned()
            .collect(),
    }
}

/// Case-insensitive substring match on title, description or any tag.
///
/// A blank term is rejected rather than treated as "match nothing".
pub fn search(ideas: &[IdeaRecord], term: &str) -> CoreResult<Vec<IdeaRecord>> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Err(CoreError::InvalidInput {
            message: "Please provide a search term.".to_string(),
        });
    }

    Ok(ideas
        .iter()
        .filter(|idea| matches_term(idea, &needle))
        .cloned()
        .collect())
}

fn matches_term(idea: &IdeaRecord, needle: &str) -> bool {
    idea.title.to_lowercase().contains(needle)
        || idea.description.to_lowercase().contains(needle)
        || idea.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Stable sort; equal keys keep their input order.
pub fn sort_ideas(ideas: &mut [IdeaRecord], order: SortOrder) {
    match order {
        SortOrder::Newest => ideas.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        SortOrder::Popular => ideas.sort_by(|a, b| b.popularity().cmp(&a.popularity())),
        SortOrder::Trending => ideas.sort_by(|a, b| b.engagement.total_cmp(&a.engagement)),
    }
}

pub fn sorted(ideas: &[IdeaRecord], order: SortOrder) -> Vec<IdeaRecord> {
    let mut out = ideas.to_vec();
    sort_ideas(&mut out, order);
    out
}

/// A full view over an idea list: both filters, optional search, then sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdeaQuery {
    pub category: CategoryFilter,
    pub platform: PlatformFilter,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl IdeaQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_platform(mut self, platform: PlatformFilter) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn apply(&self, ideas: &[IdeaRecord]) -> CoreResult<Vec<IdeaRecord>> {
        let mut view = filter_by_category(ideas, self.category);
        view = filter_by_platform(&view, self.platform);
        if let Some(term) = &self.search {
            view = search(&view, term)?;
        }
        sort_ideas(&mut view, self.sort);
        Ok(view)
    }
}
