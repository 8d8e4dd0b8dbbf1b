//! Keyword-driven conversation over scraping, filtering and browsing ideas.
//!
//! The driver is stateless between calls: the caller hands in the previous
//! [`ConversationState`] and receives a new one with every response.

use cache_store::CacheStore;
use chrono::Utc;
use ideascout_core::{
    AppConfig, Category, CategoryFilter, ErrorExt, IdeaRecord, Platform, PlatformFilter, SortOrder,
};
use ideascout_core::query::ALL_SELECTOR;
use ingestion::{Orchestrator, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

mod replies;
mod state;

#[cfg(test)]
mod tests;

pub use state::{ConversationData, ConversationState, Step};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub message: String,
    pub new_state: ConversationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideas: Option<Vec<IdeaRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AppConfig>,
}

impl ConversationResponse {
    fn new(message: impl Into<String>, new_state: ConversationState) -> Self {
        Self {
            message: message.into(),
            new_state,
            ideas: None,
            config: None,
        }
    }

    fn with_ideas(mut self, ideas: Vec<IdeaRecord>) -> Self {
        self.ideas = Some(ideas);
        self
    }

    fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// First matching rule wins, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Settings,
    Scrape,
    Filter,
    Sort,
    Search,
    Other,
}

impl Command {
    fn detect(input: &str) -> Self {
        let has = |words: &[&str]| words.iter().any(|w| input.contains(w));
        if has(&["settings", "configure", "api"]) {
            Command::Settings
        } else if has(&["scrape", "refresh", "fetch"]) {
            Command::Scrape
        } else if has(&["filter", "show"]) {
            Command::Filter
        } else if has(&["sort"]) {
            Command::Sort
        } else if has(&["search"]) {
            Command::Search
        } else {
            Command::Other
        }
    }
}

enum FilterChoice {
    Everything,
    Platform(Platform),
    Category(Category),
}

/// Platform beats "all", which beats a category key or label.
fn parse_filter(input: &str) -> Option<FilterChoice> {
    if let Some(platform) = Platform::ALL
        .into_iter()
        .find(|p| input.contains(p.as_str()))
    {
        return Some(FilterChoice::Platform(platform));
    }
    if input.split_whitespace().any(|word| word == ALL_SELECTOR) {
        return Some(FilterChoice::Everything);
    }

    // Longest needle wins so a label never loses to a shorter key inside it.
    Category::ALL
        .into_iter()
        .flat_map(|category| {
            [category.key().to_string(), category.label().to_lowercase()]
                .into_iter()
                .filter(|needle| input.contains(needle.as_str()))
                .map(move |needle| (needle.len(), category))
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, category)| FilterChoice::Category(category))
}

fn parse_sort(input: &str) -> SortOrder {
    if ["newest", "new", "recent"].iter().any(|w| input.contains(w)) {
        SortOrder::Newest
    } else if input.contains("popular") {
        SortOrder::Popular
    } else {
        SortOrder::Trending
    }
}

pub struct ConversationDriver {
    store: Arc<dyn CacheStore>,
    orchestrator: Orchestrator,
    progress: Option<ProgressCallback>,
}

impl ConversationDriver {
    pub fn new(store: Arc<dyn CacheStore>, orchestrator: Orchestrator) -> Self {
        Self {
            store,
            orchestrator,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Runs one command. `credentials`, when given, become the effective
    /// configuration and are persisted if they differ from the stored one.
    pub async fn handle(
        &self,
        text: &str,
        state: Option<ConversationState>,
        credentials: Option<AppConfig>,
    ) -> ConversationResponse {
        let input = text.trim().to_lowercase();
        let state = state.unwrap_or_default().at_rest();
        let config = self.effective_config(credentials).await;
        let command = Command::detect(&input);
        debug!("Handling {:?} in step {}", command, state.step);

        match command {
            Command::Settings => self.show_settings(state, config),
            Command::Scrape => self.scrape(state, &config).await,
            Command::Filter => self.filter(&input, state).await,
            Command::Sort => self.sort(&input, state).await,
            Command::Search => self.search(&input, state).await,
            Command::Other => self.fallback(&input, state, &config).await,
        }
    }

    async fn effective_config(&self, credentials: Option<AppConfig>) -> AppConfig {
        let stored = self.store.load_config().await;
        match credentials {
            Some(config) if config != stored => {
                if let Err(e) = self.store.save_config(&config).await {
                    e.log_warn();
                }
                config
            }
            Some(config) => config,
            None => stored,
        }
    }

    /// Ideas carried in the state, or the cache when the state has none.
    async fn base_ideas(&self, state: &ConversationState) -> Vec<IdeaRecord> {
        if state.data.ideas.is_empty() {
            self.store.load_ideas().await
        } else {
            state.data.ideas.clone()
        }
    }

    fn show_settings(&self, mut state: ConversationState, config: AppConfig) -> ConversationResponse {
        state.step = Step::Settings;
        ConversationResponse::new(replies::settings_summary(&config), state).with_config(config)
    }

    async fn scrape(&self, state: ConversationState, config: &AppConfig) -> ConversationResponse {
        if !config.has_enabled_platform() {
            return ConversationResponse::new(replies::no_platform_enabled(), state);
        }

        let mut next = state.with_step(Step::Scraping);
        info!("Conversation entered {} step", next.step);

        match self
            .orchestrator
            .scrape_all(config, self.progress.clone())
            .await
        {
            Ok(outcome) => {
                if !outcome.ideas.is_empty() {
                    if let Err(e) = self.store.save_ideas(&outcome.ideas).await {
                        e.log_warn();
                    }
                }
                let message = replies::scrape_summary(outcome.ideas.len(), &outcome.errors);

                next.step = Step::Browsing;
                next.data.clear_filters();
                next.data.ideas = outcome.ideas;
                next.data.last_updated = Some(Utc::now());
                next.data.error = if outcome.errors.is_empty() {
                    None
                } else {
                    Some(outcome.errors.join("; "))
                };

                let view = ideascout_core::query::sorted(&next.data.ideas, next.data.sort_by);
                ConversationResponse::new(message, next).with_ideas(view)
            }
            Err(e) => {
                e.log_error();
                let reason = e.user_friendly_message();
                next.step = Step::Configured;
                next.data.error = Some(reason.clone());
                ConversationResponse::new(replies::scrape_failed(&reason), next)
            }
        }
    }

    async fn filter(&self, input: &str, state: ConversationState) -> ConversationResponse {
        let mut next = state.with_step(Step::Browsing);
        next.data.ideas = self.base_ideas(&next).await;

        let message_for = match parse_filter(input) {
            Some(FilterChoice::Everything) => {
                next.data.clear_filters();
                FilterChoice::Everything
            }
            Some(FilterChoice::Platform(platform)) => {
                next.data.filter_platform = PlatformFilter::Only(platform);
                FilterChoice::Platform(platform)
            }
            Some(FilterChoice::Category(category)) => {
                next.data.filtered_category = CategoryFilter::Only(category);
                FilterChoice::Category(category)
            }
            None => {
                debug!("No filter recognised in {:?}", input);
                return ConversationResponse::new(replies::unknown_filter(), next);
            }
        };

        let view = self.view(&next);
        let message = match message_for {
            FilterChoice::Everything => replies::filters_cleared(view.len()),
            FilterChoice::Platform(platform) => replies::platform_filtered(view.len(), platform),
            FilterChoice::Category(category) => replies::category_filtered(view.len(), category),
        };
        ConversationResponse::new(message, next).with_ideas(view)
    }

    async fn sort(&self, input: &str, state: ConversationState) -> ConversationResponse {
        let mut next = state.with_step(Step::Browsing);
        next.data.ideas = self.base_ideas(&next).await;
        next.data.sort_by = parse_sort(input);

        let view = self.view(&next);
        let message = replies::sorted(view.len(), next.data.sort_by);
        ConversationResponse::new(message, next).with_ideas(view)
    }

    async fn search(&self, input: &str, state: ConversationState) -> ConversationResponse {
        let term = input.replace("search", "").trim().to_string();
        if term.is_empty() {
            return ConversationResponse::new(replies::search_guidance(), state);
        }

        let mut next = state.with_step(Step::Browsing);
        next.data.ideas = self.base_ideas(&next).await;
        next.data.search_term = Some(term.clone());

        let view = self.view(&next);
        let message = replies::search_results(view.len(), &term);
        ConversationResponse::new(message, next).with_ideas(view)
    }

    async fn fallback(
        &self,
        input: &str,
        state: ConversationState,
        config: &AppConfig,
    ) -> ConversationResponse {
        match state.step {
            Step::Initial => self.greet(state, config).await,
            Step::Settings if input.contains("back") || input.contains("done") => {
                self.greet(state, config).await
            }
            Step::Settings => self.show_settings(state, config.clone()),
            Step::Configured | Step::Browsing | Step::Scraping => {
                ConversationResponse::new(replies::help(), state)
            }
        }
    }

    async fn greet(&self, state: ConversationState, config: &AppConfig) -> ConversationResponse {
        if !config.has_enabled_platform() {
            return ConversationResponse::new(
                replies::setup_instructions(),
                state.with_step(Step::Initial),
            );
        }

        let mut next = state.with_step(Step::Configured);
        next.data.ideas = self.base_ideas(&next).await;
        let message = replies::welcome_back(config, next.data.ideas.len());
        if next.data.ideas.is_empty() {
            return ConversationResponse::new(message, next);
        }
        let view = self.view(&next);
        ConversationResponse::new(message, next).with_ideas(view)
    }

    /// The stored query applied to the state's ideas.
    fn view(&self, state: &ConversationState) -> Vec<IdeaRecord> {
        match state.data.query().apply(&state.data.ideas) {
            Ok(view) => view,
            Err(e) => {
                warn!("Discarding stored query: {}", e);
                ideascout_core::query::sorted(&state.data.ideas, state.data.sort_by)
            }
        }
    }
}
