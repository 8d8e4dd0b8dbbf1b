use super::*;
use async_trait::async_trait;
use cache_store::MemoryCacheStore;
use chrono::{Duration as ChronoDuration, TimeZone};
use ideascout_core::{
    CoreResult, PlatformConfig, PlatformError, PlatformFetcher, PlatformMetrics, RawPost,
};
use std::time::Duration;

struct StaticFetcher {
    platform: Platform,
    posts: CoreResult<Vec<RawPost>>,
}

#[async_trait]
impl PlatformFetcher for StaticFetcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, _config: &PlatformConfig) -> CoreResult<Vec<RawPost>> {
        match &self.posts {
            Ok(posts) => Ok(posts.clone()),
            Err(_) => Err(PlatformError::ServerError {
                platform: self.platform,
                status_code: 502,
            }
            .into()),
        }
    }
}

struct SlowFetcher;

#[async_trait]
impl PlatformFetcher for SlowFetcher {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    async fn fetch(&self, _config: &PlatformConfig) -> CoreResult<Vec<RawPost>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![])
    }
}

fn idea(id: &str, category: Category, platform: Platform, hours_ago: i64) -> IdeaRecord {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let metrics = match platform {
        Platform::Reddit => PlatformMetrics::Reddit {
            upvotes: Some(10 * (id.len() as u64)),
            comments: Some(1),
        },
        Platform::Twitter => PlatformMetrics::Twitter {
            likes: Some(5),
            retweets: Some(1),
        },
    };
    IdeaRecord {
        id: format!("{}_{id}", platform.as_str()),
        source: "r/SideProject".to_string(),
        title: format!("Idea {id}"),
        description: format!("A {} idea", category.label()),
        tags: vec![category.key().to_string()],
        category,
        timestamp: base - ChronoDuration::hours(hours_ago),
        author: "maker".to_string(),
        url: format!("https://example.com/{id}"),
        engagement: hours_ago as f64,
        metrics,
        complexity: None,
        market_potential: None,
    }
}

fn five_ideas() -> Vec<IdeaRecord> {
    vec![
        idea("a", Category::SaasIdeas, Platform::Reddit, 1),
        idea("b", Category::Productivity, Platform::Reddit, 2),
        idea("c", Category::SaasIdeas, Platform::Twitter, 3),
        idea("d", Category::DeveloperTools, Platform::Twitter, 4),
        idea("e", Category::AppIdeas, Platform::Reddit, 5),
    ]
}

fn reddit_post(id: &str, title: &str) -> RawPost {
    RawPost {
        id: id.to_string(),
        source: "r/SomebodyMakeThis".to_string(),
        title: title.to_string(),
        body: String::new(),
        author: "poster".to_string(),
        url: format!("https://www.reddit.com/{id}"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
        labels: vec![],
        metrics: PlatformMetrics::Reddit {
            upvotes: Some(4),
            comments: Some(2),
        },
    }
}

fn reddit_only() -> AppConfig {
    AppConfig {
        reddit: PlatformConfig::enabled(),
        twitter: PlatformConfig::default(),
    }
}

fn driver_with(store: Arc<MemoryCacheStore>, orchestrator: Orchestrator) -> ConversationDriver {
    ConversationDriver::new(store, orchestrator)
}

async fn seeded_store(ideas: &[IdeaRecord]) -> Arc<MemoryCacheStore> {
    let store = Arc::new(MemoryCacheStore::new());
    store.save_ideas(ideas).await.unwrap();
    store
}

#[tokio::test]
async fn test_filter_category_uses_cached_ideas() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());

    let response = driver.handle("filter saas-ideas", None, None).await;

    assert!(response.message.contains('2'), "{}", response.message);
    assert_eq!(response.new_state.step, Step::Browsing);
    assert_eq!(
        response.new_state.data.filtered_category,
        CategoryFilter::Only(Category::SaasIdeas)
    );
    let ideas = response.ideas.unwrap();
    assert_eq!(ideas.len(), 2);
    assert!(ideas.iter().all(|i| i.category == Category::SaasIdeas));
}

#[tokio::test]
async fn test_filter_accepts_category_label() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());

    let response = driver.handle("Show Developer Tools", None, None).await;

    assert_eq!(
        response.new_state.data.filtered_category,
        CategoryFilter::Only(Category::DeveloperTools)
    );
    assert_eq!(response.ideas.unwrap().len(), 1);
}

#[tokio::test]
async fn test_platform_match_takes_precedence_over_category() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());

    let response = driver.handle("show reddit saas-ideas", None, None).await;

    assert_eq!(
        response.new_state.data.filter_platform,
        PlatformFilter::Only(Platform::Reddit)
    );
    assert_eq!(response.new_state.data.filtered_category, CategoryFilter::All);
    let ideas = response.ideas.unwrap();
    assert_eq!(ideas.len(), 3);
    assert!(ideas.iter().all(|i| i.platform() == Platform::Reddit));
}

#[tokio::test]
async fn test_filter_all_resets_both_dimensions() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());
    let narrowed = driver.handle("show twitter", None, None).await.new_state;

    let response = driver.handle("show all", Some(narrowed), None).await;

    assert_eq!(response.new_state.data.filter_platform, PlatformFilter::All);
    assert_eq!(response.new_state.data.filtered_category, CategoryFilter::All);
    assert_eq!(response.ideas.unwrap().len(), 5);
}

#[tokio::test]
async fn test_platform_match_beats_all_selector() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());

    let response = driver.handle("show all twitter ideas", None, None).await;

    assert_eq!(
        response.new_state.data.filter_platform,
        PlatformFilter::Only(Platform::Twitter)
    );
    let ideas = response.ideas.unwrap();
    assert_eq!(ideas.len(), 2);
    assert!(ideas.iter().all(|i| i.platform() == Platform::Twitter));
}

#[tokio::test]
async fn test_filter_all_also_clears_search() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());
    let searched = driver.handle("search saas", None, None).await.new_state;
    assert_eq!(searched.data.search_term.as_deref(), Some("saas"));

    let response = driver.handle("filter all", Some(searched), None).await;

    assert!(response.new_state.data.search_term.is_none());
    assert_eq!(response.ideas.unwrap().len(), 5);
    assert!(response.message.contains("all 5 ideas"));
}

#[tokio::test]
async fn test_unknown_filter_lists_valid_keys() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());

    let response = driver.handle("filter gardening", None, None).await;

    assert!(response.message.contains("saas-ideas"));
    assert!(response.message.contains("accessibility"));
    assert!(response.ideas.is_none());
    assert_eq!(response.new_state.step, Step::Browsing);
    assert_eq!(response.new_state.data.filtered_category, CategoryFilter::All);
}

#[tokio::test]
async fn test_sort_newest_orders_by_timestamp() {
    let mut ideas = five_ideas();
    ideas.reverse();
    let driver = driver_with(Arc::new(MemoryCacheStore::new()), Orchestrator::new());
    let state = ConversationState {
        step: Step::Browsing,
        data: ConversationData {
            ideas,
            ..Default::default()
        },
    };

    let response = driver.handle("sort by newest", Some(state), None).await;

    assert_eq!(response.new_state.data.sort_by, SortOrder::Newest);
    let ids: Vec<String> = response.ideas.unwrap().into_iter().map(|i| i.id).collect();
    assert_eq!(
        ids,
        vec!["reddit_a", "reddit_b", "twitter_c", "twitter_d", "reddit_e"]
    );
}

#[tokio::test]
async fn test_sort_without_keyword_means_trending() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());

    let response = driver.handle("sort", None, None).await;

    assert_eq!(response.new_state.data.sort_by, SortOrder::Trending);
    let first = &response.ideas.unwrap()[0];
    assert_eq!(first.id, "reddit_e");
}

#[tokio::test]
async fn test_empty_search_returns_input_state() {
    let driver = driver_with(Arc::new(MemoryCacheStore::new()), Orchestrator::new());
    let state = ConversationState {
        step: Step::Browsing,
        data: ConversationData {
            ideas: five_ideas(),
            sort_by: SortOrder::Popular,
            ..Default::default()
        },
    };

    let response = driver.handle("search ", Some(state.clone()), None).await;

    assert_eq!(response.new_state, state);
    assert!(response.ideas.is_none());
}

#[tokio::test]
async fn test_search_respects_current_filters() {
    let store = seeded_store(&five_ideas()).await;
    let driver = driver_with(store, Orchestrator::new());
    let narrowed = driver.handle("show reddit", None, None).await.new_state;

    let response = driver.handle("search saas", Some(narrowed), None).await;

    assert_eq!(response.new_state.data.search_term.as_deref(), Some("saas"));
    let ideas = response.ideas.unwrap();
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].id, "reddit_a");
}

#[tokio::test]
async fn test_settings_returns_config() {
    let store = Arc::new(MemoryCacheStore::new());
    store.save_config(&reddit_only()).await.unwrap();
    let driver = driver_with(store, Orchestrator::new());

    let response = driver.handle("  SETTINGS ", None, None).await;

    assert_eq!(response.new_state.step, Step::Settings);
    assert_eq!(response.config, Some(reddit_only()));
    assert!(response.message.contains("Reddit: enabled"));
    assert!(response.message.contains("Twitter: disabled"));
}

#[tokio::test]
async fn test_settings_back_returns_to_greeting() {
    let store = seeded_store(&five_ideas()).await;
    store.save_config(&reddit_only()).await.unwrap();
    let driver = driver_with(store, Orchestrator::new());
    let settings = ConversationState::new().with_step(Step::Settings);

    let response = driver.handle("done", Some(settings.clone()), None).await;
    assert_eq!(response.new_state.step, Step::Configured);
    assert!(response.message.contains("5 cached ideas"));

    let again = driver.handle("hmm", Some(settings), None).await;
    assert_eq!(again.new_state.step, Step::Settings);
}

#[tokio::test]
async fn test_initial_without_platform_stays_initial() {
    let driver = driver_with(Arc::new(MemoryCacheStore::new()), Orchestrator::new());

    let response = driver.handle("hello", None, None).await;

    assert_eq!(response.new_state.step, Step::Initial);
    assert!(response.message.contains("No platform is enabled"));
}

#[tokio::test]
async fn test_credentials_are_persisted_and_used() {
    let store = Arc::new(MemoryCacheStore::new());
    let driver = driver_with(store.clone(), Orchestrator::new());

    let response = driver.handle("hi", None, Some(reddit_only())).await;

    assert_eq!(response.new_state.step, Step::Configured);
    assert_eq!(store.load_config().await, reddit_only());
}

#[tokio::test]
async fn test_scrape_without_platform_leaves_state_unchanged() {
    let driver = driver_with(Arc::new(MemoryCacheStore::new()), Orchestrator::new());
    let state = ConversationState::new().with_step(Step::Configured);

    let response = driver.handle("scrape", Some(state.clone()), None).await;

    assert_eq!(response.new_state, state);
    assert!(response.message.contains("No platform is enabled"));
}

#[tokio::test]
async fn test_scrape_success_resets_filters_and_caches() {
    let store = Arc::new(MemoryCacheStore::new());
    let fetcher = Arc::new(StaticFetcher {
        platform: Platform::Reddit,
        posts: Ok(vec![
            reddit_post("1", "SaaS for landlords"),
            reddit_post("2", "Pomodoro timer that blocks sites"),
        ]),
    });
    let driver = driver_with(store.clone(), Orchestrator::new().with_fetcher(fetcher));
    let state = ConversationState {
        step: Step::Browsing,
        data: ConversationData {
            filtered_category: CategoryFilter::Only(Category::NoCode),
            search_term: Some("zzz".to_string()),
            sort_by: SortOrder::Newest,
            ..Default::default()
        },
    };

    let response = driver
        .handle("refresh", Some(state), Some(reddit_only()))
        .await;

    let next = &response.new_state;
    assert_eq!(next.step, Step::Browsing);
    assert_eq!(next.data.ideas.len(), 2);
    assert_eq!(next.data.filtered_category, CategoryFilter::All);
    assert!(next.data.search_term.is_none());
    assert_eq!(next.data.sort_by, SortOrder::Newest);
    assert!(next.data.last_updated.is_some());
    assert!(next.data.error.is_none());
    assert_eq!(response.ideas.map(|i| i.len()), Some(2));
    assert_eq!(store.load_ideas().await.len(), 2);
}

#[tokio::test]
async fn test_scrape_records_partial_errors() {
    let store = seeded_store(&five_ideas()).await;
    let failing = Arc::new(StaticFetcher {
        platform: Platform::Reddit,
        posts: Err(PlatformError::NoFetcher {
            platform: Platform::Reddit,
        }
        .into()),
    });
    let driver = driver_with(store.clone(), Orchestrator::new().with_fetcher(failing));

    let response = driver.handle("fetch", None, Some(reddit_only())).await;

    assert_eq!(response.new_state.step, Step::Browsing);
    assert!(response.new_state.data.ideas.is_empty());
    assert!(response
        .new_state
        .data
        .error
        .as_deref()
        .unwrap()
        .starts_with("Reddit:"));
    // An empty batch never overwrites the cache.
    assert_eq!(store.load_ideas().await.len(), 5);
}

#[tokio::test]
async fn test_reddit_scenario_replaces_cache_with_fresh_batch() {
    let store = seeded_store(&five_ideas()).await;
    let fetcher = Arc::new(StaticFetcher {
        platform: Platform::Reddit,
        posts: Ok(vec![
            reddit_post("1", "SaaS for landlords"),
            reddit_post("2", "Subscription box analytics for B2B"),
            reddit_post("3", "Pomodoro timer that blocks sites"),
        ]),
    });
    let driver = driver_with(store.clone(), Orchestrator::new().with_fetcher(fetcher));

    let response = driver.handle("scrape", None, Some(reddit_only())).await;

    assert!(response.new_state.data.error.is_none());
    let cached = store.load_ideas().await;
    let ids: Vec<&str> = cached.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["reddit_1", "reddit_2", "reddit_3"]);
    let saas = cached
        .iter()
        .filter(|i| i.category == Category::SaasIdeas)
        .count();
    assert_eq!(saas, 2);
}

#[tokio::test]
async fn test_partial_success_is_cached_and_reported() {
    let store = seeded_store(&five_ideas()).await;
    let reddit = Arc::new(StaticFetcher {
        platform: Platform::Reddit,
        posts: Ok(vec![reddit_post("1", "SaaS for landlords")]),
    });
    let twitter = Arc::new(StaticFetcher {
        platform: Platform::Twitter,
        posts: Err(PlatformError::Unauthorized {
            platform: Platform::Twitter,
        }
        .into()),
    });
    let driver = driver_with(
        store.clone(),
        Orchestrator::new().with_fetcher(reddit).with_fetcher(twitter),
    );
    let both = AppConfig {
        reddit: PlatformConfig::enabled(),
        twitter: PlatformConfig::enabled(),
    };

    let response = driver.handle("scrape", None, Some(both)).await;

    assert_eq!(response.new_state.step, Step::Browsing);
    assert_eq!(response.new_state.data.ideas.len(), 1);
    assert!(response
        .new_state
        .data
        .error
        .as_deref()
        .unwrap()
        .starts_with("Twitter:"));
    assert!(response.message.contains("Some platforms failed"));
    assert_eq!(store.load_ideas().await.len(), 1);
}

#[tokio::test]
async fn test_scrape_timeout_returns_to_configured() {
    let orchestrator = Orchestrator::new()
        .with_fetcher(Arc::new(SlowFetcher))
        .with_timeout(Duration::from_millis(20));
    let driver = driver_with(Arc::new(MemoryCacheStore::new()), orchestrator);

    let response = driver.handle("scrape", None, Some(reddit_only())).await;

    assert_eq!(response.new_state.step, Step::Configured);
    assert!(response.message.starts_with("Scraping failed."));
    assert!(response.new_state.data.error.is_some());
}

#[tokio::test]
async fn test_scraping_state_at_rest_is_configured() {
    let driver = driver_with(Arc::new(MemoryCacheStore::new()), Orchestrator::new());
    let stuck = ConversationState::new().with_step(Step::Scraping);

    let response = driver.handle("what now", Some(stuck), None).await;

    assert_eq!(response.new_state.step, Step::Configured);
    assert!(response.message.contains("Commands:"));
}

#[test]
fn test_command_priority() {
    assert_eq!(Command::detect("configure and scrape"), Command::Settings);
    assert_eq!(Command::detect("scrape then show"), Command::Scrape);
    assert_eq!(Command::detect("show sorted"), Command::Filter);
    assert_eq!(Command::detect("sort search"), Command::Sort);
    assert_eq!(Command::detect("search tools"), Command::Search);
    assert_eq!(Command::detect("hello"), Command::Other);
}

#[test]
fn test_state_serializes_with_camel_case_keys() {
    let state = ConversationState::new().with_step(Step::Browsing);
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["step"], "browsing");
    assert_eq!(json["data"]["filteredCategory"], "all");
    assert_eq!(json["data"]["sortBy"], "trending");

    let back: ConversationState = serde_json::from_value(json).unwrap();
    assert_eq!(back, state);
}
