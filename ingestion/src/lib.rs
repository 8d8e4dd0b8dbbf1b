//! Concurrent fan-out to every enabled platform fetcher.
//!
//! Each enabled platform runs in its own task. A failing platform contributes
//! an error string and no ideas; it never cancels its siblings.

use futures::future::join_all;
use ideascout_core::classifier::classify;
use ideascout_core::{
    AppConfig, ConfigError, CoreError, CoreResult, ErrorExt, IdeaRecord, Platform, PlatformConfig,
    PlatformError, PlatformFetcher, ScrapeOutcome, ScrapeStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Receives `(platform, status)` transitions. Disabled platforms get a single
/// `Idle`; enabled ones go `Scraping` then `Success` or `Error`. Calls for one platform are
/// sequential; calls for different platforms may interleave. Must be cheap.
pub type ProgressCallback = Arc<dyn Fn(Platform, ScrapeStatus) + Send + Sync>;

#[derive(Clone, Default)]
pub struct Orchestrator {
    fetchers: HashMap<Platform, Arc<dyn PlatformFetcher>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut platforms: Vec<_> = self.fetchers.keys().collect();
        platforms.sort();
        f.debug_struct("Orchestrator")
            .field("platforms", &platforms)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fetcher under the platform it reports; replaces any previous one.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PlatformFetcher>) -> Self {
        self.fetchers.insert(fetcher.platform(), fetcher);
        self
    }

    pub fn with_fetchers<I>(self, fetchers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn PlatformFetcher>>,
    {
        fetchers.into_iter().fold(self, Self::with_fetcher)
    }

    /// Bounds the whole orchestration; unfinished platforms are aborted.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn scrape_all(
        &self,
        config: &AppConfig,
        on_progress: Option<ProgressCallback>,
    ) -> CoreResult<ScrapeOutcome> {
        let enabled = config.enabled_platforms();
        if enabled.is_empty() {
            warn!("Scrape requested with no platform enabled");
            return Err(ConfigError::NoPlatformsEnabled.into());
        }

        if let Some(progress) = &on_progress {
            for platform in Platform::ALL.into_iter().filter(|p| !enabled.contains(p)) {
                progress(platform, ScrapeStatus::Idle);
            }
        }

        info!(
            "Scraping {} platform(s): {}",
            enabled.len(),
            enabled
                .iter()
                .map(Platform::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let handles: Vec<_> = enabled
            .iter()
            .map(|&platform| {
                let fetcher = self.fetchers.get(&platform).cloned();
                let platform_config = config.platform(platform).clone();
                let progress = on_progress.clone();
                tokio::spawn(scrape_platform(platform, fetcher, platform_config, progress))
            })
            .collect();
        let abort_handles: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, join_all(handles)).await {
                Ok(joined) => joined,
                Err(_) => {
                    for handle in &abort_handles {
                        handle.abort();
                    }
                    error!("Scrape timed out after {:?}", limit);
                    return Err(CoreError::Timeout {
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => join_all(handles).await,
        };

        let mut outcome = ScrapeOutcome::default();
        for (platform, result) in enabled.into_iter().zip(joined) {
            let result = result.unwrap_or_else(|join_error| {
                if let Some(progress) = &on_progress {
                    progress(platform, ScrapeStatus::Error);
                }
                Err(PlatformError::TaskAborted {
                    platform,
                    reason: join_error.to_string(),
                }
                .into())
            });

            match result {
                Ok(mut ideas) => outcome.ideas.append(&mut ideas),
                Err(e) => outcome.errors.push(format!(
                    "{}: {}",
                    platform.display_name(),
                    e.user_friendly_message()
                )),
            }
        }

        info!(
            "Scrape finished with {} ideas and {} errors",
            outcome.ideas.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }
}

async fn scrape_platform(
    platform: Platform,
    fetcher: Option<Arc<dyn PlatformFetcher>>,
    config: PlatformConfig,
    progress: Option<ProgressCallback>,
) -> CoreResult<Vec<IdeaRecord>> {
    let report = |status: ScrapeStatus| {
        if let Some(progress) = &progress {
            progress(platform, status);
        }
    };

    report(ScrapeStatus::Scraping);
    debug!("Starting {} fetch", platform);

    let result = match fetcher {
        Some(fetcher) => fetcher
            .fetch(&config)
            .await
            .map(|posts| posts.into_iter().map(classify).collect::<Vec<_>>()),
        None => Err(PlatformError::NoFetcher { platform }.into()),
    };

    match &result {
        Ok(ideas) => {
            info!("{} produced {} ideas", platform, ideas.len());
            report(ScrapeStatus::Success);
        }
        Err(e) => {
            e.log_warn();
            report(ScrapeStatus::Error);
        }
    }
    result
}
