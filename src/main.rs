use anyhow::Result;
use cache_store::SqliteCacheStore;
use clap::Parser;
use conversation::{ConversationDriver, ConversationResponse, ConversationState};
use ideascout_core::{CoreError, ErrorReporter, IdeaRecord, Platform, RuntimeSettings, ScrapeStatus};
use ingestion::{Orchestrator, ProgressCallback};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const LISTING_LIMIT: usize = 10;

#[derive(Parser)]
#[command(name = "ideascout")]
#[command(about = "Find product ideas people are asking for on Reddit and Twitter")]
struct Cli {
    /// Settings file; defaults apply when it does not exist
    #[arg(long, default_value = "ideascout.toml")]
    config: PathBuf,

    /// Cache database URL (overrides the settings file and IDEASCOUT_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = RuntimeSettings::load(&cli.config)?.with_env_overrides();
    if let Some(url) = cli.database_url {
        settings.database_url = url;
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(cli.log_filter.as_deref().unwrap_or(&settings.log_filter))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Ideascout");

    let reporter = ErrorReporter::new();
    let store = SqliteCacheStore::connect(&settings.database_url)
        .await
        .map_err(|e| report(&reporter, e))?;
    let fetchers = platform_clients::default_fetchers(&settings).map_err(|e| report(&reporter, e))?;

    let orchestrator = Orchestrator::new()
        .with_fetchers(fetchers)
        .with_timeout(Duration::from_secs(settings.scrape_timeout_seconds));
    let progress: ProgressCallback = Arc::new(|platform: Platform, status: ScrapeStatus| {
        tracing::info!("{} {}", platform.display_name(), status);
    });
    let driver = ConversationDriver::new(Arc::new(store.clone()), orchestrator)
        .with_progress(progress);

    run_chat(&driver, &settings).await?;

    store.close().await;
    tracing::info!("Ideascout stopped");
    Ok(())
}

fn report(reporter: &ErrorReporter, error: CoreError) -> CoreError {
    reporter.report_error(&error);
    error
}

async fn run_chat(driver: &ConversationDriver, settings: &RuntimeSettings) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let greeting = driver.handle("", None, settings.platforms.clone()).await;
    print_response(&greeting);
    let mut state: Option<ConversationState> = Some(greeting.new_state);

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
            break;
        }

        let response = driver
            .handle(input, state.take(), settings.platforms.clone())
            .await;
        print_response(&response);
        state = Some(response.new_state);
    }

    Ok(())
}

fn print_response(response: &ConversationResponse) {
    println!("{}", response.message);
    if let Some(ideas) = &response.ideas {
        print_ideas(ideas);
    }
}

fn print_ideas(ideas: &[IdeaRecord]) {
    for (index, idea) in ideas.iter().take(LISTING_LIMIT).enumerate() {
        println!(
            "{:>2}. [{} {}] {} ({}, engagement {:.1})",
            index + 1,
            idea.platform().display_name(),
            idea.source,
            idea.title,
            idea.category.label(),
            idea.engagement
        );
        println!("    {}", idea.url);
    }
    if ideas.len() > LISTING_LIMIT {
        println!("    ... and {} more", ideas.len() - LISTING_LIMIT);
    }
}
