//! User-facing reply text.

use ideascout_core::{AppConfig, Category, Platform, SortOrder};

pub const COMMANDS: &str = "Commands: scrape, filter <category|reddit|twitter|all>, \
sort <newest|popular|trending>, search <term>, settings";

pub fn setup_instructions() -> String {
    format!(
        "Welcome to Ideascout! No platform is enabled yet.\n\
         Enable Reddit or Twitter in your settings file, then say \"scrape\".\n\
         Say \"settings\" to review the current configuration.\n{COMMANDS}"
    )
}

pub fn welcome_back(config: &AppConfig, cached: usize) -> String {
    let platforms = config
        .enabled_platforms()
        .iter()
        .map(Platform::display_name)
        .collect::<Vec<_>>()
        .join(" and ");
    let cache_line = match cached {
        0 => "No ideas are cached yet. Say \"scrape\" to fetch some.".to_string(),
        1 => "You have 1 cached idea.".to_string(),
        n => format!("You have {n} cached ideas."),
    };
    format!("Connected to {platforms}. {cache_line}\n{COMMANDS}")
}

pub fn help() -> String {
    format!("I didn't catch that.\n{COMMANDS}")
}

pub fn settings_summary(config: &AppConfig) -> String {
    let mut lines = vec!["Current configuration:".to_string()];
    for platform in Platform::ALL {
        lines.push(platform_line(config, platform));
    }
    lines.push("Edit your settings file to change platforms. Say \"back\" when done.".to_string());
    lines.join("\n")
}

fn platform_line(config: &AppConfig, platform: Platform) -> String {
    let platform_config = config.platform(platform);
    let state = if platform_config.enabled {
        "enabled"
    } else {
        "disabled"
    };
    let detail = match platform {
        Platform::Reddit => {
            let subreddits = platform_config.list_setting("subreddits");
            if subreddits.is_empty() {
                "default subreddits".to_string()
            } else {
                format!("subreddits: {}", subreddits.join(", "))
            }
        }
        Platform::Twitter => match platform_config.setting("bearer_token") {
            Some(_) => "bearer token set".to_string(),
            None => "bearer token missing".to_string(),
        },
    };
    format!("- {}: {} ({})", platform.display_name(), state, detail)
}

pub fn no_platform_enabled() -> String {
    "No platform is enabled. Enable Reddit or Twitter in settings before scraping.".to_string()
}

pub fn scrape_summary(count: usize, errors: &[String]) -> String {
    let mut message = match count {
        0 => "The scrape finished but found no ideas.".to_string(),
        1 => "Found 1 fresh idea.".to_string(),
        n => format!("Found {n} fresh ideas."),
    };
    if !errors.is_empty() {
        message.push_str(&format!("\nSome platforms failed: {}", errors.join("; ")));
    }
    message
}

pub fn scrape_failed(reason: &str) -> String {
    format!("Scraping failed. {reason}")
}

pub fn unknown_filter() -> String {
    let keys = Category::ALL
        .iter()
        .map(Category::key)
        .collect::<Vec<_>>()
        .join(", ");
    format!("I couldn't tell which filter you meant. Try one of: all, reddit, twitter, {keys}")
}

pub fn category_filtered(count: usize, category: Category) -> String {
    format!("Found {} in {}", ideas(count), category.label())
}

pub fn platform_filtered(count: usize, platform: Platform) -> String {
    format!("Found {} from {}", ideas(count), platform.display_name())
}

pub fn filters_cleared(count: usize) -> String {
    format!("Showing all {}", ideas(count))
}

pub fn sorted(count: usize, order: SortOrder) -> String {
    format!("Sorted {} by {}", ideas(count), order)
}

pub fn search_guidance() -> String {
    "Tell me what to look for, for example \"search habit tracker\".".to_string()
}

pub fn search_results(count: usize, term: &str) -> String {
    match count {
        0 => format!("No ideas match \"{term}\". Try another term or scrape again."),
        _ => format!("Found {} matching \"{term}\"", ideas(count)),
    }
}

fn ideas(count: usize) -> String {
    match count {
        1 => "1 idea".to_string(),
        n => format!("{n} ideas"),
    }
}
