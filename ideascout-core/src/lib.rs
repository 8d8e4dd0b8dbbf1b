pub mod classifier;
pub mod error;
pub mod error_utils;
pub mod fetcher;
pub mod query;
pub mod settings;
pub mod types;

pub use error::*;
pub use error_utils::*;
pub use fetcher::PlatformFetcher;
pub use query::{CategoryFilter, IdeaQuery, PlatformFilter, SortOrder};
pub use settings::RuntimeSettings;
pub use types::*;
