//! # hearth-search
//!
//! Zero-configuration web search for the hearth assistant.
//!
//! Scrapes the HTML-only DuckDuckGo endpoint directly, so there are no API
//! keys to provision and no extra service to run next to the assistant.
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners; this is a library, not a server
//! - Search queries are logged only at trace level

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod types;

pub use config::SearchConfig;
pub use engine::SearchEngineTrait;
pub use error::{Result, SearchError};
pub use types::SearchResult;

use engines::DuckDuckGoEngine;

/// Search the web and return up to `config.max_results` results in the
/// order the engine ranked them.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration or a blank
/// query, [`SearchError::Http`] when the engine cannot be reached, and
/// [`SearchError::Parse`] when its response cannot be parsed.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> hearth_search::Result<()> {
/// let config = hearth_search::SearchConfig::default();
/// let results = hearth_search::search("weather tomorrow", &config).await?;
/// for result in &results {
///     println!("{}: {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
    config.validate()?;
    if query.trim().is_empty() {
        return Err(SearchError::Config("query must not be empty".into()));
    }
    DuckDuckGoEngine.search(query.trim(), config).await
}

/// Search the web with the default configuration.
///
/// # Errors
///
/// Same as [`search`].
pub async fn search_default(query: &str) -> Result<Vec<SearchResult>> {
    search(query, &SearchConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_zero_max_results() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_results"));
    }

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_rejects_blank_query() {
        let result = search("   ", &SearchConfig::default()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }
}
