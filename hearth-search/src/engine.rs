//! Trait definition for search engine backends.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::SearchResult;

/// A search engine backend.
///
/// Implementors build the request, send it and parse the engine's HTML
/// response into [`SearchResult`] values. All implementations must be
/// `Send + Sync` so a search can run on any runtime worker.
pub trait SearchEngineTrait: Send + Sync {
    /// Perform a web search and return parsed results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the HTTP request fails or the response
    /// cannot be parsed.
    fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Human-readable engine name, used in logs.
    fn name(&self) -> &'static str;
}
