//! Search configuration with sensible defaults.

use crate::error::SearchError;

/// Default DuckDuckGo HTML endpoint.
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Configuration for a web search.
///
/// Use [`Default::default()`] and override individual fields as needed.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of results to return.
    pub max_results: usize,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Whether to request safe search filtering.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Search endpoint. Overridable so tests can point at a mock server.
    pub endpoint: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            timeout_seconds: 8,
            safe_search: true,
            user_agent: None,
            endpoint: DUCKDUCKGO_HTML_URL.to_owned(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] when `max_results` or
    /// `timeout_seconds` is zero, or the endpoint is not an http(s) URL.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(SearchError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}
