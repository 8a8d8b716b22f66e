//! Error types for the hearth-search crate.
//!
//! Messages are stable and safe to show to users or hand to a language
//! model as a tool result.

/// Errors that can occur during a web search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The HTTP request to the search engine failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The search engine response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration or query.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for hearth-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("unexpected HTML structure".into());
        assert_eq!(err.to_string(), "parse error: unexpected HTML structure");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("max_results must be > 0".into());
        assert_eq!(err.to_string(), "config error: max_results must be > 0");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
