//! Search result type.

use serde::{Deserialize, Serialize};

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result, with any engine redirect wrapper removed.
    pub url: String,
    /// A text snippet summarising the page.
    pub snippet: String,
}
