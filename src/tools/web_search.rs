//! Web search tool backed by [`hearth_search`].
//!
//! Returns only the result URLs, one per line, so the model follows up with
//! `read_web_page` instead of answering from snippets.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::types::{Tool, ToolError, ToolResult, required_str};

/// Searches the web and lists result URLs.
///
/// # Arguments (JSON)
///
/// - `query` (string, required): intent first, then context
pub struct WebSearchTool {
    config: hearth_search::SearchConfig,
}

impl WebSearchTool {
    pub fn new(config: hearth_search::SearchConfig) -> Self {
        Self { config }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(hearth_search::SearchConfig::default())
    }
}

/// Format result URLs the way the model expects: each on its own line,
/// preceded by a newline.
pub fn format_urls(results: &[hearth_search::SearchResult]) -> String {
    results.iter().map(|r| format!("\n{}", r.url)).collect()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the internet for current facts and information. \
         Format the query with the intent first, then the context. \
         Returns a list of URLs; read them with read_web_page."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query, intent first, then context"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&args, "query")?;

        let results = match hearth_search::search(query, &self.config).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "web search failed");
                return Ok(ToolResult::failure(format!("Web search failed: {e}")));
            }
        };
        tracing::info!(count = results.len(), "web search complete");

        if results.is_empty() {
            return Ok(ToolResult::success(format!(
                "No results found for \"{query}\"."
            )));
        }

        let urls = format_urls(&results);
        tracing::debug!(query, urls = %urls, "web search results");
        Ok(ToolResult::success(urls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_query() {
        let schema = WebSearchTool::default().schema();
        assert_eq!(schema["required"][0], "query");
    }

    #[test]
    fn urls_each_on_new_line() {
        let results = vec![
            hearth_search::SearchResult {
                title: "A".into(),
                url: "https://a.test/".into(),
                snippet: String::new(),
            },
            hearth_search::SearchResult {
                title: "B".into(),
                url: "https://b.test/".into(),
                snippet: String::new(),
            },
        ];
        assert_eq!(format_urls(&results), "\nhttps://a.test/\nhttps://b.test/");
    }

    #[tokio::test]
    async fn missing_query_is_invalid() {
        let result = WebSearchTool::default().execute(json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn unreachable_engine_becomes_failure_text() {
        let tool = WebSearchTool::new(hearth_search::SearchConfig {
            endpoint: "http://127.0.0.1:9/html/".into(),
            timeout_seconds: 2,
            ..Default::default()
        });
        let result = match tool.execute(json!({"query": "weather"})).await {
            Ok(r) => r,
            Err(e) => unreachable!("transport errors are results: {e}"),
        };
        assert!(!result.success);
        assert!(result.into_model_text().starts_with("Web search failed"));
    }
}
