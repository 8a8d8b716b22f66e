//! Tools the model can call.
//!
//! Each tool implements [`Tool`]: a name, a description, a JSON Schema for
//! its arguments and an async `execute`. Tools never fail the turn; errors
//! reach the model as a plain-language [`ToolResult`].

pub mod crawl_web;
pub mod delegate;
pub mod fetch_web;
pub mod read_web_page;
pub mod registry;
pub mod types;
pub mod weather;
pub mod web_search;

pub use crawl_web::CrawlWebTool;
pub use delegate::AgentTool;
pub use fetch_web::FetchWebTool;
pub use read_web_page::ReadWebPageTool;
pub use registry::ToolRegistry;
pub use types::{Tool, ToolError, ToolResult};
pub use weather::WeatherTool;
pub use web_search::WebSearchTool;

use std::sync::Arc;

use crate::config::HearthConfig;
use crate::crawl::CrawlClient;

/// Registry holding every built-in tool, wired from `config`.
///
/// # Errors
///
/// Returns [`ToolError::Execution`] if the crawler client cannot be built.
pub fn builtin_registry(config: &HearthConfig) -> Result<ToolRegistry, ToolError> {
    let crawler = CrawlClient::new(config.crawler.url.clone())
        .map_err(|e| ToolError::Execution(e.to_string()))?;
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearchTool::new(
        config.search.to_search_config(),
    )));
    registry.register(Arc::new(
        ReadWebPageTool::new(crawler.clone())
            .with_timeout_secs(config.crawler.read_page_timeout_secs),
    ));
    registry.register(Arc::new(CrawlWebTool::new(crawler.clone())));
    registry.register(Arc::new(FetchWebTool::new(crawler)));
    registry.register(Arc::new(WeatherTool));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_has_every_tool() {
        let registry = match builtin_registry(&HearthConfig::default()) {
            Ok(r) => r,
            Err(e) => unreachable!("registry should build: {e}"),
        };
        assert_eq!(
            registry.list_available(),
            vec![
                "crawl_web",
                "fetch_web",
                "get_weather",
                "read_web_page",
                "web_search"
            ]
        );
    }
}
