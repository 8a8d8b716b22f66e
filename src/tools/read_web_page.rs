//! Read a single page through the crawler service.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::types::{Tool, ToolError, ToolResult, required_url};
use crate::crawl::{CrawlClient, CrawlRequest, DigestMode, shape};

/// Renders one page and returns its visible text.
///
/// # Arguments (JSON)
///
/// - `url` (string, required): absolute http(s) URL
pub struct ReadWebPageTool {
    client: CrawlClient,
    timeout_secs: u32,
}

impl ReadWebPageTool {
    pub fn new(client: CrawlClient) -> Self {
        Self {
            client,
            timeout_secs: 30,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Request sent for `url`: one same-origin page, no links, no HTML.
    pub fn request_for(&self, url: &str) -> CrawlRequest {
        CrawlRequest::single_page(url)
            .with_same_origin_only(true)
            .with_include_links(false)
            .with_timeout_secs(self.timeout_secs)
    }
}

#[async_trait]
impl Tool for ReadWebPageTool {
    fn name(&self) -> &str {
        "read_web_page"
    }

    fn description(&self) -> &str {
        "Render a web page locally and return its visible text."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL of the page to read"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let url = required_url(&args, "url")?;
        match self.client.post_crawl(&self.request_for(url)).await {
            Ok(result) => {
                let digest = shape(&result, DigestMode::Fetch);
                tracing::debug!(url, chars = digest.chars().count(), "page read");
                Ok(ToolResult::success(digest))
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "page read failed");
                Ok(ToolResult::failure(format!("Could not read {url}: {e}")))
            }
        }
    }
}
