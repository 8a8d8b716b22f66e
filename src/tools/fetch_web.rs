//! Fetch one page with its full text through the crawler service.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::crawl_web::crawl_option_properties;
use super::types::{Tool, ToolError, ToolResult, optional_bool, optional_enum, optional_u32, required_url};
use crate::crawl::{CrawlClient, CrawlRequest, DigestMode, WaitUntil, shape};

/// Renders a single page and returns its fuller text (still capped).
pub struct FetchWebTool {
    client: CrawlClient,
}

impl FetchWebTool {
    pub fn new(client: CrawlClient) -> Self {
        Self { client }
    }
}

/// Build the single-page request from the model's arguments. Redirects off
/// the starting origin are allowed.
pub fn fetch_request_from_args(args: &Value) -> Result<CrawlRequest, ToolError> {
    let url = required_url(args, "url")?;
    let request = CrawlRequest {
        same_origin_only: false,
        wait_until: optional_enum(args, "waitUntil")?.unwrap_or(WaitUntil::DomContentLoaded),
        include_links: optional_bool(args, "includeLinks")?.unwrap_or(true),
        include_html: optional_bool(args, "includeHtml")?.unwrap_or(false),
        timeout_secs: optional_u32(args, "timeoutSecs")?.unwrap_or(30),
        user_agent: args
            .get("userAgent")
            .and_then(Value::as_str)
            .map(str::to_owned),
        ..CrawlRequest::single_page(url)
    };
    request.validate().map_err(ToolError::InvalidArguments)?;
    Ok(request)
}

#[async_trait]
impl Tool for FetchWebTool {
    fn name(&self) -> &str {
        "fetch_web"
    }

    fn description(&self) -> &str {
        "Render and extract a single page (JavaScript-capable). \
         Returns fuller text for the page than crawl_web."
    }

    fn schema(&self) -> Value {
        let mut props = crawl_option_properties();
        props.insert(
            "url".into(),
            json!({"type": "string", "description": "Absolute http(s) URL of the page"}),
        );
        json!({
            "type": "object",
            "properties": props,
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let request = fetch_request_from_args(&args)?;
        match self.client.post_crawl(&request).await {
            Ok(result) => Ok(ToolResult::success(shape(&result, DigestMode::Fetch))),
            Err(e) => {
                tracing::warn!(error = %e, "fetch failed");
                Ok(ToolResult::failure(format!("Fetch failed: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_request_shape() {
        let req = match fetch_request_from_args(&json!({"url": "https://example.com/a"})) {
            Ok(r) => r,
            Err(e) => unreachable!("should build: {e}"),
        };
        assert_eq!(req.start_urls, vec!["https://example.com/a"]);
        assert_eq!(req.max_pages, 1);
        assert_eq!(req.max_depth, 0);
        assert_eq!(req.concurrency, 1);
        assert!(!req.same_origin_only);
        assert!(req.include_links);
    }

    #[test]
    fn timeout_outside_service_range_rejected() {
        let err = fetch_request_from_args(&json!({"url": "https://a.test", "timeoutSecs": 500}));
        assert!(matches!(err, Err(ToolError::InvalidArguments(m)) if m.contains("timeoutSecs")));
    }
}
