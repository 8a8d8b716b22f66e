//! Crawl a site through the crawler service.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::types::{Tool, ToolError, ToolResult, optional_bool, optional_enum, optional_u32};
use crate::crawl::{CrawlClient, CrawlRequest, DigestMode, WaitUntil, shape};

/// Renders and crawls pages starting from one or more URLs, returning a
/// summary of each page plus a sample of its links.
pub struct CrawlWebTool {
    client: CrawlClient,
}

impl CrawlWebTool {
    pub fn new(client: CrawlClient) -> Self {
        Self { client }
    }
}

/// Build the crawl request from the model's arguments. Unset fields take the
/// tool's defaults: five pages, depth one, same origin, three workers.
pub fn crawl_request_from_args(args: &Value) -> Result<CrawlRequest, ToolError> {
    let start_urls: Vec<String> = args
        .get("startUrls")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::InvalidArguments("missing required argument 'startUrls'".into()))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.trim().to_owned())
                .ok_or_else(|| ToolError::InvalidArguments("startUrls must be strings".into()))
        })
        .collect::<Result<_, _>>()?;

    let request = CrawlRequest {
        start_urls,
        max_pages: optional_u32(args, "maxPages")?.unwrap_or(5),
        max_depth: optional_u32(args, "maxDepth")?.unwrap_or(1),
        same_origin_only: optional_bool(args, "sameOriginOnly")?.unwrap_or(true),
        concurrency: optional_u32(args, "concurrency")?.unwrap_or(3),
        wait_until: optional_enum(args, "waitUntil")?.unwrap_or(WaitUntil::DomContentLoaded),
        include_links: optional_bool(args, "includeLinks")?.unwrap_or(true),
        include_html: optional_bool(args, "includeHtml")?.unwrap_or(false),
        timeout_secs: optional_u32(args, "timeoutSecs")?.unwrap_or(30),
        user_agent: args
            .get("userAgent")
            .and_then(Value::as_str)
            .map(str::to_owned),
    };
    request.validate().map_err(ToolError::InvalidArguments)?;
    Ok(request)
}

/// Schema properties shared by the crawl and fetch tools.
pub(crate) fn crawl_option_properties() -> serde_json::Map<String, Value> {
    let props = json!({
        "waitUntil": {
            "type": "string",
            "enum": ["load", "domcontentloaded", "networkidle"],
            "description": "Page event to wait for before extracting (default domcontentloaded)"
        },
        "includeLinks": {"type": "boolean", "description": "Include discovered links (default true)"},
        "includeHtml": {"type": "boolean", "description": "Include raw HTML (default false)"},
        "timeoutSecs": {"type": "integer", "minimum": 5, "maximum": 120, "description": "Per-page browser timeout (default 30)"},
        "userAgent": {"type": "string", "description": "Override the browser User-Agent"}
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

#[async_trait]
impl Tool for CrawlWebTool {
    fn name(&self) -> &str {
        "crawl_web"
    }

    fn description(&self) -> &str {
        "Render and crawl pages (JavaScript-capable) starting from the given URLs. \
         Returns structured summaries of pages plus a sample of links."
    }

    fn schema(&self) -> Value {
        let mut props = crawl_option_properties();
        props.insert(
            "startUrls".into(),
            json!({"type": "array", "items": {"type": "string"}, "minItems": 1,
                   "description": "Absolute http(s) URLs to start from"}),
        );
        props.insert(
            "maxPages".into(),
            json!({"type": "integer", "minimum": 1, "maximum": 500, "description": "Pages to visit (default 5)"}),
        );
        props.insert(
            "maxDepth".into(),
            json!({"type": "integer", "minimum": 0, "maximum": 10, "description": "Link depth to follow (default 1)"}),
        );
        props.insert(
            "sameOriginOnly".into(),
            json!({"type": "boolean", "description": "Stay on the start URLs' origins (default true)"}),
        );
        props.insert(
            "concurrency".into(),
            json!({"type": "integer", "minimum": 1, "maximum": 10, "description": "Parallel browser pages (default 3)"}),
        );
        json!({
            "type": "object",
            "properties": props,
            "required": ["startUrls"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let request = crawl_request_from_args(&args)?;
        match self.client.post_crawl(&request).await {
            Ok(result) => {
                tracing::info!(pages = result.pages.len(), "crawl complete");
                Ok(ToolResult::success(shape(&result, DigestMode::Crawl)))
            }
            Err(e) => {
                tracing::warn!(error = %e, "crawl failed");
                Ok(ToolResult::failure(format!("Crawl failed: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let req = match crawl_request_from_args(&json!({"startUrls": ["https://example.com"]})) {
            Ok(r) => r,
            Err(e) => unreachable!("should build: {e}"),
        };
        assert_eq!(req.max_pages, 5);
        assert_eq!(req.max_depth, 1);
        assert!(req.same_origin_only);
        assert_eq!(req.concurrency, 3);
        assert!(req.include_links);
        assert!(!req.include_html);
        assert_eq!(req.timeout_secs, 30);
        assert!(req.user_agent.is_none());
    }

    #[test]
    fn overrides_applied() {
        let req = crawl_request_from_args(&json!({
            "startUrls": ["https://example.com"],
            "maxPages": 12,
            "waitUntil": "networkidle",
            "sameOriginOnly": false,
            "userAgent": "HearthBot"
        }));
        let req = match req {
            Ok(r) => r,
            Err(e) => unreachable!("should build: {e}"),
        };
        assert_eq!(req.max_pages, 12);
        assert_eq!(req.wait_until, WaitUntil::NetworkIdle);
        assert!(!req.same_origin_only);
        assert_eq!(req.user_agent.as_deref(), Some("HearthBot"));
    }

    #[test]
    fn invalid_arguments_rejected() {
        assert!(crawl_request_from_args(&json!({})).is_err());
        assert!(crawl_request_from_args(&json!({"startUrls": []})).is_err());
        assert!(crawl_request_from_args(&json!({"startUrls": [1]})).is_err());
        assert!(
            crawl_request_from_args(&json!({"startUrls": ["https://a.test"], "waitUntil": "never"}))
                .is_err()
        );
        assert!(
            crawl_request_from_args(&json!({"startUrls": ["https://a.test"], "maxPages": 0}))
                .is_err()
        );
    }

    #[test]
    fn schema_lists_start_urls() {
        let client = match CrawlClient::new("http://127.0.0.1:9/crawl") {
            Ok(c) => c,
            Err(e) => unreachable!("client should build: {e}"),
        };
        let schema = CrawlWebTool::new(client).schema();
        assert_eq!(schema["required"][0], "startUrls");
        assert_eq!(schema["properties"]["startUrls"]["type"], "array");
        assert_eq!(schema["properties"]["waitUntil"]["enum"][2], "networkidle");
    }
}
