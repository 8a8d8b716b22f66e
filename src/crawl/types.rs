//! Wire types for the crawler service.

use serde::{Deserialize, Serialize};

/// Page lifecycle event the browser waits for before extracting content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    #[default]
    DomContentLoaded,
    NetworkIdle,
}

/// Body of `POST /crawl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub start_urls: Vec<String>,
    pub max_pages: u32,
    pub max_depth: u32,
    pub same_origin_only: bool,
    pub concurrency: u32,
    pub wait_until: WaitUntil,
    pub include_links: bool,
    pub include_html: bool,
    pub timeout_secs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for CrawlRequest {
    fn default() -> Self {
        Self {
            start_urls: Vec::new(),
            max_pages: 25,
            max_depth: 2,
            same_origin_only: true,
            concurrency: 3,
            wait_until: WaitUntil::default(),
            include_links: true,
            include_html: false,
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl CrawlRequest {
    /// Request for the given start URLs with service defaults.
    pub fn new(start_urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            start_urls: start_urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Render a single page without following links.
    pub fn single_page(url: impl Into<String>) -> Self {
        Self {
            max_pages: 1,
            max_depth: 0,
            concurrency: 1,
            ..Self::new([url.into()])
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_same_origin_only(mut self, same_origin_only: bool) -> Self {
        self.same_origin_only = same_origin_only;
        self
    }

    pub fn with_concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_include_links(mut self, include_links: bool) -> Self {
        self.include_links = include_links;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    /// Check the request against the limits the service enforces.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated limit.
    pub fn validate(&self) -> Result<(), String> {
        if self.start_urls.is_empty() {
            return Err("startUrls must contain at least one URL".into());
        }
        for raw in &self.start_urls {
            match url::Url::parse(raw) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                _ => return Err(format!("startUrls entry is not an http(s) URL: {raw}")),
            }
        }
        check_range("maxPages", self.max_pages, 1, 500)?;
        check_range("maxDepth", self.max_depth, 0, 10)?;
        check_range("concurrency", self.concurrency, 1, 10)?;
        check_range("timeoutSecs", self.timeout_secs, 5, 120)?;
        Ok(())
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), String> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be between {min} and {max}, got {value}"))
    }
}

/// Response of `POST /crawl`.
///
/// Every field is optional on decode; the service echoes the request
/// parameters alongside the pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrawlResult {
    pub started_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub start_urls: Vec<String>,
    pub max_pages: Option<u32>,
    pub max_depth: Option<u32>,
    pub same_origin_only: Option<bool>,
    pub count: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub pages: Vec<Page>,
}

/// One crawled page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Page {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// HTTP status as reported by the service; `null` when the browser got
    /// no response.
    pub status: serde_json::Value,
    pub title: Option<String>,
    pub h1: Option<String>,
    pub meta_description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub headings: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    pub html: Option<String>,
}

/// Decodes an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_camel_case_without_absent_user_agent() {
        let req = CrawlRequest::single_page("https://example.com")
            .with_include_links(false)
            .with_same_origin_only(true);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "startUrls": ["https://example.com"],
                "maxPages": 1,
                "maxDepth": 0,
                "sameOriginOnly": true,
                "concurrency": 1,
                "waitUntil": "domcontentloaded",
                "includeLinks": false,
                "includeHtml": false,
                "timeoutSecs": 30
            })
        );
    }

    #[test]
    fn user_agent_serialized_when_present() {
        let req = CrawlRequest {
            user_agent: Some("HearthBot".into()),
            ..CrawlRequest::new(["https://example.com"])
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["userAgent"], "HearthBot");
    }

    #[test]
    fn defaults_match_service() {
        let req = CrawlRequest::default();
        assert_eq!(req.max_pages, 25);
        assert_eq!(req.max_depth, 2);
        assert_eq!(req.concurrency, 3);
        assert_eq!(req.timeout_secs, 30);
        assert!(req.same_origin_only);
        assert!(req.include_links);
        assert!(!req.include_html);
    }

    #[test]
    fn validate_limits() {
        assert!(CrawlRequest::new(["https://example.com"]).validate().is_ok());
        assert!(CrawlRequest::default().validate().is_err());
        assert!(CrawlRequest::new(["file:///etc/passwd"]).validate().is_err());
        let err = CrawlRequest::new(["https://example.com"])
            .with_max_pages(501)
            .validate()
            .unwrap_err();
        assert!(err.contains("maxPages"));
        let err = CrawlRequest::new(["https://example.com"])
            .with_timeout_secs(4)
            .validate()
            .unwrap_err();
        assert!(err.contains("timeoutSecs"));
        assert!(
            CrawlRequest::new(["https://example.com"])
                .with_concurrency(0)
                .validate()
                .is_err()
        );
        assert!(
            CrawlRequest::new(["https://example.com"])
                .with_max_depth(11)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn result_decodes_sparse_payload() {
        let result: CrawlResult = serde_json::from_value(json!({
            "startedAt": "2026-01-01T00:00:00.000Z",
            "count": 1,
            "pages": [{"url": "https://example.com", "status": null, "text": "hi"}]
        }))
        .unwrap();
        assert_eq!(result.count, Some(1));
        assert_eq!(result.pages.len(), 1);
        assert!(result.pages[0].status.is_null());
        assert!(result.pages[0].headings.is_empty());
        assert!(result.pages[0].title.is_none());
    }

    #[test]
    fn result_tolerates_null_pages() {
        let result: CrawlResult =
            serde_json::from_value(json!({"startUrls": null, "count": 0, "pages": null})).unwrap();
        assert!(result.pages.is_empty());
        assert!(result.start_urls.is_empty());
    }

    #[test]
    fn page_tolerates_null_text_and_url() {
        let page: Page = serde_json::from_value(json!({
            "url": null,
            "status": 200,
            "text": null
        }))
        .unwrap();
        assert_eq!(page.url, "");
        assert_eq!(page.text, "");
        assert_eq!(page.status, json!(200));
    }

    #[test]
    fn page_tolerates_null_headings_and_links() {
        let page: Page = serde_json::from_value(json!({
            "url": "https://example.com",
            "headings": null,
            "links": null,
            "text": "aaa"
        }))
        .unwrap();
        assert!(page.headings.is_empty());
        assert!(page.links.is_empty());
        assert_eq!(page.text, "aaa");
    }
}
