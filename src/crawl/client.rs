//! HTTP client for the crawler service.

use super::types::{CrawlRequest, CrawlResult};
use std::time::Duration;

/// Connect timeout for every crawler request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Floor for the derived read timeout.
const MIN_READ_TIMEOUT_SECS: u64 = 10;

/// Slack added on top of the browser timeout so the service can answer
/// with its own error before we give up.
const READ_TIMEOUT_SLACK_SECS: u64 = 5;

/// Errors from a crawl call.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Connection, timeout or transport failure.
    #[error("crawler unreachable: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("crawler returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The body was not a crawl result.
    #[error("invalid crawler response: {0}")]
    Decode(String),

    /// The request violates the service's limits; nothing was sent.
    #[error("invalid crawl request: {0}")]
    InvalidRequest(String),
}

/// Read timeout for a request whose browser timeout is `timeout_secs`.
pub fn read_timeout(timeout_secs: u32) -> Duration {
    Duration::from_secs(MIN_READ_TIMEOUT_SECS.max(u64::from(timeout_secs) + READ_TIMEOUT_SLACK_SECS))
}

/// Client for `POST /crawl`.
#[derive(Debug, Clone)]
pub struct CrawlClient {
    endpoint: String,
    http: reqwest::Client,
}

impl CrawlClient {
    /// Client for the crawl endpoint at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Network`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CrawlError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CrawlError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a crawl and decode the result.
    ///
    /// # Errors
    ///
    /// See [`CrawlError`]. There is no retry.
    pub async fn post_crawl(&self, request: &CrawlRequest) -> Result<CrawlResult, CrawlError> {
        request.validate().map_err(CrawlError::InvalidRequest)?;

        let timeout = read_timeout(request.timeout_secs);
        tracing::debug!(
            endpoint = %self.endpoint,
            urls = ?request.start_urls,
            max_pages = request.max_pages,
            timeout_secs = timeout.as_secs(),
            "posting crawl request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| CrawlError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CrawlError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "crawler returned error status");
            return Err(CrawlError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let result: CrawlResult =
            serde_json::from_str(&body).map_err(|e| CrawlError::Decode(e.to_string()))?;
        tracing::debug!(pages = result.pages.len(), "crawl complete");
        Ok(result)
    }

    /// `GET /health` on the crawl endpoint's origin. True only for
    /// `{"ok": true}`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Network`] when the service cannot be reached and
    /// [`CrawlError::InvalidRequest`] when the endpoint is not a URL.
    pub async fn health(&self) -> Result<bool, CrawlError> {
        let mut url = url::Url::parse(&self.endpoint)
            .map_err(|e| CrawlError::InvalidRequest(format!("bad endpoint: {e}")))?;
        url.set_path("/health");
        url.set_query(None);

        let response = self
            .http
            .get(url)
            .timeout(Duration::from_secs(MIN_READ_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| CrawlError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return Ok(false),
        };
        Ok(body.get("ok").and_then(serde_json::Value::as_bool) == Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_timeout_has_floor_and_slack() {
        assert_eq!(read_timeout(1), Duration::from_secs(10));
        assert_eq!(read_timeout(5), Duration::from_secs(10));
        assert_eq!(read_timeout(30), Duration::from_secs(35));
        assert_eq!(read_timeout(120), Duration::from_secs(125));
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_sending() {
        let client = match CrawlClient::new("http://127.0.0.1:9/crawl") {
            Ok(c) => c,
            Err(e) => unreachable!("client should build: {e}"),
        };
        let err = client.post_crawl(&CrawlRequest::default()).await;
        assert!(matches!(err, Err(CrawlError::InvalidRequest(_))));
    }

    #[test]
    fn http_error_display_carries_status_and_body() {
        let err = CrawlError::Http {
            status: 400,
            body: "{\"error\":\"Invalid request\"}".into(),
        };
        let text = err.to_string();
        assert!(text.contains("400"));
        assert!(text.contains("Invalid request"));
    }
}
