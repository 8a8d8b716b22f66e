//! DuckDuckGo HTML search.
//!
//! Uses the JavaScript-free endpoint at `https://html.duckduckgo.com/html/`,
//! which tolerates automated requests.

use crate::config::SearchConfig;
use crate::engine::SearchEngineTrait;
use crate::error::SearchError;
use crate::http;
use crate::types::SearchResult;
use scraper::{Html, Selector};
use url::Url;

/// DuckDuckGo HTML search engine scraper.
pub struct DuckDuckGoEngine;

impl DuckDuckGoEngine {
    /// Resolve a result link to its destination.
    ///
    /// DuckDuckGo wraps outbound links as
    /// `//duckduckgo.com/l/?uddg=<encoded target>&rut=...`; the target is the
    /// decoded `uddg` parameter. Plain absolute links pass through.
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_owned()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

impl SearchEngineTrait for DuckDuckGoEngine {
    async fn search(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "DuckDuckGo search");

        let client = http::build_client(config)?;

        let mut params = vec![("q", query)];
        if config.safe_search {
            params.push(("kp", "1"));
        }

        let response = client
            .post(&config.endpoint)
            .form(&params)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("DuckDuckGo response read failed: {e}")))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        parse_duckduckgo_html(&html, config.max_results)
    }

    fn name(&self) -> &'static str {
        "DuckDuckGo"
    }
}

/// Parse a DuckDuckGo HTML results page, skipping ads and results without
/// a usable title or link.
pub fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_owned();
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el
            .value()
            .attr("href")
            .and_then(DuckDuckGoEngine::extract_url)
        else {
            continue;
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet,
        });
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_DDG_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="result results_links results_links_deep web-result result--ad">
    <a class="result__a" href="https://ads.example.com/buy">Sponsored thermostat deal</a>
    <div class="result__snippet">Buy now.</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.weather.gov%2F&amp;rut=abc123">
        National Weather Service
    </a>
    <div class="result__snippet">
        Forecasts, warnings and radar for the United States.
    </div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://www.montcopa.org/">
        Montgomery County, PA
    </a>
    <div class="result__snippet">
        Official county website.
    </div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FConshohocken%2C_Pennsylvania&amp;rut=def456">
        Conshohocken, Pennsylvania - Wikipedia
    </a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a">No link here</a>
</div>
</body>
</html>"#;

    #[test]
    fn extract_url_from_ddg_redirect() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        let result = DuckDuckGoEngine::extract_url(href);
        assert_eq!(result, Some("https://example.com/page".to_owned()));
    }

    #[test]
    fn extract_url_direct_link() {
        let href = "https://example.com/direct";
        let result = DuckDuckGoEngine::extract_url(href);
        assert_eq!(result, Some("https://example.com/direct".to_owned()));
    }

    #[test]
    fn extract_url_invalid() {
        assert!(DuckDuckGoEngine::extract_url("not-a-url").is_none());
    }

    #[test]
    fn parse_mock_html_skips_ads_and_linkless_results() {
        let results = match parse_duckduckgo_html(MOCK_DDG_HTML, 10) {
            Ok(r) => r,
            Err(e) => unreachable!("mock html should parse: {e}"),
        };
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "National Weather Service");
        assert_eq!(results[0].url, "https://www.weather.gov/");
        assert!(results[0].snippet.contains("radar"));

        assert_eq!(results[1].url, "https://www.montcopa.org/");

        assert!(results[2].url.contains("wikipedia.org"));
        assert!(results[2].snippet.is_empty());
    }

    #[test]
    fn parse_respects_max_results() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 2);
        assert_eq!(results.map(|r| r.len()).unwrap_or(0), 2);
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let results = parse_duckduckgo_html("<html><body></body></html>", 10);
        assert!(matches!(results, Ok(ref r) if r.is_empty()));
    }

    #[test]
    fn engine_name() {
        assert_eq!(DuckDuckGoEngine.name(), "DuckDuckGo");
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DuckDuckGoEngine>();
    }
}
