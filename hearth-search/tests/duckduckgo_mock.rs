//! Runs the DuckDuckGo engine against a local mock server.

use hearth_search::{SearchConfig, search};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULTS_HTML: &str = r#"<html><body>
<div class="result results_links results_links_deep web-result">
  <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fone&amp;rut=x">One</a>
  <div class="result__snippet">first</div>
</div>
<div class="result results_links results_links_deep web-result">
  <a class="result__a" href="https://example.com/two">Two</a>
  <div class="result__snippet">second</div>
</div>
</body></html>"#;

fn config_for(server: &MockServer) -> SearchConfig {
    SearchConfig {
        endpoint: format!("{}/html/", server.uri()),
        ..Default::default()
    }
}

#[tokio::test]
async fn posts_query_form_and_parses_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html/"))
        .and(body_string_contains("q=local+news"))
        .and(body_string_contains("kp=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let results = match search("local news", &config_for(&server)).await {
        Ok(r) => r,
        Err(e) => unreachable!("search should succeed: {e}"),
    };

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://example.com/one");
    assert_eq!(results[1].title, "Two");
}

#[tokio::test]
async fn safe_search_off_omits_kp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let config = SearchConfig {
        safe_search: false,
        max_results: 1,
        ..config_for(&server)
    };
    let results = search("anything", &config).await;
    assert_eq!(results.map(|r| r.len()).unwrap_or(0), 1);

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("kp="));
}

#[tokio::test]
async fn server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = search("anything", &config_for(&server)).await;
    assert!(matches!(err, Err(hearth_search::SearchError::Http(_))));
}
