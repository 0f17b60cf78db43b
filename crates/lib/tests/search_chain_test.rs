//! # Web Search Chain Tests
//!
//! Runs the Serper, Tavily and DuckDuckGo providers against `wiremock`
//! servers and checks how the chain falls through between them.

mod common;

use anyhow::Result;
use common::setup_tracing;
use serde_json::json;
use sourcecheck::errors::SearchError;
use sourcecheck::providers::search::{
    DuckDuckGoProvider, SearchChain, SearchConfig, SearchProvider, SerperProvider,
    TavilyProvider, NO_SNIPPET,
};
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

async fn mount_serper(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "serper-key"))
        .and(body_partial_json(json!({"q": "rust release"})))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_serper_maps_organic_results() -> Result<()> {
    setup_tracing();
    let server = MockServer::start().await;
    mount_serper(
        &server,
        200,
        json!({
            "organic": [
                {"title": "Rust 1.0", "link": "https://a.example", "snippet": "Released 2015"},
                {"url": "https://b.example", "description": "Second"},
                {"title": "Third", "link": "https://c.example"}
            ]
        }),
    )
    .await;

    let provider =
        SerperProvider::new("serper-key".to_string())?.with_url(format!("{}/search", server.uri()));
    let results = provider.search("rust release", 2).await?;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Rust 1.0");
    assert_eq!(results[0].url, "https://a.example");
    assert_eq!(results[1].title, "No title");
    assert_eq!(results[1].url, "https://b.example");
    assert_eq!(results[1].snippet, "Second");
    Ok(())
}

#[tokio::test]
async fn test_serper_failure_falls_through_to_tavily() -> Result<()> {
    setup_tracing();
    let server = MockServer::start().await;
    mount_serper(&server, 500, json!({"message": "boom"})).await;
    Mock::given(method("POST"))
        .and(path("/tavily"))
        .and(body_partial_json(json!({
            "api_key": "tavily-key",
            "query": "rust release",
            "search_depth": "basic",
            "max_results": 3,
            "include_answer": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "From Tavily", "url": "https://t.example", "content": "Tavily content"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = SearchConfig {
        serper_api_key: Some("serper-key".to_string()),
        tavily_api_key: Some("tavily-key".to_string()),
        duckduckgo: false,
        serper_url: Some(format!("{}/search", server.uri())),
        tavily_url: Some(format!("{}/tavily", server.uri())),
        ..Default::default()
    };
    let chain = SearchChain::from_config(&config)?;
    let outcome = chain.web_search("rust release", Some(3)).await?;

    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.results[0].title, "From Tavily");
    assert_eq!(outcome.results[0].snippet, "Tavily content");
    assert_eq!(outcome.message, "Found 1 search result(s) for \"rust release\"");
    Ok(())
}

#[tokio::test]
async fn test_serper_api_error_is_reported() -> Result<()> {
    let server = MockServer::start().await;
    mount_serper(&server, 401, json!({"message": "bad key"})).await;

    let provider =
        SerperProvider::new("serper-key".to_string())?.with_url(format!("{}/search", server.uri()));
    let err = provider.search("rust release", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::Api { status: 401, .. }));
    Ok(())
}

#[tokio::test]
async fn test_duckduckgo_falls_back_to_html() -> Result<()> {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instant"))
        .and(query_param("q", "rust release"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Heading": "",
            "AbstractURL": "",
            "AbstractText": "",
            "RelatedTopics": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .and(query_param("q", "rust release"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <div class="result">
                  <a class="result__a" href="https://d.example">Duck result</a>
                  <a class="result__snippet">Duck snippet</a>
                </div>
                <div class="result">
                  <a class="result__a" href="https://e.example">Another</a>
                </div>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::new()?.with_urls(
        Some(format!("{}/instant", server.uri())),
        Some(format!("{}/html", server.uri())),
    );
    let results = provider.search("rust release", 5).await?;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Duck result");
    assert_eq!(results[0].url, "https://d.example");
    assert_eq!(results[0].snippet, "Duck snippet");
    assert_eq!(results[1].snippet, NO_SNIPPET);
    Ok(())
}

#[tokio::test]
async fn test_all_providers_failing_yields_google_link() -> Result<()> {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tavily = TavilyProvider::new("tavily-key".to_string())?
        .with_url(format!("{}/tavily", server.uri()));
    let duck = DuckDuckGoProvider::new()?.with_urls(
        Some(format!("{}/instant", server.uri())),
        Some(format!("{}/html", server.uri())),
    );
    let chain = SearchChain::new(vec![Box::new(tavily), Box::new(duck)]);
    let outcome = chain.web_search("what is rust?", None).await?;

    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.results[0].title, "Search results for: what is rust?");
    assert_eq!(
        outcome.results[0].url,
        "https://www.google.com/search?q=what+is+rust%3F"
    );
    Ok(())
}
