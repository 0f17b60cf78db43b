//! DuckDuckGo needs no API key. The Instant Answer API is tried first; when it
//! has nothing, the HTML results page is scraped.

use super::{api_error, build_client, SearchProvider, SearchResult, BROWSER_USER_AGENT};
use crate::errors::SearchError;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

pub const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const NAME: &str = "duckduckgo";

#[derive(Deserialize, Debug, Default)]
struct InstantAnswer {
    #[serde(rename = "Heading", default)]
    heading: Option<String>,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: Option<String>,
    #[serde(rename = "AbstractText", default)]
    abstract_text: Option<String>,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// Category groups come through here too; they have no `FirstURL` and are skipped.
#[derive(Deserialize, Debug)]
struct RelatedTopic {
    #[serde(rename = "FirstURL", default)]
    first_url: Option<String>,
    #[serde(rename = "Text", default)]
    text: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl InstantAnswer {
    fn into_results(self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = self
            .related_topics
            .iter()
            .take(max_results)
            .filter_map(|topic| {
                let url = non_empty(&topic.first_url)?;
                let text = non_empty(&topic.text)?;
                let title = text.split(" - ").next().filter(|t| !t.is_empty()).unwrap_or(text);
                Some(SearchResult::new(Some(title), url, Some(text)))
            })
            .collect();

        if let (Some(url), Some(text)) = (non_empty(&self.abstract_url), non_empty(&self.abstract_text)) {
            if results.len() < max_results {
                let heading = non_empty(&self.heading).unwrap_or(query);
                results.insert(0, SearchResult::new(Some(heading), url, Some(text)));
            }
        }

        results.truncate(max_results);
        results
    }
}

/// Pairs `a.result__a` links with `a.result__snippet` texts by position.
fn parse_html_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let (Ok(link_selector), Ok(snippet_selector)) = (
        Selector::parse("a.result__a"),
        Selector::parse("a.result__snippet"),
    ) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let snippets: Vec<String> = document
        .select(&snippet_selector)
        .map(|s| s.text().collect::<String>().trim().to_string())
        .collect();

    document
        .select(&link_selector)
        .take(max_results)
        .enumerate()
        .filter_map(|(i, anchor)| {
            let url = anchor.value().attr("href")?.trim();
            let title = anchor.text().collect::<String>();
            let title = title.trim();
            if url.is_empty() || title.is_empty() {
                return None;
            }
            Some(SearchResult::new(
                Some(title),
                url,
                snippets.get(i).map(String::as_str),
            ))
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    url: String,
    html_url: String,
}

impl DuckDuckGoProvider {
    pub fn new() -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client()?,
            url: DUCKDUCKGO_URL.to_string(),
            html_url: DUCKDUCKGO_HTML_URL.to_string(),
        })
    }

    pub fn with_urls(mut self, url: Option<String>, html_url: Option<String>) -> Self {
        if let Some(url) = url {
            self.url = url;
        }
        if let Some(html_url) = html_url {
            self.html_url = html_url;
        }
        self
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, SearchError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|source| SearchError::Request {
                provider: NAME,
                source,
            })?;
        if !response.status().is_success() {
            return Err(api_error(NAME, response).await);
        }
        Ok(response)
    }

    async fn instant_answer(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let params = [
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ];
        let response = self.get(&self.url, &params).await?;
        let answer: InstantAnswer = response.json().await.map_err(|e| SearchError::Parse {
            provider: NAME,
            message: e.to_string(),
        })?;
        Ok(answer.into_results(query, max_results))
    }

    async fn html_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self.get(&self.html_url, &[("q", query)]).await?;
        let html = response.text().await.map_err(|e| SearchError::Parse {
            provider: NAME,
            message: e.to_string(),
        })?;
        Ok(parse_html_results(&html, max_results))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        match self.instant_answer(query, max_results).await {
            Ok(results) if !results.is_empty() => return Ok(results),
            Ok(_) => debug!("Instant Answer API had no results, trying HTML endpoint"),
            Err(e) => warn!("Instant Answer API failed, trying HTML endpoint: {e}"),
        }
        self.html_search(query, max_results).await
    }
}
