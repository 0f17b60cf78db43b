//! # Web Search Providers
//!
//! Sources for the fact-checking context. Each provider maps its own API onto
//! [`SearchResult`]; [`SearchChain`] tries them in priority order.

pub mod chain;
pub mod duckduckgo;
pub mod serper;
pub mod tavily;

pub use chain::{SearchChain, WebSearchOutcome, DEFAULT_MAX_RESULTS};
pub use duckduckgo::DuckDuckGoProvider;
pub use serper::SerperProvider;
pub use tavily::TavilyProvider;

use crate::errors::SearchError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub const NO_TITLE: &str = "No title";
pub const NO_SNIPPET: &str = "No snippet available";

/// Some providers reject requests without a browser-like agent.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchResult {
    /// Builds a result, substituting placeholders for blank titles and snippets.
    pub fn new(title: Option<&str>, url: impl Into<String>, snippet: Option<&str>) -> Self {
        fn non_blank<'a>(value: Option<&'a str>, fallback: &'a str) -> String {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }
        Self {
            title: non_blank(title, NO_TITLE),
            url: url.into(),
            snippet: non_blank(snippet, NO_SNIPPET),
        }
    }
}

/// A trait for web search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync + Debug + DynClone {
    /// A short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Returns at most `max_results` results. An empty vector means the
    /// provider had nothing, which is not an error.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResult>, SearchError>;
}

dyn_clone::clone_trait_object!(SearchProvider);

fn default_duckduckgo() -> bool {
    true
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Which providers to enable and where they live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub serper_api_key: Option<String>,
    #[serde(default)]
    pub tavily_api_key: Option<String>,
    #[serde(default = "default_duckduckgo")]
    pub duckduckgo: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub serper_url: Option<String>,
    #[serde(default)]
    pub tavily_url: Option<String>,
    #[serde(default)]
    pub duckduckgo_url: Option<String>,
    #[serde(default)]
    pub duckduckgo_html_url: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            serper_api_key: None,
            tavily_api_key: None,
            duckduckgo: default_duckduckgo(),
            max_results: default_max_results(),
            serper_url: None,
            tavily_url: None,
            duckduckgo_url: None,
            duckduckgo_html_url: None,
        }
    }
}

/// Reads the body of a failed response into a `SearchError::Api`.
pub(crate) async fn api_error(provider: &'static str, response: reqwest::Response) -> SearchError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SearchError::Api {
        provider,
        status,
        body,
    }
}

pub(crate) fn build_client() -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .build()
        .map_err(SearchError::ReqwestClientBuild)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_placeholders() {
        let result = SearchResult::new(Some("  "), "https://a.example", None);
        assert_eq!(result.title, NO_TITLE);
        assert_eq!(result.snippet, NO_SNIPPET);

        let result = SearchResult::new(Some(" Title "), "https://a.example", Some("text"));
        assert_eq!(result.title, "Title");
        assert_eq!(result.snippet, "text");
    }

    #[test]
    fn test_search_config_defaults() {
        let config: SearchConfig = serde_json::from_str("{}").unwrap();
        assert!(config.duckduckgo);
        assert_eq!(config.max_results, DEFAULT_MAX_RESULTS);
        assert!(config.serper_api_key.is_none());
    }
}
