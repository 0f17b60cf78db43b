//! # Search Fallback Chain

use super::{
    DuckDuckGoProvider, SearchConfig, SearchProvider, SearchResult, SerperProvider,
    TavilyProvider,
};
use crate::errors::SearchError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_MAX_RESULTS: usize = 5;
const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";
const FALLBACK_SNIPPET: &str = "No automatic search results available. Configure a Serper or Tavily API key for better results, or search manually.";

/// The answer to one `web_search` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchOutcome {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub count: usize,
    pub message: String,
}

/// Providers in priority order.
#[derive(Debug, Clone, Default)]
pub struct SearchChain {
    providers: Vec<Box<dyn SearchProvider>>,
}

impl SearchChain {
    pub fn new(providers: Vec<Box<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    /// Serper, then Tavily, then DuckDuckGo, skipping whatever is not configured.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();
        if let Some(key) = config.serper_api_key.clone().filter(|k| !k.is_empty()) {
            let mut provider = SerperProvider::new(key)?;
            if let Some(url) = &config.serper_url {
                provider = provider.with_url(url.clone());
            }
            providers.push(Box::new(provider));
        }
        if let Some(key) = config.tavily_api_key.clone().filter(|k| !k.is_empty()) {
            let mut provider = TavilyProvider::new(key)?;
            if let Some(url) = &config.tavily_url {
                provider = provider.with_url(url.clone());
            }
            providers.push(Box::new(provider));
        }
        if config.duckduckgo {
            let provider = DuckDuckGoProvider::new()?.with_urls(
                config.duckduckgo_url.clone(),
                config.duckduckgo_html_url.clone(),
            );
            providers.push(Box::new(provider));
        }
        Ok(Self { providers })
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Returns the first non-empty provider answer. Never empty: when every
    /// provider fails, a single result points at a manual Google search.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        for provider in &self.providers {
            match provider.search(query, max_results).await {
                Ok(mut results) if !results.is_empty() => {
                    info!(provider = provider.name(), count = results.len(), "Web search succeeded");
                    results.truncate(max_results);
                    return Ok(results);
                }
                Ok(_) => info!(provider = provider.name(), "Web search returned nothing"),
                Err(e) => warn!(provider = provider.name(), "Web search failed: {e}"),
            }
        }
        Ok(vec![fallback_result(query)?])
    }

    /// Validates the query, searches and wraps the results.
    pub async fn web_search(
        &self,
        query: &str,
        max_results: Option<usize>,
    ) -> Result<WebSearchOutcome, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS).max(1);
        let results = self.search(query, max_results).await?;
        let count = results.len();
        let message = if count > 0 {
            format!("Found {count} search result(s) for \"{query}\"")
        } else {
            format!("No results found for \"{query}\"")
        };
        Ok(WebSearchOutcome {
            query: query.to_string(),
            results,
            count,
            message,
        })
    }
}

fn fallback_result(query: &str) -> Result<SearchResult, SearchError> {
    let url = Url::parse_with_params(GOOGLE_SEARCH_URL, &[("q", query)])?;
    Ok(SearchResult {
        title: format!("Search results for: {query}"),
        url: url.to_string(),
        snippet: FALLBACK_SNIPPET.to_string(),
    })
}
