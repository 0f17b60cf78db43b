use super::{api_error, build_client, SearchProvider, SearchResult};
use crate::errors::SearchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const TAVILY_URL: &str = "https://api.tavily.com/search";
const NAME: &str = "tavily";

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
}

#[derive(Deserialize, Debug)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize, Debug)]
struct TavilyResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
    snippet: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TavilyProvider {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl TavilyProvider {
    pub fn new(api_key: String) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client()?,
            api_key,
            url: TAVILY_URL.to_string(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            max_results,
            include_answer: false,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|source| SearchError::Request {
                provider: NAME,
                source,
            })?;

        if !response.status().is_success() {
            return Err(api_error(NAME, response).await);
        }

        let parsed: TavilyResponse = response.json().await.map_err(|e| SearchError::Parse {
            provider: NAME,
            message: e.to_string(),
        })?;

        Ok(parsed
            .results
            .into_iter()
            .take(max_results)
            .map(|item| {
                SearchResult::new(
                    item.title.as_deref(),
                    item.url.unwrap_or_default(),
                    item.content.as_deref().or(item.snippet.as_deref()),
                )
            })
            .collect())
    }
}
