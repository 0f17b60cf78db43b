use super::{api_error, build_client, SearchProvider, SearchResult};
use crate::errors::SearchError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

pub const SERPER_URL: &str = "https://google.serper.dev/search";
const NAME: &str = "serper";

#[derive(Deserialize, Debug)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Deserialize, Debug)]
struct SerperOrganic {
    title: Option<String>,
    link: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
    description: Option<String>,
}

/// Google results through serper.dev.
#[derive(Clone, Debug)]
pub struct SerperProvider {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl SerperProvider {
    pub fn new(api_key: String) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client()?,
            api_key,
            url: SERPER_URL.to_string(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Runs a query and returns Serper's JSON untouched.
    pub async fn search_raw(&self, query: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|source| SearchError::Request {
                provider: NAME,
                source,
            })?;

        if !response.status().is_success() {
            return Err(api_error(NAME, response).await);
        }

        response.json().await.map_err(|e| SearchError::Parse {
            provider: NAME,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let raw = self.search_raw(query).await?;
        let parsed: SerperResponse =
            serde_json::from_value(raw).map_err(|e| SearchError::Parse {
                provider: NAME,
                message: e.to_string(),
            })?;
        debug!(count = parsed.organic.len(), "Serper organic results");

        Ok(parsed
            .organic
            .into_iter()
            .take(max_results)
            .map(|item| {
                let url = item.link.or(item.url).unwrap_or_default();
                SearchResult::new(
                    item.title.as_deref(),
                    url,
                    item.snippet.as_deref().or(item.description.as_deref()),
                )
            })
            .collect())
    }
}
