use futures::stream::{self, StreamExt};
use sourcecheck::errors::{PromptError, SearchError};
use sourcecheck::providers::ai::{AiProvider, TextStream};
use sourcecheck::providers::search::{SearchProvider, SearchResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

pub mod fixtures;

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    chunk_size: usize,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            chunk_size: 7,
        }
    }

    /// How many characters each streamed delta carries.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Pre-programs a response. The key should be a unique substring of the
    /// user prompt; an empty key matches every call.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, system_prompt: &str, user_prompt: &str) -> Result<String, PromptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        let mut matches: Vec<(&String, &String)> = responses
            .iter()
            .filter(|(key, _)| user_prompt.contains(key.as_str()))
            .collect();
        // The most specific key wins over the catch-all.
        matches.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));
        matches
            .first()
            .map(|(_, response)| (*response).clone())
            .ok_or_else(|| {
                PromptError::AiApi(format!(
                    "MockAiProvider: No response programmed for user prompt. Got: '{user_prompt}'"
                ))
            })
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        self.respond(system_prompt, user_prompt)
    }

    async fn generate_stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<TextStream, PromptError> {
        let response = self.respond(system_prompt, user_prompt)?;
        let chunks = fixtures::chunk_text(&response, self.chunk_size);
        Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

// --- Mock Search Provider ---

#[derive(Clone, Debug)]
pub struct MockSearchProvider {
    name: &'static str,
    results: Option<Vec<SearchResult>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearchProvider {
    /// A provider that always returns `results`.
    pub fn with_results(name: &'static str, results: Vec<SearchResult>) -> Self {
        Self {
            name,
            results: Some(results),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider whose every call fails.
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            results: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        match &self.results {
            Some(results) => Ok(results.iter().take(max_results).cloned().collect()),
            None => Err(SearchError::Api {
                provider: self.name,
                status: 503,
                body: "mock outage".to_string(),
            }),
        }
    }
}
