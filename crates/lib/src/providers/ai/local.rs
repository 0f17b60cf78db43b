use crate::{
    errors::PromptError,
    providers::ai::{AiProvider, TextStream},
};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{future, StreamExt};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, warn};

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct LocalAiRequest<'a> {
    messages: Vec<LocalAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f32,
    max_tokens: i32,
    stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct LocalAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct LocalAiResponse {
    choices: Vec<LocalAiChoice>,
}

#[derive(Deserialize, Debug)]
struct LocalAiChoice {
    message: LocalAiMessage,
}

#[derive(Deserialize, Debug)]
struct LocalAiChunk {
    #[serde(default)]
    choices: Vec<LocalAiChunkChoice>,
}

#[derive(Deserialize, Debug)]
struct LocalAiChunkChoice {
    #[serde(default)]
    delta: LocalAiDelta,
}

#[derive(Deserialize, Debug, Default)]
struct LocalAiDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Marks the end of an OpenAI-style event stream.
const STREAM_DONE: &str = "[DONE]";

// --- Local Provider implementation ---

/// A provider for interacting with a local or OpenAI-compatible API.
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
}

impl LocalAiProvider {
    /// Creates a new `LocalAiProvider`.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }

    async fn send(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        stream: bool,
    ) -> Result<reqwest::Response, PromptError> {
        let messages = vec![
            LocalAiMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            },
            LocalAiMessage {
                role: "user".to_string(),
                content: user_prompt.to_string(),
            },
        ];

        let request_body = LocalAiRequest {
            messages,
            model: self.model.as_deref(),
            temperature: 0.2,
            max_tokens: 4096,
            stream,
        };

        let mut request_builder = self.client.post(&self.api_url);

        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        debug!(api_url = %self.api_url, stream, "--> Sending chat completion request");

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(error_text));
        }

        Ok(response)
    }
}

/// Pulls the text delta out of one event payload. Chunks without content
/// (role announcements, usage frames) yield `None`.
fn chunk_content(data: &str) -> Option<Result<String, PromptError>> {
    match serde_json::from_str::<LocalAiChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(Ok),
        Err(e) => {
            warn!("Undecodable stream chunk: {e}");
            Some(Err(PromptError::JsonSerialization(e)))
        }
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let response = self.send(system_prompt, user_prompt, false).await?;

        let local_ai_response: LocalAiResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        let raw_response = local_ai_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(raw_response)
    }

    async fn generate_stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<TextStream, PromptError> {
        let response = self.send(system_prompt, user_prompt, true).await?;

        let stream = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| {
                let done = matches!(event, Ok(event) if event.data.trim() == STREAM_DONE);
                future::ready(!done)
            })
            .filter_map(|event| {
                future::ready(match event {
                    Ok(event) => chunk_content(&event.data),
                    Err(e) => Some(Err(PromptError::AiStream(e.to_string()))),
                })
            })
            .boxed();

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_content_reads_delta() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(chunk_content(data).unwrap().unwrap(), "Hel");
    }

    #[test]
    fn test_chunk_content_skips_role_only_chunks() {
        let data = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert!(chunk_content(data).is_none());
        assert!(chunk_content(r#"{"choices":[]}"#).is_none());
    }

    #[test]
    fn test_chunk_content_reports_garbage() {
        assert!(matches!(
            chunk_content("not json"),
            Some(Err(PromptError::JsonSerialization(_)))
        ));
    }
}
