//! # Chat Handlers
//!
//! One chat turn: search the web for the user's message, ask the AI
//! provider for a sourced reply, and store both turns in the conversation.
//! The reply is stored raw; display text and metadata are derived from it.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{channel::mpsc, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sourcecheck::{
    conversation::{AnnotatedMessage, ChatMessage, Conversation, Role},
    prompts::core::{build_system_prompt, build_user_prompt, RequestHints},
    StreamingMessage,
};
use std::convert::Infallible;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ChatRequest {
    /// Continues an existing conversation; a new one is started when absent.
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub hints: Option<RequestHints>,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub message: AnnotatedMessage,
    pub selected_message_id: Option<String>,
}

/// Everything needed to call the AI provider for one turn.
struct PreparedTurn {
    conversation_id: String,
    system_prompt: String,
    user_prompt: String,
    search_count: usize,
}

/// Searches, records the user message and builds both prompts.
///
/// A failed search is not fatal; the model is told there are no results.
async fn prepare_turn(app_state: &AppState, request: ChatRequest) -> Result<PreparedTurn, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let results = match app_state
        .search
        .search(message, app_state.config.search.max_results.max(1))
        .await
    {
        Ok(results) => results,
        Err(e) => {
            warn!("Web search for chat turn failed: {e}");
            Vec::new()
        }
    };

    let conversation_id = request
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let history = {
        let mut store = app_state.conversations.lock().await;
        let conversation = store
            .entry(conversation_id.clone())
            .or_insert_with(|| Conversation::new(conversation_id.clone()));
        let history = conversation.messages().to_vec();
        conversation.push(ChatMessage::from_text(Role::User, message));
        history
    };

    Ok(PreparedTurn {
        system_prompt: build_system_prompt(
            &app_state.config.prompts.system_prompt,
            request.hints.as_ref(),
        ),
        user_prompt: build_user_prompt(&history, &results, message),
        search_count: results.len(),
        conversation_id,
    })
}

/// Appends the finished reply and returns it as the client should show it.
async fn store_reply(
    app_state: &AppState,
    conversation_id: &str,
    reply: ChatMessage,
) -> anyhow::Result<ChatResponse> {
    let message_id = reply.id.clone();
    let mut store = app_state.conversations.lock().await;
    let conversation = store
        .entry(conversation_id.to_string())
        .or_insert_with(|| Conversation::new(conversation_id));
    conversation.push(reply);

    let annotations = conversation.annotate();
    let message = annotations
        .get(&message_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Stored reply {message_id} is missing"))?;
    Ok(ChatResponse {
        conversation_id: conversation_id.to_string(),
        message,
        selected_message_id: conversation.panel().selected().map(str::to_string),
    })
}

/// Handler for `POST /chat`: one buffered turn.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let turn = prepare_turn(&app_state, payload).await?;
    info!(conversation_id = %turn.conversation_id, "Generating chat reply");

    let raw = app_state
        .ai_provider
        .generate(&turn.system_prompt, &turn.user_prompt)
        .await?;
    let reply = ChatMessage::from_text(Role::Assistant, raw);
    let response = store_reply(&app_state, &turn.conversation_id, reply).await?;

    let debug_info = json!({
        "search_results": turn.search_count,
        "system_prompt": turn.system_prompt,
        "user_prompt": turn.user_prompt,
    });
    Ok(wrap_response(response, debug_params, Some(debug_info)))
}

fn json_event(name: &str, payload: &impl Serialize) -> Event {
    Event::default()
        .event(name)
        .data(serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string()))
}

/// Handler for `POST /chat/stream`: the same turn as server-sent events.
///
/// - `delta`: `{display, metadata?}` re-rendered from the whole buffer.
/// - `end`: the stored reply, shaped like the `/chat` result.
/// - `error`: `{error}` when the provider fails; nothing is stored.
///
/// If the client goes away mid-stream the reply is abandoned unstored.
pub async fn chat_stream_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + Send>, AppError> {
    let turn = prepare_turn(&app_state, payload).await?;
    info!(conversation_id = %turn.conversation_id, "Streaming chat reply");

    let (tx, rx) = mpsc::unbounded::<Event>();
    tokio::spawn(async move {
        let mut stream = match app_state
            .ai_provider
            .generate_stream(&turn.system_prompt, &turn.user_prompt)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                warn!("AI provider stream failed to start: {e}");
                let _ = tx.unbounded_send(json_event("error", &json!({ "error": e.to_string() })));
                return;
            }
        };

        let mut message = StreamingMessage::new(Uuid::new_v4().to_string());
        while let Some(delta) = stream.next().await {
            match delta {
                Ok(delta) => {
                    if delta.is_empty() {
                        continue;
                    }
                    let rendered = message.push_delta(&delta);
                    if tx.unbounded_send(json_event("delta", rendered)).is_err() {
                        info!(message_id = message.id(), "Client disconnected; abandoning reply");
                        return;
                    }
                }
                Err(e) => {
                    warn!("AI provider stream failed: {e}");
                    let _ =
                        tx.unbounded_send(json_event("error", &json!({ "error": e.to_string() })));
                    return;
                }
            }
        }

        let finalized = message.finalize();
        let reply = ChatMessage::from_text(Role::Assistant, finalized.raw).with_id(finalized.id);
        let event = match store_reply(&app_state, &turn.conversation_id, reply).await {
            Ok(response) => json_event("end", &response),
            Err(e) => {
                warn!("Failed to store streamed reply: {e:#}");
                json_event("error", &json!({ "error": "Failed to store reply" }))
            }
        };
        let _ = tx.unbounded_send(event);
    });

    Ok(Sse::new(rx.map(Ok::<_, Infallible>)).keep_alive(KeepAlive::default()))
}
