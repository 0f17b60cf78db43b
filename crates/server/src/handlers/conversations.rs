//! # Conversation Handlers

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sourcecheck::conversation::{ChatMessage, Conversation, ConversationView, Role};
use tracing::info;

#[derive(Deserialize)]
pub struct AppendMessageRequest {
    pub role: Role,
    pub text: String,
}

#[derive(Deserialize)]
pub struct SelectMessageRequest {
    pub message_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct SelectMessageResponse {
    pub selected_message_id: Option<String>,
    pub open: bool,
}

/// Handler for `GET /conversations/{id}`.
pub async fn get_conversation_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ConversationView>>, AppError> {
    let mut store = app_state.conversations.lock().await;
    let conversation = store
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("Conversation '{id}' not found")))?;
    Ok(wrap_response(conversation.view(), debug_params, None))
}

/// Handler for `POST /conversations/{id}/messages`.
///
/// Stores a raw message as-is, e.g. when a client restores saved history.
pub async fn append_message_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<AppendMessageRequest>,
) -> Result<Json<ApiResponse<ConversationView>>, AppError> {
    info!(conversation_id = %id, role = ?payload.role, "Appending message");
    let mut store = app_state.conversations.lock().await;
    let conversation = store
        .entry(id.clone())
        .or_insert_with(|| Conversation::new(id));
    conversation.push(ChatMessage::from_text(payload.role, payload.text));
    Ok(wrap_response(conversation.view(), debug_params, None))
}

/// Handler for `POST /conversations/{id}/select`: toggles the side panel.
pub async fn select_message_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<SelectMessageRequest>,
) -> Result<Json<ApiResponse<SelectMessageResponse>>, AppError> {
    let mut store = app_state.conversations.lock().await;
    let conversation = store
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("Conversation '{id}' not found")))?;
    let open = conversation.toggle_panel(&payload.message_id);
    let response = SelectMessageResponse {
        selected_message_id: conversation.panel().selected().map(str::to_string),
        open,
    };
    Ok(wrap_response(response, debug_params, None))
}
