//! # Conversations
//!
//! Ordered chat messages, the per-message metadata derived from them, and
//! the side-panel selection that goes with a conversation. Persistence keeps
//! only the raw message text; everything else here is derived on read.

pub mod cache;
pub mod panel;

pub use cache::MetadataCache;
pub use panel::SidePanel;

use crate::metadata::MetadataBlock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One part of a message. Only text parts contribute to the message text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    ToolResult { name: String, output: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub parts: Vec<MessagePart>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A single-text-part message with a fresh id.
    pub fn from_text(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            parts: vec![MessagePart::Text { text: text.into() }],
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// All text parts, concatenated.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { text } => Some(text.as_str()),
                MessagePart::ToolResult { .. } => None,
            })
            .collect()
    }
}

/// The text of the nearest user message before `index`.
pub fn originating_user_prompt(messages: &[ChatMessage], index: usize) -> Option<String> {
    messages
        .get(..index)?
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
        .map(ChatMessage::text)
}

/// A message as a client should show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedMessage {
    pub id: String,
    pub role: Role,
    pub display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    pub messages: Vec<AnnotatedMessage>,
    pub first_with_metadata: Option<String>,
    pub latest_with_metadata: Option<String>,
}

impl Annotations {
    pub fn get(&self, message_id: &str) -> Option<&AnnotatedMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }
}

/// Renders every message. Assistant replies are sanitized and carry their
/// metadata with the originating user prompt attached; other roles pass
/// through as-is.
pub fn annotate(messages: &[ChatMessage], cache: &mut MetadataCache) -> Annotations {
    let mut annotations = Annotations::default();

    for (index, message) in messages.iter().enumerate() {
        let raw = message.text();
        if message.role != Role::Assistant {
            annotations.messages.push(AnnotatedMessage {
                id: message.id.clone(),
                role: message.role,
                display: raw,
                metadata: None,
            });
            continue;
        }

        let rendered = cache.get_or_render(&message.id, &raw);
        let metadata = rendered.metadata.clone().map(|block| {
            block.with_originating_prompt(originating_user_prompt(messages, index))
        });
        if metadata.is_some() {
            if annotations.first_with_metadata.is_none() {
                annotations.first_with_metadata = Some(message.id.clone());
            }
            annotations.latest_with_metadata = Some(message.id.clone());
        }
        annotations.messages.push(AnnotatedMessage {
            id: message.id.clone(),
            role: message.role,
            display: rendered.display.clone(),
            metadata,
        });
    }

    annotations
}

/// What a client receives for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationView {
    pub id: String,
    pub messages: Vec<AnnotatedMessage>,
    pub selected_message_id: Option<String>,
}

/// A conversation with its derived state.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    id: String,
    messages: Vec<ChatMessage>,
    cache: MetadataCache,
    panel: SidePanel,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn panel(&self) -> &SidePanel {
        &self.panel
    }

    /// Appends a message and lets the side panel follow any new metadata.
    pub fn push(&mut self, message: ChatMessage) {
        let is_assistant = message.role == Role::Assistant;
        self.messages.push(message);
        if is_assistant {
            let annotations = self.annotate();
            self.panel.follow(&annotations);
        }
    }

    pub fn annotate(&mut self) -> Annotations {
        annotate(&self.messages, &mut self.cache)
    }

    /// Toggles the side panel for a message. Returns whether it is open.
    pub fn toggle_panel(&mut self, message_id: &str) -> bool {
        let annotations = self.annotate();
        let has_metadata = annotations
            .get(message_id)
            .is_some_and(|m| m.metadata.is_some());
        self.panel.toggle(message_id, has_metadata)
    }

    pub fn view(&mut self) -> ConversationView {
        let annotations = self.annotate();
        ConversationView {
            id: self.id.clone(),
            messages: annotations.messages,
            selected_message_id: self.panel.selected().map(str::to_string),
        }
    }
}
