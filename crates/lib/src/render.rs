//! # Rendering Streamed Replies
//!
//! Glue between a transport that delivers text deltas and the metadata
//! engine, which must always see the whole accumulated text.

use crate::metadata::{extract, sanitize, MetadataBlock};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to show for a reply right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    pub display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataBlock>,
}

/// Derives display text and metadata from a raw reply.
pub fn render(raw: &str) -> Rendered {
    Rendered {
        display: sanitize(raw),
        metadata: extract(raw),
    }
}

/// A completed reply: the raw text is what gets stored, the metadata is
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedMessage {
    pub id: String,
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataBlock>,
}

/// The growing buffer of one assistant reply.
///
/// Dropping it mid-stream is how a cancelled reply is abandoned.
#[derive(Debug, Clone, Default)]
pub struct StreamingMessage {
    id: String,
    buffer: String,
    last: Rendered,
}

impl StreamingMessage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw text received so far.
    pub fn raw(&self) -> &str {
        &self.buffer
    }

    /// The most recent render.
    pub fn current(&self) -> &Rendered {
        &self.last
    }

    /// Appends a delta and re-renders the whole buffer.
    pub fn push_delta(&mut self, delta: &str) -> &Rendered {
        if !delta.is_empty() {
            self.buffer.push_str(delta);
            self.last = render(&self.buffer);
            debug!(
                message_id = %self.id,
                raw_len = self.buffer.len(),
                display_len = self.last.display.len(),
                has_metadata = self.last.metadata.is_some(),
                "Re-rendered streaming message"
            );
        }
        &self.last
    }

    /// Ends the stream, keeping the raw text and its metadata.
    pub fn finalize(self) -> FinalizedMessage {
        FinalizedMessage {
            id: self.id,
            raw: self.buffer,
            metadata: self.last.metadata,
        }
    }
}
