//! # Metadata Cache
//!
//! Keeps the derived render of each message so an unchanged message is not
//! sanitized and decoded again on every read. The cache is owned by whoever
//! owns the conversation; nothing here is global.

use crate::metadata::MetadataBlock;
use crate::render::{render, Rendered};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone)]
struct CacheEntry {
    digest: [u8; 16],
    rendered: Rendered,
}

/// Derived renders keyed by message id, invalidated by a content digest.
#[derive(Debug, Clone, Default)]
pub struct MetadataCache {
    entries: HashMap<String, CacheEntry>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the render of `raw` for `message_id`, recomputing it only when
    /// the text differs from what was cached.
    pub fn get_or_render(&mut self, message_id: &str, raw: &str) -> &Rendered {
        let digest = md5::compute(raw.as_bytes()).0;
        let stale = self
            .entries
            .get(message_id)
            .map_or(true, |entry| entry.digest != digest);

        if stale {
            trace!(message_id, "Rendering message for cache");
            self.entries.insert(
                message_id.to_string(),
                CacheEntry {
                    digest,
                    rendered: render(raw),
                },
            );
        }
        &self.entries[message_id].rendered
    }

    /// The cached metadata for a message, if it has been rendered and has any.
    pub fn metadata(&self, message_id: &str) -> Option<&MetadataBlock> {
        self.entries
            .get(message_id)
            .and_then(|entry| entry.rendered.metadata.as_ref())
    }

    pub fn invalidate(&mut self, message_id: &str) {
        self.entries.remove(message_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
