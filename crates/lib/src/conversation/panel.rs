//! # Side Panel Selection
//!
//! Which reply's provenance is open in the side panel.

use super::Annotations;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePanel {
    selected: Option<String>,
}

impl SidePanel {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    /// Handles a tap on a message. Messages without metadata are ignored;
    /// tapping the open message closes the panel. Returns whether the panel
    /// is open afterwards.
    pub fn toggle(&mut self, message_id: &str, has_metadata: bool) -> bool {
        if has_metadata {
            self.selected = match self.selected.as_deref() {
                Some(current) if current == message_id => None,
                _ => Some(message_id.to_string()),
            };
        }
        self.is_open()
    }

    /// Follows new metadata as the conversation grows. A closed panel opens
    /// on the first reply with metadata; an open one moves to the latest.
    ///
    /// Call this when messages change, not after `toggle`, or a user-closed
    /// panel would reopen immediately.
    pub fn follow(&mut self, annotations: &Annotations) {
        let Some(latest) = annotations.latest_with_metadata.as_deref() else {
            return;
        };
        match self.selected.as_deref() {
            None => {
                let first = annotations.first_with_metadata.as_deref().unwrap_or(latest);
                self.selected = Some(first.to_string());
            }
            Some(current) if current != latest => self.selected = Some(latest.to_string()),
            Some(_) => {}
        }
    }
}
