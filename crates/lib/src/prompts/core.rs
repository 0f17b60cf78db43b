//! # Prompt Builders
//!
//! Functions that fill the templates in `prompts::chat`.

use super::chat::{NO_HISTORY, NO_SEARCH_RESULTS, REQUEST_HINTS_TEMPLATE, SEARCH_CONTEXT_TEMPLATE};
use crate::conversation::{ChatMessage, Role};
use crate::metadata::sanitize;
use crate::providers::search::SearchResult;
use serde::{Deserialize, Serialize};

/// Geographic hints about where a request originated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestHints {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("unknown")
}

/// Appends the request hints, if any, to a base system prompt.
pub fn build_system_prompt(base: &str, hints: Option<&RequestHints>) -> String {
    match hints {
        Some(hints) => {
            let hints_text = REQUEST_HINTS_TEMPLATE
                .replace("{latitude}", or_unknown(&hints.latitude))
                .replace("{longitude}", or_unknown(&hints.longitude))
                .replace("{city}", or_unknown(&hints.city))
                .replace("{country}", or_unknown(&hints.country));
            format!("{base}\n\n{hints_text}")
        }
        None => base.to_string(),
    }
}

/// Numbered list of search results, or the no-results notice.
pub fn format_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_SEARCH_RESULTS.to_string();
    }
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}\n   URL: {}\n   {}", i + 1, r.title, r.url, r.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prior turns as `role: text` lines. Assistant turns are sanitized so
/// earlier metadata blocks are not fed back to the model.
pub fn format_history(history: &[ChatMessage]) -> String {
    let lines: Vec<String> = history
        .iter()
        .filter_map(|message| match message.role {
            Role::User => Some(format!("user: {}", message.text())),
            Role::Assistant => Some(format!("assistant: {}", sanitize(&message.text()))),
            Role::System => None,
        })
        .collect();
    if lines.is_empty() {
        NO_HISTORY.to_string()
    } else {
        lines.join("\n")
    }
}

/// Builds the user prompt for one turn.
pub fn build_user_prompt(history: &[ChatMessage], results: &[SearchResult], prompt: &str) -> String {
    SEARCH_CONTEXT_TEMPLATE
        .replace("{history}", &format_history(history))
        .replace("{search_results}", &format_search_results(results))
        .replace("{prompt}", prompt)
}
