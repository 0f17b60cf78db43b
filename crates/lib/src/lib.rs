//! # Sourced Answers
//!
//! Core library for a fact-checking chat assistant. Replies from the AI
//! provider carry a trailing metadata block (confidence, conclusion, sources,
//! uncertainties); this crate separates that block from the prose the user
//! reads, including while a reply is still streaming in.
//!
//! - [`metadata`]: extraction and sanitizing of the metadata block.
//! - [`render`]: per-reply rendering, buffered or streamed.
//! - [`conversation`]: messages, cached annotations and panel selection.
//! - [`prompts`]: the fact-checking prompt templates.
//! - [`providers`]: AI and web-search backends.

pub mod conversation;
pub mod errors;
pub mod metadata;
pub mod prompts;
pub mod providers;
pub mod render;

pub use conversation::{ChatMessage, Conversation, ConversationView, Role};
pub use errors::{MetadataError, PromptError, SanitizeError, SearchError};
pub use metadata::{extract, sanitize, MetadataBlock, SourceInfo, TrustLevel, UncertaintyInfo};
pub use render::{render, FinalizedMessage, Rendered, StreamingMessage};
