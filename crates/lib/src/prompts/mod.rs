//! # Prompt Template Modules
//!
//! Prompt templates for the fact-checking assistant. `chat` holds the raw
//! templates; `core` fills them in.

pub mod chat;
pub mod core;
