#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Tracing setup and sample replies shared by the library test suites.

use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A well-formed reply whose prose avoids every tag and field name.
pub const SAMPLE_REPLY: &str = "Rust 1.0 shipped in May 2015.\n\nIt was announced on the official blog, and the café crowd celebrated.\n<metadata>\n{\"confidence\": 85, \"conclusion\": \"Rust 1.0 was released in 2015.\", \"sources\": [{\"url\": \"https://blog.rust-lang.org/2015/05/15/Rust-1.0.html\", \"title\": \"Announcing Rust 1.0\", \"trustLevel\": \"high\"}], \"uncertainties\": [{\"topic\": \"Exact day\", \"reason\": \"Time zones\", \"whatToCheck\": \"The blog post date\"}]}\n</metadata>";

pub const SAMPLE_DISPLAY: &str = "Rust 1.0 shipped in May 2015.\n\nIt was announced on the official blog, and the café crowd celebrated.";

/// The payload written inline, without tags.
pub const TAGLESS_REPLY: &str = "Paris is the capital of France.\n{\"confidence\": 95, \"sources\": [{\"url\": \"https://example.org/paris\", \"title\": \"Paris\", \"trustLevel\": \"high\"}]}";

pub const TAGLESS_DISPLAY: &str = "Paris is the capital of France.";

/// Every prefix of `text` ending on a char boundary, shortest first.
pub fn char_boundary_prefixes(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .map(|end| &text[..end])
        .collect()
}

/// Asserts that a display frame shows nothing of the metadata block.
pub fn assert_no_leak(display: &str, context: &str) {
    let lower = display.to_lowercase();
    for needle in ["metadata", "confidence", "sources", "uncertainties", "trustlevel", "<", "{", "&lt;"] {
        assert!(
            !lower.contains(needle),
            "display leaked {needle:?} for prefix {context:?}: {display:?}"
        );
    }
}
