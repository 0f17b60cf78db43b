//! Sample replies and helpers for feeding them through a stream.

use sourcecheck::providers::search::SearchResult;

/// A well-formed reply whose prose avoids every tag and field name.
pub const SAMPLE_REPLY: &str = "Rust 1.0 shipped in May 2015.\n\nIt was announced on the official blog, and the café crowd celebrated.\n<metadata>\n{\"confidence\": 85, \"conclusion\": \"Rust 1.0 was released in 2015.\", \"sources\": [{\"url\": \"https://blog.rust-lang.org/2015/05/15/Rust-1.0.html\", \"title\": \"Announcing Rust 1.0\", \"trustLevel\": \"high\"}], \"uncertainties\": [{\"topic\": \"Exact day\", \"reason\": \"Time zones\", \"whatToCheck\": \"The blog post date\"}]}\n</metadata>";

/// What [`SAMPLE_REPLY`] should display.
pub const SAMPLE_DISPLAY: &str = "Rust 1.0 shipped in May 2015.\n\nIt was announced on the official blog, and the café crowd celebrated.";

/// A reply where the producer forgot the tags and wrote the payload inline.
pub const TAGLESS_REPLY: &str = "Paris is the capital of France.\n{\"confidence\": 95, \"sources\": [{\"url\": \"https://example.org/paris\", \"title\": \"Paris\", \"trustLevel\": \"high\"}]}";

/// What [`TAGLESS_REPLY`] should display.
pub const TAGLESS_DISPLAY: &str = "Paris is the capital of France.";

/// Every prefix of `text` ending on a char boundary, shortest first, the
/// empty and complete text included.
pub fn char_boundary_prefixes(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .map(|end| &text[..end])
        .collect()
}

/// Splits `text` into chunks of `size` characters.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

pub fn sample_search_results() -> Vec<SearchResult> {
    vec![
        SearchResult {
            title: "Announcing Rust 1.0".to_string(),
            url: "https://blog.rust-lang.org/2015/05/15/Rust-1.0.html".to_string(),
            snippet: "Today we are very proud to announce the 1.0 release of Rust.".to_string(),
        },
        SearchResult {
            title: "Rust (programming language)".to_string(),
            url: "https://en.wikipedia.org/wiki/Rust_(programming_language)".to_string(),
            snippet: "Rust is a general-purpose programming language.".to_string(),
        },
    ]
}
