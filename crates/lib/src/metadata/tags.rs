//! # Tag Grammar
//!
//! Delimiters and field names shared by the extractor and the sanitizer.
//! Every comparison against the tag is ASCII case-insensitive, and since
//! ASCII lowercasing never changes byte lengths, offsets found in a
//! lowercased copy are valid in the original text.

use std::ops::Range;

/// The element name wrapping the structured payload.
pub const TAG_NAME: &str = "metadata";
/// Lowercase open delimiter.
pub const OPEN_TAG: &str = "<metadata>";
/// Lowercase close delimiter.
pub const CLOSE_TAG: &str = "</metadata>";
/// Open delimiter as it appears when the producer HTML-escapes its output.
pub const ESCAPED_OPEN_TAG: &str = "&lt;metadata&gt;";
/// Close delimiter as it appears when the producer HTML-escapes its output.
pub const ESCAPED_CLOSE_TAG: &str = "&lt;/metadata&gt;";
/// The shortest escaped prefix treated as the start of a tag (`&lt;`).
const MIN_ESCAPED_PREFIX: usize = 4;

/// Payload field names whose presence marks a brace fragment as leaked metadata.
pub const TELLTALE_FIELDS: [&str; 3] = ["confidence", "sources", "uncertainties"];

/// Location of the first closed metadata block in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedBlock {
    /// Byte range of the whole block, delimiters included.
    pub outer: Range<usize>,
    /// Byte range between the delimiters.
    pub interior: Range<usize>,
}

/// Finds the first closed `<metadata>...</metadata>` pair, case-insensitively.
///
/// The match is non-greedy: the interior ends at the first close tag after
/// the first open tag.
pub fn find_closed_block(text: &str) -> Option<ClosedBlock> {
    let lower = text.to_ascii_lowercase();
    let open_at = lower.find(OPEN_TAG)?;
    let interior_start = open_at + OPEN_TAG.len();
    let close_at = interior_start + lower[interior_start..].find(CLOSE_TAG)?;
    Some(ClosedBlock {
        outer: open_at..close_at + CLOSE_TAG.len(),
        interior: interior_start..close_at,
    })
}

/// Byte offset where a trailing, incomplete open tag begins.
///
/// Matches the longest proper prefix of `<metadata>` (from `<` up to
/// `<metadata`) sitting at the very end of `text`.
pub fn partial_open_tag_suffix(text: &str) -> Option<usize> {
    trailing_prefix_of(text, OPEN_TAG, 1)
}

/// Like [`partial_open_tag_suffix`], for the entity-escaped open tag.
///
/// At least `&lt;` must have arrived; a bare trailing `&` is left alone.
pub fn partial_escaped_open_suffix(text: &str) -> Option<usize> {
    trailing_prefix_of(text, ESCAPED_OPEN_TAG, MIN_ESCAPED_PREFIX)
}

fn trailing_prefix_of(text: &str, tag: &str, min_len: usize) -> Option<usize> {
    (min_len..tag.len()).rev().find_map(|len| {
        let start = text.len().checked_sub(len)?;
        let tail = text.get(start..)?;
        tail.eq_ignore_ascii_case(&tag[..len]).then_some(start)
    })
}

/// True when `fragment` contains a quoted telltale field used as a key,
/// e.g. `"sources" :`.
pub fn contains_telltale_key(fragment: &str) -> bool {
    TELLTALE_FIELDS.iter().any(|field| {
        let quoted = format!("\"{field}\"");
        fragment.match_indices(&quoted).any(|(at, _)| {
            fragment[at + quoted.len()..]
                .trim_start()
                .starts_with(':')
        })
    })
}

/// True when `fragment`, ignoring leading whitespace, could still grow into
/// a quoted telltale key. An empty fragment qualifies.
pub fn is_telltale_key_prefix(fragment: &str) -> bool {
    let fragment = fragment.trim_start();
    TELLTALE_FIELDS.iter().any(|field| {
        let quoted = format!("\"{field}\"");
        quoted.starts_with(fragment) || is_key_then_colon_prefix(fragment, &quoted)
    })
}

/// `"confidence"` followed only by whitespace and possibly the colon so far.
fn is_key_then_colon_prefix(fragment: &str, quoted: &str) -> bool {
    fragment
        .strip_prefix(quoted)
        .map(|rest| {
            let rest = rest.trim_start();
            rest.is_empty() || rest == ":"
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_closed_block_case_insensitively() {
        let text = "intro <MetaData>{\"a\":1}</METADATA> tail <metadata>{}</metadata>";
        let block = find_closed_block(text).unwrap();
        assert_eq!(&text[block.interior.clone()], "{\"a\":1}");
        assert_eq!(&text[block.outer], "<MetaData>{\"a\":1}</METADATA>");
    }

    #[test]
    fn unclosed_block_is_not_found() {
        assert!(find_closed_block("text <metadata>{\"confidence\": 4").is_none());
        assert!(find_closed_block("no tags at all").is_none());
    }

    #[test]
    fn detects_every_partial_open_tag() {
        for len in 1..OPEN_TAG.len() {
            let text = format!("Answer.\n{}", &OPEN_TAG[..len]);
            assert_eq!(partial_open_tag_suffix(&text), Some("Answer.\n".len()));
        }
        assert_eq!(partial_open_tag_suffix("Answer.\n<METAD"), Some(8));
        assert_eq!(partial_open_tag_suffix("a <b"), None);
        assert_eq!(partial_open_tag_suffix("done"), None);
    }

    #[test]
    fn partial_escaped_tag_needs_the_entity() {
        assert_eq!(partial_escaped_open_suffix("x &lt;meta"), Some(2));
        assert_eq!(partial_escaped_open_suffix("x &lt;"), Some(2));
        assert_eq!(partial_escaped_open_suffix("x &l"), None);
        assert_eq!(partial_escaped_open_suffix("fish &"), None);
    }

    #[test]
    fn telltale_keys_need_a_colon() {
        assert!(contains_telltale_key("{\"confidence\": 3}"));
        assert!(contains_telltale_key("{\"x\": 1, \"sources\" :[]}"));
        assert!(!contains_telltale_key("{\"note\": \"sources\"}"));
        assert!(!contains_telltale_key("{\"confident\": true}"));
    }

    #[test]
    fn telltale_key_prefixes() {
        assert!(is_telltale_key_prefix(""));
        assert!(is_telltale_key_prefix("  \"conf"));
        assert!(is_telltale_key_prefix("\"sources\" :"));
        assert!(!is_telltale_key_prefix("\"name\""));
        assert!(!is_telltale_key_prefix("x"));
    }
}
