//! # Streaming Render Tests
//!
//! A reply is re-rendered from the whole accumulated buffer after every
//! delta. These tests cut the sample replies at every char boundary and
//! check that no frame ever shows part of the metadata block.

mod common;

use common::{
    assert_no_leak, char_boundary_prefixes, setup_tracing, SAMPLE_DISPLAY, SAMPLE_REPLY,
    TAGLESS_DISPLAY, TAGLESS_REPLY,
};
use sourcecheck::metadata::{extract, sanitize};
use sourcecheck::render::StreamingMessage;

fn assert_prefixes_are_safe(full: &str, final_display: &str) {
    for prefix in char_boundary_prefixes(full) {
        let display = sanitize(prefix);
        assert_no_leak(&display, prefix);
        assert!(
            final_display.starts_with(&display),
            "frame {display:?} is not a prefix of the final display (input {prefix:?})"
        );
        assert_eq!(sanitize(&display), display, "not idempotent for {prefix:?}");
    }
}

/// Verifies that every prefix of a tagged reply displays a clean prefix of the final prose.
#[test]
fn test_tagged_reply_never_leaks() {
    setup_tracing();
    assert_prefixes_are_safe(SAMPLE_REPLY, SAMPLE_DISPLAY);
}

/// Verifies the same for a reply that writes its payload without tags.
#[test]
fn test_tagless_reply_never_leaks() {
    assert_prefixes_are_safe(TAGLESS_REPLY, TAGLESS_DISPLAY);

    // Written inline after the prose. A lone trailing `{` could still be
    // prose, so only frames past the brace are checked.
    let inline = "The answer is yes. {\"confidence\": 50, \"sources\": []}";
    for prefix in char_boundary_prefixes(inline) {
        if prefix.ends_with('{') {
            continue;
        }
        let display = sanitize(prefix);
        assert_no_leak(&display, prefix);
        assert!(
            "The answer is yes.".starts_with(&display),
            "frame {display:?} is not a prefix of the final display (input {prefix:?})"
        );
    }
    assert_eq!(sanitize(inline), "The answer is yes.");
}

/// Verifies that metadata only appears once the close tag has arrived.
#[test]
fn test_metadata_appears_only_when_closed() {
    let close_at = SAMPLE_REPLY.find("</metadata>").unwrap() + "</metadata>".len();
    for prefix in char_boundary_prefixes(SAMPLE_REPLY) {
        assert_eq!(
            extract(prefix).is_some(),
            prefix.len() >= close_at,
            "unexpected extraction result for {prefix:?}"
        );
    }
}

/// Verifies that a streaming message ends in the same state as rendering the full text.
#[test]
fn test_streaming_message_matches_full_render() {
    for chunk_size in [1, 3, 16, 1000] {
        let mut message = StreamingMessage::new("m1");
        let chars: Vec<char> = SAMPLE_REPLY.chars().collect();
        for chunk in chars.chunks(chunk_size) {
            let delta: String = chunk.iter().collect();
            message.push_delta(&delta);
            assert_no_leak(&message.current().display, message.raw());
        }

        assert_eq!(message.raw(), SAMPLE_REPLY);
        assert_eq!(message.current().display, sanitize(SAMPLE_REPLY));

        let finalized = message.finalize();
        assert_eq!(finalized.id, "m1");
        assert_eq!(finalized.raw, SAMPLE_REPLY);
        assert_eq!(finalized.metadata, extract(SAMPLE_REPLY));
        assert!(finalized.metadata.is_some());
    }
}

/// Verifies that an empty delta leaves the frame untouched.
#[test]
fn test_empty_delta_is_a_no_op() {
    let mut message = StreamingMessage::new("m2");
    message.push_delta("Hello");
    let before = message.current().clone();
    assert_eq!(message.push_delta(""), &before);
    assert_eq!(message.raw(), "Hello");
}

/// Verifies that a reply abandoned mid-block keeps its raw text but carries no metadata.
#[test]
fn test_cancelled_stream_has_no_metadata() {
    let cut = SAMPLE_REPLY.find("\"sources\"").unwrap();
    let mut message = StreamingMessage::new("m3");
    message.push_delta(&SAMPLE_REPLY[..cut]);
    assert_eq!(message.current().display, SAMPLE_DISPLAY);
    let finalized = message.finalize();
    assert!(finalized.metadata.is_none());
}
