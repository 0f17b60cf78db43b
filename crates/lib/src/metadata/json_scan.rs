//! # Brace Scanner
//!
//! Finds brace-delimited JSON fragments in free prose without a JSON parser.
//! Strings are only tracked inside an object, so quotes in the surrounding
//! prose never desynchronize the depth count. The scanner works on bytes;
//! `{`, `}`, `"` and `\` are ASCII and never occur inside a multi-byte
//! UTF-8 sequence, so every offset it reports is a char boundary.

use super::tags::{contains_telltale_key, is_telltale_key_prefix};
use std::ops::Range;

/// Upper bound on removal passes before giving up on a fixed point.
pub const MAX_FRAGMENT_PASSES: usize = 10;
/// Upper bound on re-scans inside unclosed objects.
const MAX_RESCANS: usize = 64;

/// A depth-0 `{...}` object found in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpan {
    pub start: usize,
    /// Exclusive. Equals the text length when `closed` is false.
    pub end: usize,
    pub closed: bool,
}

/// Lists depth-0 objects in order. At most one, the last, is unclosed.
pub fn top_level_objects(text: &str) -> Vec<ObjectSpan> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate() {
        if depth == 0 {
            if byte == b'{' {
                depth = 1;
                start = i;
                in_string = false;
                escaped = false;
            }
            continue;
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' || byte == b'\n' {
                // JSON strings cannot hold a raw newline; resync on one.
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    spans.push(ObjectSpan {
                        start,
                        end: i + 1,
                        closed: true,
                    });
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        spans.push(ObjectSpan {
            start,
            end: text.len(),
            closed: false,
        });
    }
    spans
}

/// Removes closed objects that carry a telltale key, repeating until the
/// text stops changing or [`MAX_FRAGMENT_PASSES`] is reached.
pub fn strip_telltale_objects(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_FRAGMENT_PASSES {
        let ranges = closed_telltale_ranges(&current);
        if ranges.is_empty() {
            break;
        }
        current = remove_ranges(&current, &ranges);
    }
    current
}

/// Removes an object left open at end of text when it looks like leaked
/// metadata that is still streaming in.
///
/// An open object qualifies if it contains a telltale key and either starts
/// a line or opens straight into a quoted key. It also qualifies while
/// everything after the brace could still become a telltale key, provided
/// it starts a line or a quote has already followed the brace; a lone `{`
/// mid-line is left to the prose. The outermost qualifying object wins.
pub fn strip_trailing_open_object(text: &str) -> String {
    let mut base = 0usize;
    for _ in 0..MAX_RESCANS {
        let Some(open) = top_level_objects(&text[base..])
            .into_iter()
            .find(|span| !span.closed)
        else {
            break;
        };
        let start = base + open.start;
        let fragment = &text[start..];
        let body = &fragment[1..];
        let line_start = starts_line(text, start);
        let opens_with_key = body.trim_start().starts_with('"');

        let leaked = contains_telltale_key(fragment) && (line_start || opens_with_key);
        let growing = (line_start || opens_with_key) && is_telltale_key_prefix(body);
        if leaked || growing {
            return text[..start].to_string();
        }
        base = start + 1;
    }
    text.to_string()
}

fn closed_telltale_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut base = 0usize;
    for _ in 0..MAX_RESCANS {
        let mut reopen = None;
        for span in top_level_objects(&text[base..]) {
            let range = base + span.start..base + span.end;
            if span.closed {
                if contains_telltale_key(&text[range.clone()]) {
                    ranges.push(range);
                }
            } else {
                reopen = Some(range.start + 1);
            }
        }
        match reopen {
            Some(next) => base = next,
            None => break,
        }
    }
    ranges
}

/// Cuts the ranges out of `text`. A range that is alone on its line takes
/// the whole line, newline included, with it.
fn remove_ranges(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for range in ranges {
        let (start, end) = widen_to_line(text, range.clone());
        if start < cursor {
            continue;
        }
        out.push_str(&text[cursor..start]);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn widen_to_line(text: &str, range: Range<usize>) -> (usize, usize) {
    let line_begin = text[..range.start].rfind('\n').map_or(0, |at| at + 1);
    let line_end = text[range.end..]
        .find('\n')
        .map_or(text.len(), |at| range.end + at);

    let alone = text[line_begin..range.start].trim().is_empty()
        && text[range.end..line_end].trim().is_empty();
    if !alone {
        return (range.start, range.end);
    }
    let after_newline = if line_end < text.len() {
        line_end + 1
    } else {
        line_end
    };
    (line_begin, after_newline)
}

fn starts_line(text: &str, at: usize) -> bool {
    let line_begin = text[..at].rfind('\n').map_or(0, |i| i + 1);
    text[line_begin..at].trim().is_empty()
}
