//! # Text Sanitizer
//!
//! Produces display text from a raw (possibly still streaming) assistant
//! reply by removing the metadata block and every leaked or malformed
//! variant of it.
//!
//! The work is an ordered list of stages. Precise stages run first and the
//! broader ones after them pick up what is left. A stage that cannot run is
//! logged and skipped, so `sanitize` itself never fails. The full list is
//! re-run until the text stops changing, which keeps the function
//! idempotent when one removal splices together a fresh match.

use super::json_scan::{strip_telltale_objects, strip_trailing_open_object, MAX_FRAGMENT_PASSES};
use super::tags::{partial_escaped_open_suffix, partial_open_tag_suffix};
use crate::errors::SanitizeError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{trace, warn};

/// Upper bound on full pipeline re-runs.
pub const MAX_PIPELINE_ROUNDS: usize = 4;

/// Marker some transports leave in the text when the model called a tool.
const FUNCTION_CALL_MARKER: &str = "<has_function_call>";

type Pattern = LazyLock<Result<Regex, regex::Error>>;
type StageFn = fn(&str) -> Result<String, SanitizeError>;

/// A named step of the pipeline.
struct Stage {
    name: &'static str,
    apply: StageFn,
}

const STAGES: &[Stage] = &[
    Stage {
        name: "function_call_marker",
        apply: strip_function_call_marker,
    },
    Stage {
        name: "closed_block",
        apply: strip_closed_blocks,
    },
    Stage {
        name: "unclosed_block",
        apply: strip_unclosed_block,
    },
    Stage {
        name: "escaped_block",
        apply: strip_escaped_blocks,
    },
    Stage {
        name: "tag_fragments",
        apply: strip_tag_fragments,
    },
    Stage {
        name: "trust_tokens",
        apply: strip_trust_tokens,
    },
    Stage {
        name: "tagless_json",
        apply: strip_tagless_json,
    },
    Stage {
        name: "empty_remnants",
        apply: strip_empty_remnants,
    },
    Stage {
        name: "trim",
        apply: trim,
    },
];

// --- Patterns ---

static CLOSED_BLOCK: Pattern = LazyLock::new(|| Regex::new(r"(?is)<metadata>.*?</metadata>"));
static UNCLOSED_BLOCK: Pattern = LazyLock::new(|| Regex::new(r"(?is)<metadata>.*\z"));
static ESCAPED_CLOSED_BLOCK: Pattern =
    LazyLock::new(|| Regex::new(r"(?is)&lt;metadata&gt;.*?&lt;/metadata&gt;"));
static ESCAPED_UNCLOSED_BLOCK: Pattern =
    LazyLock::new(|| Regex::new(r"(?is)&lt;metadata&gt;.*\z"));
static LOOSE_BLOCK: Pattern = LazyLock::new(|| Regex::new(r"(?is)<metadata.*?/metadata>"));
static LOOSE_OPEN_TAG: Pattern = LazyLock::new(|| Regex::new(r"(?i)<metadata[^>]*>"));
static ORPHAN_CLOSE_TAG: Pattern = LazyLock::new(|| Regex::new(r"(?i)</metadata>"));
static ESCAPED_ORPHAN_TAG: Pattern = LazyLock::new(|| Regex::new(r"(?i)&lt;/?metadata&gt;"));
static TRUST_TOKEN: Pattern = LazyLock::new(|| Regex::new(r"(?i)trust:score_[a-z]+"));
static SPACED_TRUST_TOKEN: Pattern =
    LazyLock::new(|| Regex::new(r"(?i)trust\s*:\s*score[_\s]*[a-z]+"));
static END_ANCHORED_JSON: Pattern =
    LazyLock::new(|| Regex::new(r#"(?s)\n\s*\{\s*"confidence".*?\}\s*\z"#));
static NEWLINE_ANCHORED_JSON: Pattern =
    LazyLock::new(|| Regex::new(r#"\n[ \t]*\{\s*"confidence"[^{}]*\}[ \t]*\n?"#));
static OWN_LINE_JSON: Pattern =
    LazyLock::new(|| Regex::new(r#"(?m)^[ \t]*\{[^{}]*"confidence"[^{}]*\}[^\n]*\n?"#));
static CONFIDENCE_THROUGH_SOURCES: Pattern =
    LazyLock::new(|| Regex::new(r#"(?i)"confidence"\s*:\s*\d+[^}]*"sources"[^}]*"#));
static EMPTY_OBJECT_BLOCK: Pattern = LazyLock::new(|| Regex::new(r"\n\s*\{\s*\n\s*\}\s*\n"));
static EMPTY_REMNANT_LINE: Pattern =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:\{\s*\}|\[\s*\])[ \t]*(?:\n|\z)"));

// --- Public API ---

/// The outcome of a sanitizer run, with the stages that changed the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub display: String,
    /// Stage names that modified the text, in order, across all rounds.
    pub fired: Vec<&'static str>,
    /// Stage names that could not run.
    pub skipped: Vec<&'static str>,
}

/// Returns text safe to display: no metadata block, no partial tag, no
/// leaked payload, however malformed or truncated `raw` is.
pub fn sanitize(raw: &str) -> String {
    sanitize_with_report(raw).display
}

/// Like [`sanitize`], also reporting which stages fired or were skipped.
pub fn sanitize_with_report(raw: &str) -> SanitizeReport {
    sanitize_with_stages(raw, STAGES)
}

fn sanitize_with_stages(raw: &str, stages: &[Stage]) -> SanitizeReport {
    let mut report = SanitizeReport {
        display: raw.to_string(),
        ..Default::default()
    };
    if raw.is_empty() {
        return report;
    }

    for round in 0..MAX_PIPELINE_ROUNDS {
        let next = run_stages(stages, &report.display, &mut report.fired, &mut report.skipped);
        if next == report.display {
            break;
        }
        trace!(round, "Sanitizer round changed the text");
        report.display = next;
    }
    report
}

fn run_stages(
    stages: &[Stage],
    text: &str,
    fired: &mut Vec<&'static str>,
    skipped: &mut Vec<&'static str>,
) -> String {
    let mut current = text.to_string();
    for stage in stages {
        match (stage.apply)(&current) {
            Ok(next) => {
                if next != current {
                    fired.push(stage.name);
                    current = next;
                }
            }
            Err(e) => {
                warn!(stage = stage.name, error = %e, "Skipping sanitizer stage");
                if !skipped.contains(&stage.name) {
                    skipped.push(stage.name);
                }
            }
        }
    }
    current
}

// --- Stages ---

fn strip_function_call_marker(text: &str) -> Result<String, SanitizeError> {
    Ok(text.replace(FUNCTION_CALL_MARKER, ""))
}

fn strip_closed_blocks(text: &str) -> Result<String, SanitizeError> {
    replace_all("closed_block", &CLOSED_BLOCK, text, "")
}

/// An open tag with no close yet means the rest of the text is payload.
fn strip_unclosed_block(text: &str) -> Result<String, SanitizeError> {
    let mut cleaned = replace_all("unclosed_block", &UNCLOSED_BLOCK, text, "")?;
    if let Some(at) = partial_open_tag_suffix(&cleaned) {
        cleaned.truncate(at);
    }
    Ok(cleaned)
}

fn strip_escaped_blocks(text: &str) -> Result<String, SanitizeError> {
    let cleaned = replace_all("escaped_block", &ESCAPED_CLOSED_BLOCK, text, "")?;
    let mut cleaned = replace_all("escaped_block", &ESCAPED_UNCLOSED_BLOCK, &cleaned, "")?;
    if let Some(at) = partial_escaped_open_suffix(&cleaned) {
        cleaned.truncate(at);
    }
    Ok(cleaned)
}

/// Removing one fragment can splice its neighbours into a new tag
/// (`<meta<metadata/>data/>`), so this runs until nothing matches. Every
/// pass that changes the text shortens it, which bounds the loop.
fn strip_tag_fragments(text: &str) -> Result<String, SanitizeError> {
    let mut current = text.to_string();
    loop {
        let cleaned = replace_all("tag_fragments", &LOOSE_BLOCK, &current, "")?;
        let cleaned = replace_all("tag_fragments", &LOOSE_OPEN_TAG, &cleaned, "")?;
        let cleaned = replace_all("tag_fragments", &ORPHAN_CLOSE_TAG, &cleaned, "")?;
        let cleaned = replace_all("tag_fragments", &ESCAPED_ORPHAN_TAG, &cleaned, "")?;
        if cleaned == current {
            return Ok(current);
        }
        current = cleaned;
    }
}

fn strip_trust_tokens(text: &str) -> Result<String, SanitizeError> {
    let cleaned = replace_all("trust_tokens", &TRUST_TOKEN, text, "")?;
    replace_all("trust_tokens", &SPACED_TRUST_TOKEN, &cleaned, "")
}

/// Payload emitted straight into the prose, without tags.
fn strip_tagless_json(text: &str) -> Result<String, SanitizeError> {
    let cleaned = strip_telltale_objects(text);
    let cleaned = strip_trailing_open_object(&cleaned);
    let cleaned = replace_to_fixed_point("tagless_json", &END_ANCHORED_JSON, &cleaned, "")?;
    let cleaned = replace_to_fixed_point("tagless_json", &NEWLINE_ANCHORED_JSON, &cleaned, "\n")?;
    let cleaned = replace_to_fixed_point("tagless_json", &OWN_LINE_JSON, &cleaned, "")?;
    replace_to_fixed_point("tagless_json", &CONFIDENCE_THROUGH_SOURCES, &cleaned, "")
}

fn strip_empty_remnants(text: &str) -> Result<String, SanitizeError> {
    let cleaned = replace_all("empty_remnants", &EMPTY_OBJECT_BLOCK, text, "\n")?;
    replace_all("empty_remnants", &EMPTY_REMNANT_LINE, &cleaned, "")
}

fn trim(text: &str) -> Result<String, SanitizeError> {
    Ok(text.trim().to_string())
}

// --- Helpers ---

fn compiled(stage: &'static str, pattern: &'static Pattern) -> Result<&'static Regex, SanitizeError> {
    pattern
        .as_ref()
        .map_err(|source| SanitizeError::Pattern {
            stage,
            source: source.clone(),
        })
}

fn replace_all(
    stage: &'static str,
    pattern: &'static Pattern,
    text: &str,
    with: &str,
) -> Result<String, SanitizeError> {
    Ok(compiled(stage, pattern)?.replace_all(text, with).into_owned())
}

fn replace_to_fixed_point(
    stage: &'static str,
    pattern: &'static Pattern,
    text: &str,
    with: &str,
) -> Result<String, SanitizeError> {
    let re = compiled(stage, pattern)?;
    let mut current = text.to_string();
    for _ in 0..MAX_FRAGMENT_PASSES {
        let next = re.replace_all(&current, with).into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        let patterns: [&'static Pattern; 16] = [
            &CLOSED_BLOCK,
            &UNCLOSED_BLOCK,
            &ESCAPED_CLOSED_BLOCK,
            &ESCAPED_UNCLOSED_BLOCK,
            &LOOSE_BLOCK,
            &LOOSE_OPEN_TAG,
            &ORPHAN_CLOSE_TAG,
            &ESCAPED_ORPHAN_TAG,
            &TRUST_TOKEN,
            &SPACED_TRUST_TOKEN,
            &END_ANCHORED_JSON,
            &NEWLINE_ANCHORED_JSON,
            &OWN_LINE_JSON,
            &CONFIDENCE_THROUGH_SOURCES,
            &EMPTY_OBJECT_BLOCK,
            &EMPTY_REMNANT_LINE,
        ];
        for pattern in patterns {
            assert!(pattern.as_ref().is_ok());
        }
    }

    #[test]
    fn report_names_the_stages_that_fired() {
        let report = sanitize_with_report("Hi <metadata>{}</metadata> trust:score_high");
        assert_eq!(report.display, "Hi");
        assert!(report.fired.contains(&"closed_block"));
        assert!(report.fired.contains(&"trust_tokens"));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn self_closing_and_orphan_tags_are_removed() {
        assert_eq!(sanitize("A <metadata/> B"), "A  B");
        assert_eq!(sanitize("A </metadata> B"), "A  B");
        assert_eq!(sanitize("A <metadata id=\"1\">{}</metadata> B"), "A  B");
    }

    #[test]
    fn nested_fragments_are_removed_in_one_call() {
        let text = "Answer <meta<meta<meta<meta<metadata/>data/>data/>data/>data/> end";
        let once = sanitize(text);
        assert_eq!(once, "Answer  end");
        assert_eq!(sanitize(&once), once);
    }

    fn failing_stage(_: &str) -> Result<String, SanitizeError> {
        let source = match Regex::new("(") {
            Err(e) => e,
            Ok(_) => unreachable!("an unbalanced group never compiles"),
        };
        Err(SanitizeError::Pattern {
            stage: "broken",
            source,
        })
    }

    #[test]
    fn failing_stage_is_skipped_and_reported() {
        let stages = [
            Stage {
                name: "broken",
                apply: failing_stage,
            },
            Stage {
                name: "trim",
                apply: trim,
            },
        ];

        let report = sanitize_with_stages("  kept as is <metadata>  ", &stages);

        assert_eq!(report.display, "kept as is <metadata>");
        assert_eq!(report.skipped, vec!["broken"]);
        assert_eq!(report.fired, vec!["trim"]);
    }

    #[test]
    fn escaped_blocks_are_removed() {
        let text = "Answer &lt;METADATA&gt;{\"confidence\": 1}&lt;/METADATA&gt; end";
        assert_eq!(sanitize(text), "Answer  end");
        assert_eq!(sanitize("Answer &lt;metadata&gt;{\"conf"), "Answer");
    }

    #[test]
    fn trust_tokens_are_removed() {
        assert_eq!(sanitize("Source A trust:score_high is fine"), "Source A  is fine");
        assert_eq!(sanitize("Source B Trust : score_low."), "Source B .");
    }

    #[test]
    fn empty_remnants_are_collapsed() {
        assert_eq!(sanitize("Top\n{\n}\nBottom"), "Top\nBottom");
        assert_eq!(sanitize("Top\n{}\nBottom"), "Top\nBottom");
    }

    #[test]
    fn confidence_run_without_braces_is_removed() {
        let text = "Result: \"confidence\": 70, \"sources\": [\"a\"] end";
        assert_eq!(sanitize(text), "Result:");
    }
}
