//! # Metadata Extractor
//!
//! Decodes the first closed metadata block of a reply into a `MetadataBlock`.
//! An unclosed block is the normal state while a reply streams in and simply
//! yields `None`; a closed block with a bad interior also yields `None`.

use super::tags::find_closed_block;
use super::types::{
    MetadataBlock, SourceInfo, TrustLevel, UncertaintyInfo, UNKNOWN_CHECK, UNKNOWN_REASON,
    UNKNOWN_TOPIC,
};
use crate::errors::MetadataError;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

// --- Producer wire shape ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    sources: Option<Vec<RawSource>>,
    #[serde(default)]
    uncertainties: Option<Vec<RawUncertainty>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    trust_level: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUncertainty {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    what_to_check: Option<String>,
}

// --- Public API ---

/// Returns the metadata of the first closed block in `raw`, or `None`.
///
/// Never fails: decode problems are logged and reported as `None`.
pub fn extract(raw: &str) -> Option<MetadataBlock> {
    match try_extract(raw) {
        Ok(block) => block,
        Err(e) => {
            warn!(error = %e, "Discarding malformed metadata block");
            None
        }
    }
}

/// Like [`extract`], but surfaces why a closed block could not be decoded.
///
/// `Ok(None)` means no closed block exists yet.
pub fn try_extract(raw: &str) -> Result<Option<MetadataBlock>, MetadataError> {
    let Some(block) = find_closed_block(raw) else {
        return Ok(None);
    };
    let interior = raw[block.interior].trim();
    if interior.is_empty() {
        return Err(MetadataError::Empty);
    }
    let parsed: RawMetadata = serde_json::from_str(interior)?;
    Ok(Some(project(parsed)))
}

// --- Projection ---

fn project(raw: RawMetadata) -> MetadataBlock {
    let conclusion = non_empty(raw.conclusion).or_else(|| non_empty(raw.summary));

    let sources = raw
        .sources
        .unwrap_or_default()
        .into_iter()
        .filter_map(project_source)
        .collect();

    let uncertainties = raw
        .uncertainties
        .unwrap_or_default()
        .into_iter()
        .map(|u| UncertaintyInfo {
            topic: non_empty(u.topic).unwrap_or_else(|| UNKNOWN_TOPIC.to_string()),
            reason: non_empty(u.reason).unwrap_or_else(|| UNKNOWN_REASON.to_string()),
            what_to_check: non_empty(u.what_to_check)
                .unwrap_or_else(|| UNKNOWN_CHECK.to_string()),
        })
        .collect();

    MetadataBlock {
        confidence: raw.confidence.as_ref().and_then(confidence_value),
        conclusion,
        sources,
        uncertainties,
        originating_user_prompt: None,
    }
}

fn project_source(source: RawSource) -> Option<SourceInfo> {
    let Some(url) = non_empty(source.url) else {
        debug!("Dropping metadata source without a url");
        return None;
    };
    Some(SourceInfo {
        title: non_empty(source.title).unwrap_or_else(|| url.clone()),
        trust_level: source
            .trust_level
            .as_deref()
            .map(TrustLevel::parse_lenient)
            .unwrap_or_default(),
        url,
    })
}

/// Integers pass through, floats round, numeric strings parse.
fn confidence_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim().trim_end_matches('%');
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_coercion() {
        assert_eq!(confidence_value(&serde_json::json!(80)), Some(80));
        assert_eq!(confidence_value(&serde_json::json!(79.6)), Some(80));
        assert_eq!(confidence_value(&serde_json::json!("65")), Some(65));
        assert_eq!(confidence_value(&serde_json::json!("65%")), Some(65));
        assert_eq!(confidence_value(&serde_json::json!("high")), None);
        assert_eq!(confidence_value(&serde_json::json!(true)), None);
    }

    #[test]
    fn empty_interior_is_an_error() {
        assert!(matches!(
            try_extract("x <metadata>   </metadata>"),
            Err(MetadataError::Empty)
        ));
    }
}
