//! # Metadata Types
//!
//! The typed record decoded from a reply's metadata block, in the camelCase
//! shape the side panel consumes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when an uncertainty omits its `topic`.
pub const UNKNOWN_TOPIC: &str = "Unknown area";
/// Placeholder used when an uncertainty omits its `reason`.
pub const UNKNOWN_REASON: &str = "No reason given";
/// Placeholder used when an uncertainty omits its `whatToCheck`.
pub const UNKNOWN_CHECK: &str = "No specific check given";

/// The structured provenance attached to one assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataBlock {
    /// Self-reported certainty, nominally 0-100. Passed through unvalidated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceInfo>,
    #[serde(default)]
    pub uncertainties: Vec<UncertaintyInfo>,
    /// The user turn that preceded this reply. Attached by the caller, never
    /// read from the block itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_user_prompt: Option<String>,
}

impl MetadataBlock {
    /// Returns a copy with the originating user prompt attached.
    pub fn with_originating_prompt(mut self, prompt: Option<String>) -> Self {
        self.originating_user_prompt = prompt;
        self
    }
}

/// One cited source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Verbatim from the producer; not validated as a URI.
    pub url: String,
    pub title: String,
    pub trust_level: TrustLevel,
}

/// Producer-assigned reliability of a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl TrustLevel {
    /// Parses a producer value, case-insensitively. Anything unrecognized is `Medium`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => TrustLevel::High,
            "low" => TrustLevel::Low,
            _ => TrustLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrustLevel::High => "high",
            TrustLevel::Medium => "medium",
            TrustLevel::Low => "low",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something the producer flagged as uncertain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UncertaintyInfo {
    pub topic: String,
    pub reason: String,
    pub what_to_check: String,
}
