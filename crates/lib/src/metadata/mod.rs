//! # Reply Metadata
//!
//! Assistant replies end with a tag-delimited JSON block describing how
//! confident the model is, which sources it used and what it is unsure of.
//! This module splits such a reply into what the user should read and the
//! structured record behind it:
//!
//! - [`extractor`] decodes the first closed block into a [`MetadataBlock`].
//! - [`sanitizer`] strips the block, and every broken variant of it, from the
//!   display text.
//!
//! Both are pure functions of the accumulated text and are meant to be
//! re-run on the whole buffer every time a streamed reply grows.

pub mod extractor;
pub mod json_scan;
pub mod sanitizer;
pub mod tags;
pub mod types;

pub use extractor::{extract, try_extract};
pub use sanitizer::{sanitize, sanitize_with_report, SanitizeReport};
pub use types::{MetadataBlock, SourceInfo, TrustLevel, UncertaintyInfo};
