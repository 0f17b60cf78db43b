use anyhow::{Context, Result};
use clap::Parser;
use sourcecheck::{render, MetadataBlock, StreamingMessage};
use std::fmt::Write;
use std::fs;
use tracing::info;

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// The file holding the raw reply
    #[arg(required = true)]
    path: String,
    /// Print `{display, metadata}` as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// The file holding the raw reply
    #[arg(required = true)]
    path: String,
    /// How many characters each simulated delta carries
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
    chunk: u64,
}

fn read_reply(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("could not read '{path}'"))
}

/// Human-readable rendering of a metadata block.
pub fn format_metadata(metadata: &MetadataBlock) -> String {
    let mut out = String::new();
    match metadata.confidence {
        Some(confidence) => {
            let _ = writeln!(out, "Confidence: {confidence}");
        }
        None => {
            let _ = writeln!(out, "Confidence: not stated");
        }
    }
    if let Some(conclusion) = &metadata.conclusion {
        let _ = writeln!(out, "Conclusion: {conclusion}");
    }
    if !metadata.sources.is_empty() {
        let _ = writeln!(out, "Sources:");
        for source in &metadata.sources {
            let _ = writeln!(
                out,
                "  - [{}] {} <{}>",
                source.trust_level, source.title, source.url
            );
        }
    }
    if !metadata.uncertainties.is_empty() {
        let _ = writeln!(out, "Uncertainties:");
        for uncertainty in &metadata.uncertainties {
            let _ = writeln!(
                out,
                "  - {}: {} (check: {})",
                uncertainty.topic, uncertainty.reason, uncertainty.what_to_check
            );
        }
    }
    out
}

pub fn handle_render(args: &RenderArgs) -> Result<()> {
    info!("Rendering reply from: {}", args.path);
    let raw = read_reply(&args.path)?;
    let rendered = render(&raw);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    println!("{}", rendered.display);
    match &rendered.metadata {
        Some(metadata) => print!("\n{}", format_metadata(metadata)),
        None => println!("\n(no metadata)"),
    }
    Ok(())
}

pub fn handle_replay(args: &ReplayArgs) -> Result<()> {
    info!(chunk = args.chunk, "Replaying reply from: {}", args.path);
    let raw = read_reply(&args.path)?;
    let chunk = usize::try_from(args.chunk).context("chunk size is too large")?;

    let chars: Vec<char> = raw.chars().collect();
    let mut message = StreamingMessage::new(args.path.clone());
    for (frame, delta) in chars.chunks(chunk).enumerate() {
        let delta: String = delta.iter().collect();
        let rendered = message.push_delta(&delta);
        println!(
            "--- frame {} ({} chars) ---\n{}",
            frame + 1,
            rendered.display.chars().count(),
            rendered.display
        );
    }

    let finalized = message.finalize();
    println!("--- final ---");
    match &finalized.metadata {
        Some(metadata) => print!("{}", format_metadata(metadata)),
        None => println!("(no metadata)"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourcecheck::{SourceInfo, TrustLevel, UncertaintyInfo};

    #[test]
    fn format_metadata_lists_every_section() {
        let metadata = MetadataBlock {
            confidence: Some(72),
            conclusion: Some("Probably true.".to_string()),
            sources: vec![SourceInfo {
                url: "https://a.example".to_string(),
                title: "A".to_string(),
                trust_level: TrustLevel::Low,
            }],
            uncertainties: vec![UncertaintyInfo {
                topic: "Dates".to_string(),
                reason: "Conflicting reports".to_string(),
                what_to_check: "Primary sources".to_string(),
            }],
            originating_user_prompt: None,
        };

        let text = format_metadata(&metadata);

        assert_eq!(
            text,
            "Confidence: 72\nConclusion: Probably true.\nSources:\n  - [low] A <https://a.example>\nUncertainties:\n  - Dates: Conflicting reports (check: Primary sources)\n"
        );
    }

    #[test]
    fn format_metadata_notes_missing_confidence() {
        let text = format_metadata(&MetadataBlock::default());
        assert_eq!(text, "Confidence: not stated\n");
    }
}
