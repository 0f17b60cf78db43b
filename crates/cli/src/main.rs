//! # sourcecheck: a CLI for `sourcecheck`
//!
//! Inspect saved replies and try the web-search chain from a terminal.

mod render;
mod search;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a saved reply into display text and metadata
    Render(render::RenderArgs),
    /// Feed a saved reply through the streaming renderer, frame by frame
    Replay(render::ReplayArgs),
    /// Run a query through the web-search provider chain
    Search(search::SearchArgs),
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for piping.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let (name, outcome) = match &cli.command {
        Commands::Render(args) => ("Render", render::handle_render(args)),
        Commands::Replay(args) => ("Replay", render::handle_replay(args)),
        Commands::Search(args) => ("Search", search::handle_search(args).await),
    };

    if let Err(e) = outcome {
        eprintln!("{name} failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
