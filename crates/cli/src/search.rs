use anyhow::Result;
use clap::Parser;
use sourcecheck::prompts::core::format_search_results;
use sourcecheck::providers::search::{SearchChain, SearchConfig, DEFAULT_MAX_RESULTS};
use tracing::info;

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// The query to search for
    #[arg(required = true)]
    query: String,
    /// Maximum number of results to return
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,
    #[arg(long, env = "SERPER_API_KEY", hide_env_values = true)]
    serper_api_key: Option<String>,
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    tavily_api_key: Option<String>,
    /// Skip DuckDuckGo
    #[arg(long)]
    no_duckduckgo: bool,
}

pub async fn handle_search(args: &SearchArgs) -> Result<()> {
    let config = SearchConfig {
        serper_api_key: args.serper_api_key.clone(),
        tavily_api_key: args.tavily_api_key.clone(),
        duckduckgo: !args.no_duckduckgo,
        max_results: args.max_results,
        ..Default::default()
    };
    let chain = SearchChain::from_config(&config)?;
    info!(providers = ?chain.provider_names(), "Searching for: {}", args.query);

    let outcome = chain.web_search(&args.query, Some(args.max_results)).await?;
    println!("{}\n", outcome.message);
    println!("{}", format_search_results(&outcome.results));
    Ok(())
}
