//! # Application Configuration
//!
//! This module defines the configuration structure for the `sourcecheck-server`
//! and loads it from a `config.yml` file and environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use sourcecheck::prompts::chat::FACT_CHECK_SYSTEM_PROMPT;
use sourcecheck::providers::search::SearchConfig;
use std::env;
use std::fs;
use thiserror::Error;
use tracing::info;

/// The default OpenAI-compatible endpoint, a local inference server.
pub const DEFAULT_AI_API_URL: &str = "http://localhost:1234/v1/chat/completions";

/// A custom error type for configuration issues.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// Indicates a required configuration file was not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    pub ai: AiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub prompts: PromptsConfig,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}

/// The OpenAI-compatible chat provider.
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PromptsConfig {
    pub system_prompt: String,
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Invalid substitution pattern: {e}")))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

/// Loads the application configuration from a file and environment variables.
///
/// - Layer 1: programmatic defaults (AI endpoint, fact-checking system prompt).
/// - Layer 2: `config.yml` next to the crate, or `config_path_override`, with
///   `${VAR}` placeholders substituted from the environment.
/// - Layer 3: top-level keys like `port` from plain env vars (`PORT`).
/// - Layer 4: nested keys from `SOURCECHECK_...` vars (e.g. `SOURCECHECK_AI__API_URL`).
///
/// `SERPER_API_KEY` and `TAVILY_API_KEY` fill the search keys when nothing
/// else set them.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        .set_default("ai.api_url", DEFAULT_AI_API_URL)?
        .set_default("prompts.system_prompt", FACT_CHECK_SYSTEM_PROMPT)?;

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            let user_config_path = format!("{base_path}/config.yml");
            match read_and_substitute(&user_config_path)? {
                Some(content) => {
                    info!("Loading user-defined configuration from '{user_config_path}'.");
                    builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
                }
                None => info!("'{user_config_path}' not found. Using defaults and environment."),
            }
        }
    }

    let settings = builder
        .add_source(Environment::default())
        .add_source(
            Environment::with_prefix("SOURCECHECK")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    if config.search.serper_api_key.is_none() {
        config.search.serper_api_key = non_empty_env("SERPER_API_KEY");
    }
    if config.search.tavily_api_key.is_none() {
        config.search.tavily_api_key = non_empty_env("TAVILY_API_KEY");
    }

    Ok(config)
}
