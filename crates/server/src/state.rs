//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration, the AI
//! provider, the search chain and the in-memory conversation store.

use crate::config::AppConfig;
use sourcecheck::{
    conversation::Conversation,
    providers::{
        ai::{local::LocalAiProvider, AiProvider},
        search::{SearchChain, SerperProvider},
    },
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

/// Conversations keyed by id. Each owns its render cache and panel state.
pub type ConversationStore = Arc<Mutex<HashMap<String, Conversation>>>;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    pub ai_provider: Arc<dyn AiProvider>,
    pub search: Arc<SearchChain>,
    /// Only present when a Serper key is configured; backs `/api/search`.
    pub serper: Option<Arc<SerperProvider>>,
    pub conversations: ConversationStore,
}

impl AppState {
    /// Assembles a state from already-built providers.
    pub fn new(
        config: AppConfig,
        ai_provider: Box<dyn AiProvider>,
        search: SearchChain,
    ) -> anyhow::Result<Self> {
        let serper = match config.search.serper_api_key.clone().filter(|k| !k.is_empty()) {
            Some(key) => {
                let mut provider = SerperProvider::new(key)?;
                if let Some(url) = &config.search.serper_url {
                    provider = provider.with_url(url.clone());
                }
                Some(Arc::new(provider))
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            ai_provider: Arc::from(ai_provider),
            search: Arc::new(search),
            serper,
            conversations: Arc::new(Mutex::new(HashMap::new())),
        })
    }
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let ai_provider = Box::new(LocalAiProvider::new(
        config.ai.api_url.clone(),
        config.ai.api_key.clone(),
        config.ai.model_name.clone(),
    )?);
    tracing::info!(api_url = %config.ai.api_url, "Initialized AI provider.");

    let search = SearchChain::from_config(&config.search)?;
    tracing::info!(providers = ?search.provider_names(), "Initialized web search chain.");

    AppState::new(config, ai_provider, search)
}
