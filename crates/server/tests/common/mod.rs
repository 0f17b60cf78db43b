//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port. `spawn` builds the
//! state from a temporary `config.yml` whose AI endpoint points at an
//! `httpmock` server; `spawn_with_state` takes a hand-built state, e.g. one
//! backed by `MockAiProvider`.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use sourcecheck::providers::search::SearchChain;
use sourcecheck_server::{
    config::{self, AppConfig},
    router,
    state::{build_app_state, AppState},
};
use sourcecheck_test_utils::MockAiProvider;
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

/// The chat-completions path the mock AI server answers on.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

/// Writes a config file that keeps every external call on `mock_server`.
/// `extra_search` is spliced into the `search:` section. Search keys not
/// given there are set empty so keys from the environment stay unused.
pub fn write_config(mock_server: &MockServer, extra_search: &str) -> Result<(TempDir, String)> {
    let mut search_lines = extra_search.to_string();
    for key in ["serper_api_key", "tavily_api_key"] {
        if !extra_search.contains(key) {
            search_lines.push_str(&format!("\n  {key}: \"\""));
        }
    }
    let config_dir = tempdir()?;
    let config_path = config_dir.path().join("config.yml");
    let config_content = format!(
        r#"
port: 0
ai:
  api_url: "{}"
  api_key: null
  model_name: "mock-chat-model"
search:
  duckduckgo: false
  max_results: 3
{search_lines}
"#,
        mock_server.url(CHAT_COMPLETIONS_PATH),
    );
    let mut file = File::create(&config_path)?;
    file.write_all(config_content.as_bytes())?;
    let path = config_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non-UTF-8 temp path"))?
        .to_string();
    Ok((config_dir, path))
}

impl TestApp {
    /// Spawns the server with state built from a temporary config file.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_search_config("").await
    }

    /// Like `spawn`, with extra lines for the `search:` config section.
    pub async fn spawn_with_search_config(extra_search: &str) -> Result<Self> {
        let mock_server = MockServer::start();
        let (config_dir, config_path) = write_config(&mock_server, extra_search)?;

        let config = config::get_config(Some(&config_path))?;
        let app_state = build_app_state(config).await?;

        let mut app = TestApp::spawn_with_state(app_state, mock_server).await?;
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    /// Spawns the server around a `MockAiProvider` and the given search chain.
    pub async fn spawn_with_mocks(ai: MockAiProvider, search: SearchChain) -> Result<Self> {
        let mock_server = MockServer::start();
        let (config_dir, config_path) = write_config(&mock_server, "")?;
        let config: AppConfig = config::get_config(Some(&config_path))?;
        let app_state = AppState::new(config, Box::new(ai), search)?;

        let mut app = TestApp::spawn_with_state(app_state, mock_server).await?;
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    pub async fn spawn_with_state(app_state: AppState, mock_server: MockServer) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Splits an SSE body into `(event, data)` pairs.
pub fn parse_sse(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut event = None;
            let mut data = Vec::new();
            for line in frame.lines() {
                if let Some(name) = line.strip_prefix("event:") {
                    event = Some(name.trim().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
                }
            }
            event.map(|event| (event, data.join("\n")))
        })
        .collect()
}
