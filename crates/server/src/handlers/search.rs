//! # Search Handlers

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sourcecheck::providers::search::WebSearchOutcome;
use tracing::info;

#[derive(Deserialize)]
pub struct WebSearchRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Handler for `POST /api/search`: Serper's JSON, passed through as-is.
///
/// The body is taken as raw JSON so a missing or non-string `query` is a
/// 400 with a message rather than an extractor rejection.
pub async fn serper_search_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let query = payload
        .get("query")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            AppError::BadRequest("Query is required and must be a string".to_string())
        })?;
    let serper = app_state
        .serper
        .as_ref()
        .ok_or_else(|| AppError::NotConfigured("SERPER_API_KEY is not configured".to_string()))?;

    info!("Received Serper search request for query: '{query}'");
    let result = serper.search_raw(query).await?;
    Ok(wrap_response(result, debug_params, None))
}

/// Handler for `POST /search/web`: the provider chain with fallbacks.
pub async fn web_search_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<WebSearchRequest>,
) -> Result<Json<ApiResponse<WebSearchOutcome>>, AppError> {
    info!("Received web search request for query: '{}'", payload.query);
    let max_results = payload
        .max_results
        .unwrap_or(app_state.config.search.max_results);
    let outcome = app_state
        .search
        .web_search(&payload.query, Some(max_results))
        .await?;

    let debug_info = json!({ "providers": app_state.search.provider_names() });
    Ok(wrap_response(outcome, debug_params, Some(debug_info)))
}
