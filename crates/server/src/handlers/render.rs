//! # Render Handler
//!
//! Splits a raw reply into display text and metadata without involving the
//! AI provider. Clients that persist raw replies use this on reload.

use super::{wrap_response, ApiResponse, AppError, DebugParams};
use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sourcecheck::metadata::{extract, sanitize_with_report, MetadataBlock};
use tracing::info;

#[derive(Deserialize)]
pub struct RenderRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct RenderResponse {
    pub display: String,
    #[serde(default)]
    pub metadata: Option<MetadataBlock>,
}

/// Handler for `POST /render`. With `?debug=true` the sanitizer stages that
/// fired are included.
pub async fn render_handler(
    debug_params: Query<DebugParams>,
    Json(payload): Json<RenderRequest>,
) -> Result<Json<ApiResponse<RenderResponse>>, AppError> {
    info!(len = payload.text.len(), "Received render request");
    let report = sanitize_with_report(&payload.text);
    let metadata = extract(&payload.text);

    let debug_info = json!({
        "fired": report.fired,
        "skipped": report.skipped,
        "has_metadata": metadata.is_some(),
    });
    let response = RenderResponse {
        display: report.display,
        metadata,
    };
    Ok(wrap_response(response, debug_params, Some(debug_info)))
}
