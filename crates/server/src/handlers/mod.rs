//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `sourcecheck-server`.
//! The handlers are split into sub-modules by the resource they serve.

pub mod chat;
pub mod conversations;
pub mod general;
pub mod render;
pub mod search;

// Re-export all handlers so the router can reach them under `handlers::`.
pub use chat::*;
pub use conversations::*;
pub use general::*;
pub use render::*;
pub use search::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, Json};
use serde_json::Value;

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}
