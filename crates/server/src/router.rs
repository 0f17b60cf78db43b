use super::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/render", post(handlers::render_handler))
        .route("/api/search", post(handlers::serper_search_handler))
        .route("/search/web", post(handlers::web_search_handler))
        .route("/chat", post(handlers::chat_handler))
        .route("/chat/stream", post(handlers::chat_stream_handler))
        .route("/conversations/{id}", get(handlers::get_conversation_handler))
        .route(
            "/conversations/{id}/messages",
            post(handlers::append_message_handler),
        )
        .route(
            "/conversations/{id}/select",
            post(handlers::select_message_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
