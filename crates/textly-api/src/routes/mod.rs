pub mod ai;
pub mod conversations;
pub mod documents;
pub mod health;
pub mod openapi;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, middleware::logging, state::AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Conversations
        .route("/conversations", get(conversations::list_conversations))
        .route("/conversations/start", post(conversations::start_conversation))
        .route("/conversations/continue", post(conversations::continue_conversation))
        .route("/conversations/edit", post(conversations::edit_conversation))
        .route("/conversations/deactivate", post(conversations::deactivate_conversation))
        .route("/conversations/:conversation_id", get(conversations::get_conversation))
        // AI
        .route("/ai/chat", post(ai::chat))
        .route("/ai/assist", post(ai::assist))
        .route("/ai/models", get(ai::models))
        // Documents
        .route("/documents", post(documents::create_document))
        .route(
            "/documents/:document_id",
            get(documents::get_document).patch(documents::update_document),
        )
        // OpenAPI
        .route("/api/openapi.json", get(openapi::openapi_json));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    api_routes
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let user_header = HeaderName::from_bytes(config.auth.user_header.as_bytes())
        .unwrap_or_else(|_| HeaderName::from_static("x-user-id"));
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, user_header]);

    if config.cors.origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors
        .origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    cors.allow_origin(origins)
}
